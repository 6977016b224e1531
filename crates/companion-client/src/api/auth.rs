//! Account registration and login.

use serde_json::{Value, json};
use tracing::debug;

use crate::client::ChatClient;
use crate::credentials::StoredIdentity;
use crate::errors::ClientError;
use crate::models::AuthSession;

impl ChatClient {
    /// Registers a new account. Registration does not log in; call
    /// [`login`](Self::login) afterwards.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Value, ClientError> {
        let url = self.config.endpoint("api/users/register");
        let body = json!({ "name": name, "email": email, "password": password });
        self.expect_json(self.http.post(url).json(&body), "registration failed")
            .await
    }

    /// Logs in and writes the returned token and identity to the
    /// credential store, so every later call is authorized.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, ClientError> {
        let url = self.config.endpoint("api/users/login");
        let body = json!({ "email": email, "password": password });
        let session: AuthSession = self
            .expect_json(self.http.post(url).json(&body), "wrong email or password")
            .await?;
        debug!(email, "logged in, storing session");
        self.credentials.store(StoredIdentity {
            token: session.token.clone(),
            user: Some(session.user.clone()),
        });
        Ok(session)
    }

    /// Forgets the stored session. Purely local; the token is not revoked.
    pub fn logout(&self) {
        self.credentials.clear();
    }
}
