//! Root client: HTTP plumbing, bearer injection, the shared 401 intercept.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::config::ClientConfig;
use crate::credentials::{CredentialStore, MemoryCredentialStore};
use crate::errors::ClientError;

/// Client for the companion chat service.
///
/// Cheap to clone; clones share the connection pool and the credential
/// store. All REST calls and stream opens attach the stored bearer token
/// and run through the shared 401 intercept: an unauthorized response
/// clears the store and surfaces [`ClientError::AuthExpired`], so a stale
/// session can never keep issuing requests.
#[derive(Clone)]
pub struct ChatClient {
    pub(crate) http: reqwest::Client,
    pub(crate) config: ClientConfig,
    pub(crate) credentials: Arc<dyn CredentialStore>,
}

impl ChatClient {
    /// Creates a client with an in-memory credential store.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        Self::with_credentials(config, Arc::new(MemoryCredentialStore::new()))
    }

    /// Creates a client over a caller-supplied credential store.
    pub fn with_credentials(
        config: ClientConfig,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self, ClientError> {
        config.validate()?;
        // No client-level timeout: that would cap total response time and
        // cut long chat streams short. Non-streaming calls apply the
        // configured timeout per request instead.
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ClientError::config(format!("failed to build http client: {e}")))?;
        Ok(Self {
            http,
            config,
            credentials,
        })
    }

    /// Creates a client from `COMPANION_API_BASE`, seeding the store from
    /// `COMPANION_API_TOKEN` when that is set.
    pub fn from_env() -> Result<Self, ClientError> {
        let config = ClientConfig::from_env()?;
        let credentials: Arc<dyn CredentialStore> = match std::env::var("COMPANION_API_TOKEN") {
            Ok(token) if !token.trim().is_empty() => {
                Arc::new(MemoryCredentialStore::with_token(token.trim()))
            }
            _ => Arc::new(MemoryCredentialStore::new()),
        };
        Self::with_credentials(config, credentials)
    }

    /// The credential store this client reads from and clears on 401.
    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    /// The configured base URL.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Attaches the stored bearer token, when one exists.
    pub(crate) fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.credentials.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends a non-streaming request: bearer attached, timeout applied,
    /// 401 intercepted before anyone looks at the body.
    pub(crate) async fn send(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ClientError> {
        let response = self
            .authorize(builder)
            .timeout(self.config.timeout)
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            warn!("authorization rejected, clearing stored session");
            self.credentials.clear();
            return Err(ClientError::AuthExpired);
        }
        Ok(response)
    }

    /// Sends a request and decodes a JSON reply.
    ///
    /// Non-success statuses map to [`ClientError::Api`] carrying the
    /// server's `error` field when the body has one, else `fallback`.
    pub(crate) async fn expect_json<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
        fallback: &str,
    ) -> Result<T, ClientError> {
        let response = self.send(builder).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(api_error(status, response, fallback).await);
        }
        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::decode(e.to_string()))
    }

    /// Sends a request where only the status matters; the body is dropped.
    pub(crate) async fn expect_ok(
        &self,
        builder: reqwest::RequestBuilder,
        fallback: &str,
    ) -> Result<(), ClientError> {
        let response = self.send(builder).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(api_error(status, response, fallback).await);
        }
        Ok(())
    }
}

async fn api_error(
    status: reqwest::StatusCode,
    response: reqwest::Response,
    fallback: &str,
) -> ClientError {
    let message = match response.json::<serde_json::Value>().await {
        Ok(body) => body
            .get("error")
            .and_then(|v| v.as_str())
            .map(ToOwned::to_owned),
        Err(_) => None,
    };
    ClientError::api(status.as_u16(), message.unwrap_or_else(|| fallback.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::StoredIdentity;

    #[test]
    fn rejects_invalid_base_url() {
        let config = ClientConfig::new("not-a-url");
        assert!(matches!(
            ChatClient::new(config),
            Err(ClientError::Config(_))
        ));
    }

    #[test]
    fn authorize_attaches_bearer_only_when_a_token_exists() {
        let client = ChatClient::new(ClientConfig::default()).expect("client");
        let request = client
            .authorize(client.http.get("http://localhost:5050/api/personas"))
            .build()
            .expect("build");
        assert!(request.headers().get("authorization").is_none());

        client.credentials.store(StoredIdentity {
            token: "tok-9".into(),
            user: None,
        });
        let request = client
            .authorize(client.http.get("http://localhost:5050/api/personas"))
            .build()
            .expect("build");
        let header = request
            .headers()
            .get("authorization")
            .and_then(|v| v.to_str().ok());
        assert_eq!(header, Some("Bearer tok-9"));
    }
}
