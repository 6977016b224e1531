//! Profile: read, usage stats, update, password change, account deletion.

use reqwest::multipart::Form;
use serde_json::{Value, json};

use super::file_part;
use crate::client::ChatClient;
use crate::errors::ClientError;
use crate::models::{ProfileStats, ProfileUpdate, UserProfile};

impl ChatClient {
    /// The logged-in user's profile.
    pub async fn me(&self) -> Result<UserProfile, ClientError> {
        let url = self.config.endpoint("api/profile/me");
        self.expect_json(self.http.get(url), "failed to load profile")
            .await
    }

    /// Persona and message counters for the profile page.
    pub async fn stats(&self) -> Result<ProfileStats, ClientError> {
        let url = self.config.endpoint("api/profile/stats");
        self.expect_json(self.http.get(url), "failed to load profile stats")
            .await
    }

    /// Updates the set fields of the profile, uploading new images when
    /// given. Refreshes the cached identity in the credential store.
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<UserProfile, ClientError> {
        let url = self.config.endpoint("api/profile/update");
        let form = profile_form(update)?;
        let user: UserProfile = self
            .expect_json(self.http.put(url).multipart(form), "profile update failed")
            .await?;
        self.credentials.update_identity(user.clone());
        Ok(user)
    }

    pub async fn change_password(
        &self,
        old_password: &str,
        new_password: &str,
    ) -> Result<Value, ClientError> {
        let url = self.config.endpoint("api/profile/change-password");
        let body = json!({ "oldPassword": old_password, "newPassword": new_password });
        self.expect_json(self.http.post(url).json(&body), "password change failed")
            .await
    }

    /// Deletes the account, then clears the stored session.
    pub async fn delete_account(&self) -> Result<Value, ClientError> {
        let url = self.config.endpoint("api/profile/delete");
        let reply = self
            .expect_json(self.http.delete(url), "account deletion failed")
            .await?;
        self.credentials.clear();
        Ok(reply)
    }
}

fn profile_form(update: ProfileUpdate) -> Result<Form, ClientError> {
    let mut form = Form::new();
    for (key, value) in profile_text_fields(&update) {
        form = form.text(key, value);
    }
    if let Some(avatar) = update.avatar {
        form = form.part("avatar", file_part(avatar)?);
    }
    if let Some(cover) = update.cover {
        form = form.part("cover", file_part(cover)?);
    }
    Ok(form)
}

fn profile_text_fields(update: &ProfileUpdate) -> Vec<(&'static str, String)> {
    let mut fields = Vec::new();
    if let Some(name) = &update.name {
        fields.push(("name", name.clone()));
    }
    if let Some(email) = &update.email {
        fields.push(("email", email.clone()));
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_set_fields_become_form_text() {
        let update = ProfileUpdate {
            name: Some("Linh".into()),
            ..ProfileUpdate::default()
        };
        assert_eq!(
            profile_text_fields(&update),
            [("name", "Linh".to_string())]
        );
        assert!(profile_text_fields(&ProfileUpdate::default()).is_empty());
    }
}
