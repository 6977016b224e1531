//! Persona management and the per-persona last-message map.

use std::collections::HashMap;

use reqwest::multipart::Form;
use serde_json::Value;

use super::file_part;
use crate::client::ChatClient;
use crate::errors::ClientError;
use crate::models::{LastMessage, Persona, PersonaDraft};

impl ChatClient {
    /// All personas belonging to the logged-in user.
    pub async fn personas(&self) -> Result<Vec<Persona>, ClientError> {
        let url = self.config.endpoint("api/personas");
        self.expect_json(self.http.get(url), "failed to load personas")
            .await
    }

    /// Creates a persona from the draft, uploading its avatar when given.
    pub async fn create_persona(&self, draft: PersonaDraft) -> Result<Persona, ClientError> {
        let url = self.config.endpoint("api/personas");
        let form = persona_form(draft)?;
        self.expect_json(self.http.post(url).multipart(form), "persona creation failed")
            .await
    }

    /// Replaces a persona's editable fields with the draft.
    pub async fn update_persona(
        &self,
        id: &str,
        draft: PersonaDraft,
    ) -> Result<Persona, ClientError> {
        let url = self.config.endpoint(&format!("api/personas/{id}"));
        let form = persona_form(draft)?;
        self.expect_json(self.http.put(url).multipart(form), "persona update failed")
            .await
    }

    pub async fn delete_persona(&self, id: &str) -> Result<Value, ClientError> {
        let url = self.config.endpoint(&format!("api/personas/{id}"));
        self.expect_json(self.http.delete(url), "persona deletion failed")
            .await
    }

    /// The latest message per persona, keyed by persona id. Drives the
    /// conversation-list previews and the unread markers.
    pub async fn last_messages(&self) -> Result<HashMap<String, LastMessage>, ClientError> {
        let url = self.config.endpoint("api/personas/last-messages");
        self.expect_json(self.http.get(url), "failed to load last messages")
            .await
    }
}

fn persona_form(mut draft: PersonaDraft) -> Result<Form, ClientError> {
    let avatar = draft.avatar.take();
    let mut form = Form::new();
    for (key, value) in persona_text_fields(&draft) {
        form = form.text(key, value);
    }
    if let Some(avatar) = avatar {
        form = form.part("avatar", file_part(avatar)?);
    }
    Ok(form)
}

/// Text fields in wire order; `rules` and `autoMessageTimes` repeat per
/// entry, which is how the backend's form parser collects arrays.
fn persona_text_fields(draft: &PersonaDraft) -> Vec<(&'static str, String)> {
    let mut fields = vec![
        ("name", draft.name.clone()),
        ("description", draft.description.clone()),
        ("tone", draft.tone.clone()),
        ("style", draft.style.clone()),
        ("language", draft.language.clone()),
    ];
    for rule in &draft.rules {
        fields.push(("rules", rule.clone()));
    }
    for time in &draft.auto_message_times {
        fields.push(("autoMessageTimes", time.clone()));
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_fields_repeat_per_entry() {
        let draft = PersonaDraft {
            name: "Mai".into(),
            rules: vec!["be kind".into(), "stay brief".into()],
            auto_message_times: vec!["07:30".into()],
            ..PersonaDraft::default()
        };
        let fields = persona_text_fields(&draft);
        assert_eq!(fields[0], ("name", "Mai".to_string()));
        let rules: Vec<_> = fields
            .iter()
            .filter(|(k, _)| *k == "rules")
            .map(|(_, v)| v.as_str())
            .collect();
        assert_eq!(rules, ["be kind", "stay brief"]);
        assert!(
            fields
                .iter()
                .any(|(k, v)| *k == "autoMessageTimes" && v == "07:30")
        );
    }

    #[test]
    fn empty_text_fields_are_still_sent() {
        // The backend treats a missing field and an empty field the same
        // way on create, and the web client always sent all five.
        let fields = persona_text_fields(&PersonaDraft::default());
        assert_eq!(fields.len(), 5);
        assert!(fields.iter().all(|(_, v)| v.is_empty()));
    }
}
