//! Wire types shared across the REST and streaming surfaces.
//!
//! Field names mirror the backend's JSON exactly (camelCase, Mongo-style
//! `_id`), with serde renames so the Rust side stays conventional.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Message author, as tagged in chat history and stream requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn of a conversation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Server-assigned id; absent on messages composed locally.
    #[serde(default, rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ChatMessage {
    /// Builds a locally-composed message with the given role.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: None,
            role,
            content: content.into(),
            created_at: None,
        }
    }

    /// Shorthand for a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Shorthand for an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// A configured companion persona.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tone: String,
    #[serde(default)]
    pub style: String,
    #[serde(default)]
    pub language: String,
    /// Free-form behavioral rules, one entry per line in the editor.
    #[serde(default)]
    pub rules: Vec<String>,
    /// `HH:MM` times at which the persona may send unprompted messages.
    #[serde(default)]
    pub auto_message_times: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Editable persona fields, used for both create and update.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PersonaDraft {
    pub name: String,
    pub description: String,
    pub tone: String,
    pub style: String,
    pub language: String,
    pub rules: Vec<String>,
    pub auto_message_times: Vec<String>,
    /// Avatar image to upload alongside the text fields.
    pub avatar: Option<AvatarUpload>,
}

/// An avatar image payload for multipart upload.
#[derive(Clone, Debug, PartialEq)]
pub struct AvatarUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// The logged-in user's profile.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

/// Editable profile fields.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    /// Profile picture to upload.
    pub avatar: Option<AvatarUpload>,
    /// Cover image to upload.
    pub cover: Option<AvatarUpload>,
}

/// Aggregate usage counters shown on the profile page.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileStats {
    #[serde(default)]
    pub persona_count: u64,
    #[serde(default)]
    pub message_count: u64,
    #[serde(default)]
    pub persona_messages: Vec<PersonaMessageCount>,
}

/// Per-persona message counter inside [`ProfileStats`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaMessageCount {
    pub persona_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub count: u64,
}

/// Latest message for one persona, keyed by persona id in the
/// `last-messages` map.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Delivery outcome recorded for a scheduled notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationStatus {
    Success,
    Failure,
}

impl NotificationStatus {
    /// The wire spelling, as used in query strings.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
        }
    }
}

/// A recorded auto-message notification.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub status: NotificationStatus,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    /// Server-formatted timestamp, passed through as-is.
    #[serde(default)]
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_src: Option<String>,
}

/// Payload for recording a new notification.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    pub status: NotificationStatus,
    pub title: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_src: Option<String>,
}

/// Result of a bulk notification delete.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedCount {
    pub deleted_count: u64,
}

/// Successful login or registration response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub token: String,
    pub user: UserProfile,
}

/// Pagination controls for chat history.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HistoryQuery {
    /// Maximum number of messages to return, newest first.
    pub limit: Option<u32>,
    /// Only messages created strictly before this instant.
    pub before: Option<DateTime<Utc>>,
}

impl HistoryQuery {
    /// Renders the query-string pairs in the order the backend expects.
    pub(crate) fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(before) = self.before {
            pairs.push((
                "before",
                before.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            ));
        }
        pairs
    }
}
