//! Local chat settings and view state, persisted as JSON files.
//!
//! The browser client kept these in window-local storage under the
//! `chatSettings` and `lastViewedPersonas` keys. The JSON shapes are kept
//! byte-compatible so an exported browser blob loads unchanged.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::ClientError;
use crate::models::{LastMessage, Role};

/// Model requested when the settings do not name one.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-lite";

/// An RGBA color in CSS notation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RgbaColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl RgbaColor {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

impl fmt::Display for RgbaColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

/// UI theme.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// User-tunable chat appearance and model choice.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatSettings {
    pub model: String,
    pub theme: Theme,
    pub font: String,
    pub menu_color: RgbaColor,
    pub header_icon_color: RgbaColor,
    pub ai_message_bg: RgbaColor,
    pub ai_message_text: RgbaColor,
    pub user_message_bg: RgbaColor,
    pub user_message_text: RgbaColor,
    pub input_box_color: RgbaColor,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            theme: Theme::Light,
            font: "Noto Sans".to_string(),
            menu_color: RgbaColor::new(19, 6, 94, 1.0),
            header_icon_color: RgbaColor::new(19, 6, 94, 1.0),
            ai_message_bg: RgbaColor::new(224, 224, 224, 0.8),
            ai_message_text: RgbaColor::new(34, 34, 34, 1.0),
            user_message_bg: RgbaColor::new(218, 247, 210, 1.0),
            user_message_text: RgbaColor::new(34, 34, 34, 1.0),
            input_box_color: RgbaColor::new(255, 255, 255, 0.65),
        }
    }
}

/// JSON-file persistence for settings-shaped values.
///
/// Loading is forgiving the way local storage was: a missing or corrupt
/// file yields the default value, never an error.
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Conventional per-user location: `<config dir>/companion/<name>`.
    pub fn default_path(file_name: &str) -> Result<PathBuf, ClientError> {
        let base = dirs::config_dir()
            .ok_or_else(|| ClientError::store("no config directory available on this platform"))?;
        Ok(base.join("companion").join(file_name))
    }

    /// Loads the stored value, falling back to its default.
    pub fn load<T: DeserializeOwned + Default>(&self) -> T {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return T::default(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read settings file");
                return T::default();
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring corrupt settings file");
                T::default()
            }
        }
    }

    /// Writes the value as pretty JSON, creating parent directories.
    pub fn save<T: Serialize>(&self, value: &T) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| ClientError::store(format!("create {}: {e}", parent.display())))?;
        }
        let bytes =
            serde_json::to_vec_pretty(value).map_err(|e| ClientError::store(e.to_string()))?;
        std::fs::write(&self.path, bytes).map_err(|e| ClientError::store(e.to_string()))
    }
}

/// Per-persona timestamps of when the user last opened each conversation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LastViewed {
    entries: HashMap<String, DateTime<Utc>>,
}

impl LastViewed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_viewed(&mut self, persona_id: &str, now: DateTime<Utc>) {
        self.entries.insert(persona_id.to_string(), now);
    }

    pub fn viewed_at(&self, persona_id: &str) -> Option<DateTime<Utc>> {
        self.entries.get(persona_id).copied()
    }
}

/// Persona ids that deserve an unread marker: their latest message is from
/// the assistant and the user has not viewed the conversation since.
///
/// The selected persona is never marked, since its messages are already on
/// screen. A persona that was never viewed counts as unread.
pub fn unread_personas(
    last_messages: &HashMap<String, LastMessage>,
    last_viewed: &LastViewed,
    selected: Option<&str>,
) -> HashSet<String> {
    let mut unread = HashSet::new();
    for (persona_id, message) in last_messages {
        if message.role != Some(Role::Assistant) {
            continue;
        }
        if selected == Some(persona_id.as_str()) {
            continue;
        }
        let newer = match last_viewed.viewed_at(persona_id) {
            None => true,
            Some(viewed) => message.created_at.is_some_and(|created| created > viewed),
        };
        if newer {
            unread.insert(persona_id.clone());
        }
    }
    unread
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap()
    }

    fn assistant_message(hour: u32) -> LastMessage {
        LastMessage {
            role: Some(Role::Assistant),
            content: "hi".into(),
            created_at: Some(at(hour)),
        }
    }

    #[test]
    fn rgba_renders_css_notation() {
        assert_eq!(
            RgbaColor::new(224, 224, 224, 0.8).to_string(),
            "rgba(224, 224, 224, 0.8)"
        );
        assert_eq!(
            RgbaColor::new(19, 6, 94, 1.0).to_string(),
            "rgba(19, 6, 94, 1)"
        );
    }

    #[test]
    fn settings_default_matches_the_shipped_palette() {
        let settings = ChatSettings::default();
        assert_eq!(settings.model, "gemini-2.5-flash-lite");
        assert_eq!(settings.theme, Theme::Light);
        assert_eq!(settings.font, "Noto Sans");
        assert_eq!(settings.user_message_bg, RgbaColor::new(218, 247, 210, 1.0));
    }

    #[test]
    fn partial_settings_files_fill_in_defaults() {
        let settings: ChatSettings =
            serde_json::from_str(r#"{"theme":"dark","font":"Inter"}"#).expect("deserialize");
        assert_eq!(settings.theme, Theme::Dark);
        assert_eq!(settings.font, "Inter");
        assert_eq!(settings.model, DEFAULT_MODEL);
    }

    #[test]
    fn store_roundtrips_and_shrugs_off_corruption() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SettingsStore::new(dir.path().join("settings.json"));

        let loaded: ChatSettings = store.load();
        assert_eq!(loaded, ChatSettings::default());

        let mut settings = ChatSettings::default();
        settings.theme = Theme::Dark;
        store.save(&settings).expect("save");
        let loaded: ChatSettings = store.load();
        assert_eq!(loaded.theme, Theme::Dark);

        std::fs::write(dir.path().join("settings.json"), b"{broken").expect("write");
        let loaded: ChatSettings = store.load();
        assert_eq!(loaded, ChatSettings::default());
    }

    #[test]
    fn unread_requires_an_assistant_message_newer_than_the_last_view() {
        let mut last_messages = HashMap::new();
        last_messages.insert("new".to_string(), assistant_message(12));
        last_messages.insert("seen".to_string(), assistant_message(8));
        last_messages.insert(
            "user-turn".to_string(),
            LastMessage {
                role: Some(Role::User),
                ..LastMessage::default()
            },
        );

        let mut last_viewed = LastViewed::new();
        last_viewed.mark_viewed("seen", at(10));

        let unread = unread_personas(&last_messages, &last_viewed, None);
        assert!(unread.contains("new"));
        assert!(!unread.contains("seen"));
        assert!(!unread.contains("user-turn"));
    }

    #[test]
    fn selected_persona_is_never_unread() {
        let mut last_messages = HashMap::new();
        last_messages.insert("p1".to_string(), assistant_message(12));
        let unread = unread_personas(&last_messages, &LastViewed::new(), Some("p1"));
        assert!(unread.is_empty());
    }

    #[test]
    fn never_viewed_counts_as_unread_even_without_a_timestamp() {
        let mut last_messages = HashMap::new();
        last_messages.insert(
            "p1".to_string(),
            LastMessage {
                role: Some(Role::Assistant),
                ..LastMessage::default()
            },
        );
        let unread = unread_personas(&last_messages, &LastViewed::new(), None);
        assert!(unread.contains("p1"));
    }
}
