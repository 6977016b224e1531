//! Async client SDK for a persona chat service.
//!
//! The centerpiece is the streaming chat consumer: an authorized POST whose
//! response body arrives as `data:`-prefixed JSON frames separated by blank
//! lines. [`ChatClient`] exposes it both as a [`ChatStream`] of frames and
//! as a callback driver, alongside the non-streaming REST surface (auth,
//! profile, personas, chat history, notifications, push registration).
//!
//! # Streaming a reply
//!
//! ```no_run
//! use companion_client::{ChatClient, ChatMessage, ClientConfig, StreamRequest};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), companion_client::ClientError> {
//! let client = ChatClient::new(ClientConfig::default())?;
//! client.login("user@example.com", "secret").await?;
//!
//! let request = StreamRequest::new(vec![ChatMessage::user("hello!")], "gemini-2.5-flash-lite");
//! client
//!     .stream_chat(
//!         "persona-id",
//!         &request,
//!         |delta| print!("{delta}"),
//!         |_done| println!(),
//!         |error| eprintln!("stream failed: {error}"),
//!     )
//!     .await;
//! # Ok(())
//! # }
//! ```

/// REST surface: auth, profile, personas, chat, notifications, push.
pub mod api;
/// Root client type and shared request plumbing.
pub mod client;
/// Client configuration.
pub mod config;
/// Credential storage trait and implementations.
pub mod credentials;
/// Public error types.
pub mod errors;
/// Wire models shared across the surfaces.
pub mod models;
/// Process-wide logging setup for hosts and examples.
pub mod observability;
/// Local settings, view state, and unread markers.
pub mod settings;
/// Streaming chat consumption.
pub mod stream;
/// Relative-time formatting.
pub mod timefmt;

pub use api::{DEFAULT_HISTORY_LIMIT, PushKeys, PushSubscription, decode_vapid_public_key};
pub use client::ChatClient;
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use credentials::{
    CredentialStore, FileCredentialStore, MemoryCredentialStore, StoredIdentity,
};
pub use errors::ClientError;
pub use models::{
    AuthSession, AvatarUpload, ChatMessage, DeletedCount, HistoryQuery, LastMessage,
    NewNotification, Notification, NotificationStatus, Persona, PersonaDraft,
    PersonaMessageCount, ProfileStats, ProfileUpdate, Role, UserProfile,
};
pub use observability::init_observability;
pub use settings::{
    ChatSettings, DEFAULT_MODEL, LastViewed, RgbaColor, SettingsStore, Theme, unread_personas,
};
pub use stream::{
    ChatStream, DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_TEMPERATURE, StreamFrame, StreamRequest,
    StreamSession,
};
pub use timefmt::relative_time;
