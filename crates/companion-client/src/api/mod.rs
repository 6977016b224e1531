//! REST surface, one module per backend area.
//!
//! Every method here lives on [`ChatClient`](crate::ChatClient) and goes
//! through the shared request helpers: bearer token attached, 401
//! intercepted, non-success statuses mapped to `ClientError::Api` with the
//! server's `error` message when it sends one.

mod auth;
mod chat;
mod notifications;
mod personas;
mod profile;
mod push;

pub use chat::DEFAULT_HISTORY_LIMIT;
pub use push::{PushKeys, PushSubscription, decode_vapid_public_key};

use reqwest::multipart::Part;

use crate::errors::ClientError;
use crate::models::AvatarUpload;

/// Converts an upload into a multipart file part.
pub(crate) fn file_part(upload: AvatarUpload) -> Result<Part, ClientError> {
    Part::bytes(upload.bytes)
        .file_name(upload.file_name)
        .mime_str(&upload.mime_type)
        .map_err(|e| ClientError::config(format!("invalid upload mime type: {e}")))
}
