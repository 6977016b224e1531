/// Errors returned by the public client API.
///
/// Streaming replies do not use this type for mid-stream failures: those are
/// delivered as terminal [`StreamFrame::Error`](crate::stream::StreamFrame)
/// frames (or through the error callback) so UI code never has to catch an
/// exception while rendering a reply. `ClientError` covers everything that
/// happens before a stream exists, plus the whole non-streaming surface.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// Invalid client configuration (base URL, missing env, empty key).
    #[error("config error: {0}")]
    Config(String),
    /// The backend rejected the bearer credential. The credential store has
    /// already been cleared when this is returned.
    #[error("session expired, please log in again")]
    AuthExpired,
    /// The response arrived but declared no body to read.
    #[error("no response body")]
    EmptyBody,
    /// The backend answered with a non-success status.
    #[error("api error (status {status}): {message}")]
    Api { status: u16, message: String },
    /// Connection or request transmission failed.
    #[error("transport error: {0}")]
    Transport(String),
    /// Reading or writing a local store (credentials, settings) failed.
    #[error("store error: {0}")]
    Store(String),
    /// A response body did not match the expected shape.
    #[error("decode error: {0}")]
    Decode(String),
}

impl ClientError {
    /// Creates a config-level error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a transport-level error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates a local-store error.
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }

    /// Creates a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Creates an API error from a status code and message.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// True when the error means the stored session is no longer valid.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthExpired)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_expired_message_is_fixed() {
        assert_eq!(
            ClientError::AuthExpired.to_string(),
            "session expired, please log in again"
        );
    }

    #[test]
    fn api_error_formats_status_and_message() {
        let err = ClientError::api(500, "boom");
        assert_eq!(err.to_string(), "api error (status 500): boom");
    }
}
