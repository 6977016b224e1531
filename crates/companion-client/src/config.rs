use std::time::Duration;

use crate::errors::ClientError;

/// Default backend location, matching the development deployment.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5050";

/// Configuration for a [`ChatClient`](crate::ChatClient).
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Base URL of the chat backend (scheme + host, no trailing path).
    pub base_url: String,
    /// HTTP timeout applied to non-streaming requests.
    ///
    /// Streamed replies are exempt: a reply can legitimately take longer
    /// than any sensible request timeout while deltas keep arriving.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Creates a config for the given base URL with default timeouts.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Builds a config from `COMPANION_API_BASE`, falling back to the
    /// default development URL when unset.
    pub fn from_env() -> Result<Self, ClientError> {
        let base_url = match std::env::var("COMPANION_API_BASE") {
            Ok(value) if !value.trim().is_empty() => value,
            _ => DEFAULT_BASE_URL.to_string(),
        };
        Ok(Self::new(base_url))
    }

    /// Overrides the non-streaming request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Joins an absolute API path onto the base URL.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub(crate) fn validate(&self) -> Result<(), ClientError> {
        let base = self.base_url.trim();
        if base.is_empty() {
            return Err(ClientError::config("base_url must not be empty"));
        }
        if !base.starts_with("http://") && !base.starts_with("https://") {
            return Err(ClientError::config(format!(
                "base_url must start with http:// or https:// (got {base})"
            )));
        }
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
