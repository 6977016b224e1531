//! Web-push subscription registration and VAPID key decoding.
//!
//! Actually subscribing with an OS push service is the embedding
//! application's business; this module covers the backend registration
//! call and the public-key decoding it needs.

use base64::Engine as _;
use base64::engine::general_purpose;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::client::ChatClient;
use crate::errors::ClientError;

/// A push subscription as produced by a push manager.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PushSubscription {
    pub endpoint: String,
    pub keys: PushKeys,
}

/// Client keys belonging to a [`PushSubscription`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PushKeys {
    pub p256dh: String,
    pub auth: String,
}

impl ChatClient {
    /// Registers a push subscription so the backend can deliver
    /// auto-messages to it.
    pub async fn subscribe_push(&self, subscription: &PushSubscription) -> Result<(), ClientError> {
        let url = self.config.endpoint("api/subscribe");
        let body = json!({ "subscription": subscription });
        self.expect_ok(self.http.post(url).json(&body), "push subscription failed")
            .await
    }
}

/// Decodes a VAPID public key from base64url to raw bytes.
///
/// Padded and unpadded inputs are both accepted; an empty key is a
/// configuration error.
pub fn decode_vapid_public_key(key: &str) -> Result<Vec<u8>, ClientError> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return Err(ClientError::config("VAPID public key is missing"));
    }
    general_purpose::URL_SAFE_NO_PAD
        .decode(trimmed.trim_end_matches('='))
        .map_err(|e| ClientError::config(format!("invalid VAPID public key: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_unpadded_and_padded_keys_alike() {
        assert_eq!(decode_vapid_public_key("_w").expect("decode"), [0xFF]);
        assert_eq!(decode_vapid_public_key("_w==").expect("decode"), [0xFF]);
        assert_eq!(
            decode_vapid_public_key("AAAA").expect("decode"),
            [0, 0, 0]
        );
    }

    #[test]
    fn empty_key_is_a_config_error() {
        assert!(matches!(
            decode_vapid_public_key("  "),
            Err(ClientError::Config(_))
        ));
    }

    #[test]
    fn standard_alphabet_input_is_rejected() {
        assert!(decode_vapid_public_key("+/").is_err());
    }
}
