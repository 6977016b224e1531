//! Stream request body and frame classification.

use serde::Serialize;
use serde_json::Value;

use crate::models::ChatMessage;

/// Sampling temperature sent when the caller does not override it.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
/// Output-token cap sent when the caller does not override it.
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 1024;

/// Body POSTed to the chat stream endpoint. Immutable once sent; the target
/// persona travels in the URL, not here.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamRequest {
    /// Conversation so far, oldest first, including the new user turn.
    pub messages: Vec<ChatMessage>,
    pub model: String,
    /// `f64` so the default serializes as the exact wire literal `0.7`.
    pub temperature: f64,
    pub max_output_tokens: u32,
    /// Set when re-rolling the previous assistant reply.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regenerate: Option<bool>,
}

impl StreamRequest {
    /// Builds a request with the default sampling parameters.
    pub fn new(messages: Vec<ChatMessage>, model: impl Into<String>) -> Self {
        Self {
            messages,
            model: model.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            regenerate: None,
        }
    }

    /// Marks the request as a regeneration of the last reply.
    pub fn regenerate(mut self) -> Self {
        self.regenerate = Some(true);
        self
    }
}

/// Normalized frames exposed by `ChatStream`.
///
/// `Delta` frames arrive zero or more times, in order; at most one of
/// `Done` or `Error` follows, and nothing comes after it.
#[derive(Clone, Debug, PartialEq)]
pub enum StreamFrame {
    /// Incremental assistant text.
    Delta { text: String },
    /// Terminal success, carrying the final frame's full payload.
    Done { metadata: Value },
    /// Terminal failure, server-sent or transport.
    Error { message: String },
}

/// Classifies one parsed `data:` payload.
///
/// Key precedence follows the producer's contract: a non-empty `delta`
/// wins, then a truthy `done`, then a truthy `error`. Anything else (for
/// example a keep-alive object) classifies as nothing.
pub(crate) fn classify_payload(payload: Value) -> Option<StreamFrame> {
    if let Some(text) = payload.get("delta").and_then(Value::as_str)
        && !text.is_empty()
    {
        return Some(StreamFrame::Delta {
            text: text.to_string(),
        });
    }
    if payload.get("done").is_some_and(is_truthy) {
        return Some(StreamFrame::Done { metadata: payload });
    }
    if let Some(error) = payload.get("error").filter(|v| is_truthy(v)) {
        let message = match error.as_str() {
            Some(text) => text.to_string(),
            None => error.to_string(),
        };
        return Some(StreamFrame::Error { message });
    }
    None
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
