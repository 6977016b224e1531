//! Chat history and the non-streamed chat calls.

use serde_json::{Value, json};

use crate::client::ChatClient;
use crate::errors::ClientError;
use crate::models::{ChatMessage, HistoryQuery};
use crate::stream::StreamRequest;

/// History page size used when the caller does not pick one.
pub const DEFAULT_HISTORY_LIMIT: u32 = 200;

impl ChatClient {
    /// Loads chat history for a persona.
    ///
    /// `limit` defaults to [`DEFAULT_HISTORY_LIMIT`]; pass `before` to page
    /// backwards from a known message timestamp.
    pub async fn history(
        &self,
        persona_id: &str,
        query: HistoryQuery,
    ) -> Result<Vec<ChatMessage>, ClientError> {
        let url = self.config.endpoint(&format!("api/chat/{persona_id}/history"));
        let query = HistoryQuery {
            limit: query.limit.or(Some(DEFAULT_HISTORY_LIMIT)),
            ..query
        };
        self.expect_json(
            self.http.get(url).query(&query.pairs()),
            "failed to load chat history",
        )
        .await
    }

    /// Sends a chat request and waits for the whole reply at once.
    ///
    /// The streamed variant is [`stream_chat`](Self::stream_chat); this one
    /// exists for callers that do not want incremental output.
    pub async fn send_chat(
        &self,
        persona_id: &str,
        request: &StreamRequest,
    ) -> Result<Value, ClientError> {
        let url = self.config.endpoint(&format!("api/chat/{persona_id}"));
        self.expect_json(self.http.post(url).json(request), "chat request failed")
            .await
    }

    /// Deletes a message and everything after it, returning the remaining
    /// history. A reply that is not a message array counts as empty.
    pub async fn delete_from(
        &self,
        persona_id: &str,
        message_id: &str,
    ) -> Result<Vec<ChatMessage>, ClientError> {
        let url = self.config.endpoint(&format!("api/chat/{persona_id}/delete"));
        let body = json!({ "messageId": message_id });
        let reply: Value = self
            .expect_json(self.http.post(url).json(&body), "failed to delete messages")
            .await?;
        Ok(serde_json::from_value(reply).unwrap_or_default())
    }

    /// Wipes the whole conversation with a persona.
    pub async fn clear_history(&self, persona_id: &str) -> Result<Value, ClientError> {
        let url = self.config.endpoint(&format!("api/chat/{persona_id}/history"));
        self.expect_json(self.http.delete(url), "failed to clear chat history")
            .await
    }
}
