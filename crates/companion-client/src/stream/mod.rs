//! Streaming chat: open a reply stream, consume it as frames or callbacks.

use std::collections::VecDeque;
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::StreamExt as _;
use futures::stream;
use tracing::{debug, warn};

use crate::client::ChatClient;
use crate::errors::ClientError;

mod decode;
mod frame;
mod session;

pub use frame::{DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_TEMPERATURE, StreamFrame, StreamRequest};
pub use session::StreamSession;

type ByteStream =
    Pin<Box<dyn futures::Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send + 'static>>;

/// A live streaming reply.
///
/// Yields zero or more `Delta` frames in arrival order, then at most one
/// terminal `Done` or `Error` frame, then ends. Dropping the stream cancels
/// the request and releases the connection.
pub struct ChatStream {
    inner: Pin<Box<dyn futures::Stream<Item = StreamFrame> + Send + 'static>>,
}

impl fmt::Debug for ChatStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatStream").finish_non_exhaustive()
    }
}

impl futures::Stream for ChatStream {
    type Item = StreamFrame;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().inner.as_mut().poll_next(cx)
    }
}

impl ChatClient {
    /// Opens a streaming reply from the given persona.
    ///
    /// Returns `Err` only for failures before the stream exists: an invalid
    /// session (store already cleared), a response with no body, or a
    /// connect failure. Everything later arrives as frames.
    pub async fn open_stream(
        &self,
        persona_id: &str,
        request: &StreamRequest,
    ) -> Result<ChatStream, ClientError> {
        let request_id = uuid::Uuid::new_v4();
        let url = self.config.endpoint(&format!("api/chat/stream/{persona_id}"));
        debug!(%request_id, persona_id, model = %request.model, "opening chat stream");

        // 401 is handled here rather than through the shared send helper:
        // the stream must not inherit the non-streaming request timeout.
        let response = self
            .authorize(self.http.post(url).json(request))
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            warn!(%request_id, "authorization rejected, clearing stored session");
            self.credentials.clear();
            return Err(ClientError::AuthExpired);
        }
        if response.content_length() == Some(0) {
            return Err(ClientError::EmptyBody);
        }

        let bytes_stream: ByteStream = Box::pin(response.bytes_stream());
        Ok(ChatStream {
            inner: Box::pin(frame_stream(bytes_stream, request_id)),
        })
    }

    /// Streams a reply through callbacks.
    ///
    /// Never returns an error: open failures and mid-stream failures alike
    /// go to `on_error`, exactly once at most. `on_delta` fires per text
    /// increment, `on_done` once on success with the final frame's payload.
    pub async fn stream_chat(
        &self,
        persona_id: &str,
        request: &StreamRequest,
        mut on_delta: impl FnMut(&str),
        mut on_done: impl FnMut(&serde_json::Value),
        mut on_error: impl FnMut(&str),
    ) {
        let mut stream = match self.open_stream(persona_id, request).await {
            Ok(stream) => stream,
            Err(e) => {
                on_error(&e.to_string());
                return;
            }
        };
        while let Some(frame) = stream.next().await {
            match frame {
                StreamFrame::Delta { text } => on_delta(&text),
                StreamFrame::Done { metadata } => on_done(&metadata),
                StreamFrame::Error { message } => on_error(&message),
            }
        }
    }
}

fn frame_stream(
    bytes_stream: ByteStream,
    request_id: uuid::Uuid,
) -> impl futures::Stream<Item = StreamFrame> + Send {
    struct State {
        bytes_stream: ByteStream,
        session: StreamSession,
        pending: VecDeque<StreamFrame>,
        request_id: uuid::Uuid,
        done: bool,
    }

    stream::unfold(
        State {
            bytes_stream,
            session: StreamSession::new(),
            pending: VecDeque::new(),
            request_id,
            done: false,
        },
        |mut state| async move {
            loop {
                if let Some(frame) = state.pending.pop_front() {
                    return Some((frame, state));
                }
                if state.done {
                    return None;
                }

                match state.bytes_stream.next().await {
                    Some(Ok(chunk)) => {
                        for frame in state.session.push_chunk(&chunk) {
                            state.pending.push_back(frame);
                        }
                        // A terminal frame ends the read loop; whatever the
                        // server sends after it is not ours to deliver.
                        if state.session.is_terminated() {
                            state.done = true;
                        }
                    }
                    Some(Err(e)) => {
                        warn!(request_id = %state.request_id, error = %e, "chat stream read failed");
                        state.done = true;
                        return Some((
                            StreamFrame::Error {
                                message: e.to_string(),
                            },
                            state,
                        ));
                    }
                    None => {
                        state.done = true;
                        state.session.finish();
                    }
                }
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fed_stream(chunks: Vec<&'static [u8]>) -> impl futures::Stream<Item = StreamFrame> {
        let bytes_stream: ByteStream = Box::pin(stream::iter(
            chunks
                .into_iter()
                .map(|c| Ok::<_, reqwest::Error>(bytes::Bytes::from_static(c))),
        ));
        frame_stream(bytes_stream, uuid::Uuid::new_v4())
    }

    #[tokio::test]
    async fn delivers_deltas_in_order_then_stops_at_done() {
        let frames: Vec<_> = fed_stream(vec![
            b"data: {\"delta\":\"a\"}\n\ndata: {\"delta\":\"b\"}\n\n",
            b"data: {\"done\":true}\n\ndata: {\"delta\":\"late\"}\n\n",
        ])
        .collect()
        .await;

        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0], StreamFrame::Delta { text: "a".into() });
        assert_eq!(frames[1], StreamFrame::Delta { text: "b".into() });
        assert!(matches!(frames[2], StreamFrame::Done { .. }));
    }

    #[tokio::test]
    async fn end_of_stream_without_terminal_discards_the_tail() {
        let frames: Vec<_> = fed_stream(vec![
            b"data: {\"delta\":\"kept\"}\n\n",
            b"data: {\"delta\":\"partial",
        ])
        .collect()
        .await;

        assert_eq!(frames, [StreamFrame::Delta { text: "kept".into() }]);
    }

    #[test]
    fn chat_stream_debug_stays_opaque() {
        let stream = ChatStream {
            inner: Box::pin(stream::empty::<StreamFrame>()),
        };
        assert_eq!(format!("{stream:?}"), "ChatStream { .. }");
    }

    #[tokio::test]
    async fn server_error_frame_arrives_verbatim_and_alone() {
        let frames: Vec<_> =
            fed_stream(vec![b"data: {\"error\":\"limit reached\"}\n\n"]).collect().await;

        assert_eq!(
            frames,
            [StreamFrame::Error {
                message: "limit reached".into()
            }]
        );
    }
}
