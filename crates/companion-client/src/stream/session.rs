//! Per-request stream state: decode carry, frame buffer, terminal latch.

use tracing::{debug, warn};

use super::decode::Utf8Decoder;
use super::frame::{StreamFrame, classify_payload};

/// Transient state for one streaming response.
///
/// Owns the UTF-8 decode carry and the text buffer awaiting `\n\n`
/// splitting, so the chunking behavior is testable without any transport.
/// Construct one per request; it is spent once a terminal frame is
/// produced or [`finish`](Self::finish) is called.
#[derive(Default)]
pub struct StreamSession {
    decoder: Utf8Decoder,
    buffer: String,
    terminated: bool,
}

impl StreamSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one raw body chunk, returning every frame it completes, in
    /// arrival order.
    ///
    /// Frames are complete when the buffer contains a `\n\n` separator;
    /// the trailing segment stays buffered for the next chunk. A `Done` or
    /// `Error` frame is terminal: it is the last frame ever returned, and
    /// later chunks are ignored.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<StreamFrame> {
        if self.terminated {
            return Vec::new();
        }
        self.buffer.push_str(&self.decoder.decode(chunk));

        let mut frames = Vec::new();
        while let Some(idx) = self.buffer.find("\n\n") {
            let part = self.buffer[..idx].to_string();
            self.buffer.drain(..idx + 2);
            let Some(frame) = parse_frame(&part) else {
                continue;
            };
            let terminal = !matches!(frame, StreamFrame::Delta { .. });
            frames.push(frame);
            if terminal {
                self.terminated = true;
                self.buffer.clear();
                break;
            }
        }
        frames
    }

    /// True once a terminal frame has been returned.
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Ends the session at end of input.
    ///
    /// Any unterminated trailing fragment is discarded: without its `\n\n`
    /// the producer never finished the frame, so there is nothing safe to
    /// deliver from it.
    pub fn finish(&mut self) {
        let tail = self.decoder.finish();
        self.buffer.push_str(&tail);
        if !self.buffer.is_empty() {
            debug!(
                discarded_bytes = self.buffer.len(),
                "discarding unterminated stream fragment"
            );
            self.buffer.clear();
        }
        self.terminated = true;
    }
}

/// Parses one `\n\n`-delimited part into a frame.
///
/// Parts must begin with literal `data:`; anything else is ignored. A
/// payload that is not valid JSON is logged and skipped so one bad frame
/// cannot kill the stream.
fn parse_frame(part: &str) -> Option<StreamFrame> {
    let payload = part.strip_prefix("data:")?.trim();
    match serde_json::from_str(payload) {
        Ok(value) => classify_payload(value),
        Err(e) => {
            warn!(error = %e, frame = %part, "skipping malformed stream frame");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deltas(frames: &[StreamFrame]) -> Vec<&str> {
        frames
            .iter()
            .filter_map(|f| match f {
                StreamFrame::Delta { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn splits_frames_across_arbitrary_chunk_boundaries() {
        // The separator itself is split between chunks.
        let mut session = StreamSession::new();
        let mut frames = Vec::new();
        frames.extend(session.push_chunk(b"data: {\"delta\":\"a\"}\n"));
        frames.extend(session.push_chunk(b"\ndata: {\"delta\":\"b\"}\n\ndata: {\"del"));
        frames.extend(session.push_chunk(b"ta\":\"c\"}\n\n"));
        assert_eq!(deltas(&frames), ["a", "b", "c"]);
    }

    #[test]
    fn delta_then_done_split_mid_key() {
        let mut session = StreamSession::new();
        let mut frames = Vec::new();
        frames.extend(session.push_chunk(b"data: {\"del"));
        frames.extend(session.push_chunk(b"ta\":\"Hi\"}\n\ndata: {\"done\":true}\n\n"));
        assert_eq!(frames.len(), 2);
        assert_eq!(
            frames[0],
            StreamFrame::Delta {
                text: "Hi".into()
            }
        );
        assert!(matches!(frames[1], StreamFrame::Done { .. }));
        assert!(session.is_terminated());
    }

    #[test]
    fn error_frame_is_terminal() {
        let mut session = StreamSession::new();
        let frames = session.push_chunk(b"data: {\"error\":\"limit reached\"}\n\n");
        assert_eq!(
            frames,
            [StreamFrame::Error {
                message: "limit reached".into()
            }]
        );
        assert!(session.push_chunk(b"data: {\"delta\":\"late\"}\n\n").is_empty());
    }

    #[test]
    fn at_most_one_terminal_even_when_both_arrive() {
        let mut session = StreamSession::new();
        let frames =
            session.push_chunk(b"data: {\"done\":true}\n\ndata: {\"error\":\"boom\"}\n\n");
        assert_eq!(frames.len(), 1);
        assert!(matches!(frames[0], StreamFrame::Done { .. }));
    }

    #[test]
    fn multibyte_characters_survive_chunk_splits() {
        // "xin chào" with the "à" (0xC3 0xA0) split between chunks.
        let mut session = StreamSession::new();
        let mut frames = Vec::new();
        frames.extend(session.push_chunk(b"data: {\"delta\":\"xin ch\xC3"));
        frames.extend(session.push_chunk(b"\xA0o\"}\n\n"));
        assert_eq!(deltas(&frames), ["xin chào"]);
    }

    #[test]
    fn malformed_frame_is_skipped_and_neighbors_survive() {
        let mut session = StreamSession::new();
        let frames = session.push_chunk(
            b"data: {\"delta\":\"a\"}\n\ndata: {not json\n\ndata: {\"delta\":\"b\"}\n\n",
        );
        assert_eq!(deltas(&frames), ["a", "b"]);
        assert!(!session.is_terminated());
    }

    #[test]
    fn frames_without_the_data_prefix_are_ignored() {
        let mut session = StreamSession::new();
        let frames =
            session.push_chunk(b": keep-alive\n\ndata: {\"delta\":\"a\"}\n\n");
        assert_eq!(deltas(&frames), ["a"]);
    }

    #[test]
    fn trailing_fragment_is_discarded_at_end_of_input() {
        let mut session = StreamSession::new();
        let frames = session.push_chunk(b"data: {\"delta\":\"kept\"}\n\ndata: {\"delta\":\"partial");
        assert_eq!(deltas(&frames), ["kept"]);
        session.finish();
        assert!(session.push_chunk(b"\"}\n\n").is_empty());
    }

    #[test]
    fn empty_deltas_produce_no_frames() {
        let mut session = StreamSession::new();
        let frames = session.push_chunk(b"data: {\"delta\":\"\"}\n\ndata: {\"delta\":\"x\"}\n\n");
        assert_eq!(deltas(&frames), ["x"]);
    }
}
