//! Incremental UTF-8 decoding for streamed response bodies.
//!
//! Chunk boundaries fall anywhere, including inside a multi-byte sequence.
//! The decoder keeps the incomplete suffix of each chunk and prepends it to
//! the next one, so callers always receive whole characters.

/// Streaming UTF-8 decoder with partial-sequence carry.
#[derive(Default)]
pub(crate) struct Utf8Decoder {
    carry: Vec<u8>,
}

impl Utf8Decoder {
    /// Decodes one chunk, returning all complete characters.
    ///
    /// Invalid sequences become U+FFFD; an incomplete trailing sequence is
    /// held back until the next chunk.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let mut bytes = std::mem::take(&mut self.carry);
        bytes.extend_from_slice(chunk);

        let mut out = String::with_capacity(bytes.len());
        let mut rest = bytes.as_slice();
        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    out.push_str(text);
                    break;
                }
                Err(e) => {
                    let (valid, invalid) = rest.split_at(e.valid_up_to());
                    if let Ok(text) = std::str::from_utf8(valid) {
                        out.push_str(text);
                    }
                    match e.error_len() {
                        Some(len) => {
                            out.push('\u{FFFD}');
                            rest = &invalid[len..];
                        }
                        None => {
                            // Incomplete sequence at the end of the chunk.
                            self.carry = invalid.to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// Flushes the decoder at end of input.
    ///
    /// A dangling partial sequence has no completion coming, so it decodes
    /// to a single U+FFFD.
    pub fn finish(&mut self) -> String {
        if self.carry.is_empty() {
            String::new()
        } else {
            self.carry.clear();
            '\u{FFFD}'.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_ascii_through() {
        let mut decoder = Utf8Decoder::default();
        assert_eq!(decoder.decode(b"hello"), "hello");
        assert_eq!(decoder.finish(), "");
    }

    #[test]
    fn reassembles_a_multibyte_character_split_across_chunks() {
        // "é" is 0xC3 0xA9.
        let mut decoder = Utf8Decoder::default();
        assert_eq!(decoder.decode(&[0xC3]), "");
        assert_eq!(decoder.decode(&[0xA9]), "é");
    }

    #[test]
    fn reassembles_a_four_byte_character_split_three_ways() {
        // U+1F600 is F0 9F 98 80.
        let mut decoder = Utf8Decoder::default();
        assert_eq!(decoder.decode(&[0xF0]), "");
        assert_eq!(decoder.decode(&[0x9F, 0x98]), "");
        assert_eq!(decoder.decode(&[0x80, b'!']), "😀!");
    }

    #[test]
    fn replaces_invalid_bytes_and_keeps_going() {
        let mut decoder = Utf8Decoder::default();
        assert_eq!(decoder.decode(&[b'a', 0xFF, b'b']), "a\u{FFFD}b");
    }

    #[test]
    fn dangling_partial_sequence_flushes_as_replacement() {
        let mut decoder = Utf8Decoder::default();
        assert_eq!(decoder.decode(&[0xE2, 0x82]), "");
        assert_eq!(decoder.finish(), "\u{FFFD}");
        assert_eq!(decoder.finish(), "");
    }
}
