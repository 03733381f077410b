use std::borrow::Cow;

/// Incremental UTF-8 decoder for a byte stream.
///
/// Network chunks can split a multi-byte character anywhere; `feed` holds the
/// incomplete trailing sequence (at most 3 bytes) and joins it with the next
/// chunk, so the split never decodes as garbage. Invalid sequences become
/// U+FFFD and never abort the stream.
#[derive(Debug)]
pub struct StreamDecoder {
    carry: Vec<u8>,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self { carry: Vec::new() }
    }

    /// Decode the next chunk, returning all text that is complete so far.
    pub fn feed(&mut self, input: &[u8]) -> String {
        let joined: Cow<[u8]> = if self.carry.is_empty() {
            Cow::Borrowed(input)
        } else {
            let mut bytes = std::mem::take(&mut self.carry);
            bytes.extend_from_slice(input);
            Cow::Owned(bytes)
        };

        let mut out = String::new();
        let mut rest = joined.as_ref();
        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    out.push_str(text);
                    break;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    // The prefix is known-valid, so this is lossless.
                    out.push_str(&String::from_utf8_lossy(&rest[..valid]));
                    match err.error_len() {
                        // Invalid sequence: substitute and keep decoding.
                        Some(len) => {
                            out.push('\u{FFFD}');
                            rest = &rest[valid + len..];
                        }
                        // Incomplete trailing sequence: hold it for the next chunk.
                        None => {
                            self.carry = rest[valid..].to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// End of stream. A dangling partial sequence surfaces as one U+FFFD.
    pub fn finish(&mut self) -> String {
        if self.carry.is_empty() {
            String::new()
        } else {
            self.carry.clear();
            "\u{FFFD}".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_in_chunks(bytes: &[u8], chunk_size: usize) -> String {
        let mut decoder = StreamDecoder::new();
        let mut out = String::new();
        for chunk in bytes.chunks(chunk_size) {
            out.push_str(&decoder.feed(chunk));
        }
        out.push_str(&decoder.finish());
        out
    }

    #[test]
    fn test_feed_plain_ascii() {
        let mut decoder = StreamDecoder::new();
        assert_eq!(decoder.feed(b"hello world"), "hello world");
        assert_eq!(decoder.finish(), "");
    }

    #[test]
    fn test_split_two_byte_char() {
        let mut decoder = StreamDecoder::new();
        // "ñ" is [0xC3, 0xB1]
        assert_eq!(decoder.feed(&[0x73, 0x65, 0xC3]), "se");
        assert_eq!(decoder.feed(&[0xB1, 0x6F, 0x72]), "ñor");
        assert_eq!(decoder.finish(), "");
    }

    #[test]
    fn test_four_byte_char_split_across_three_chunks() {
        let mut decoder = StreamDecoder::new();
        // "🎉" is [0xF0, 0x9F, 0x8E, 0x89]
        assert_eq!(decoder.feed(&[0xF0]), "");
        assert_eq!(decoder.feed(&[0x9F, 0x8E]), "");
        assert_eq!(decoder.feed(&[0x89]), "🎉");
    }

    #[test]
    fn test_empty_chunk_keeps_carry() {
        let mut decoder = StreamDecoder::new();
        // "€" is [0xE2, 0x82, 0xAC]
        assert_eq!(decoder.feed(&[0xE2]), "");
        assert_eq!(decoder.feed(&[]), "");
        assert_eq!(decoder.feed(&[0x82, 0xAC]), "€");
    }

    #[test]
    fn test_any_partition_decodes_the_same() {
        let text = "héllo wörld: 速い茶色の狐 🦊🎉 done";
        let bytes = text.as_bytes();
        for chunk_size in 1..=bytes.len() {
            assert_eq!(
                decode_in_chunks(bytes, chunk_size),
                text,
                "chunk size {} diverged",
                chunk_size
            );
        }
    }

    #[test]
    fn test_invalid_bytes_become_replacement_chars() {
        let mut decoder = StreamDecoder::new();
        assert_eq!(decoder.feed(&[0x61, 0xFF, 0x62]), "a\u{FFFD}b");
        // A lone continuation byte is invalid too
        assert_eq!(decoder.feed(&[0x80, 0x63]), "\u{FFFD}c");
    }

    #[test]
    fn test_invalid_start_after_held_bytes() {
        let mut decoder = StreamDecoder::new();
        // 0xF0 opens a 4-byte sequence that the next chunk never completes
        assert_eq!(decoder.feed(&[0xF0]), "");
        assert_eq!(decoder.feed(&[0xF0, 0x9F, 0x8E, 0x89]), "\u{FFFD}🎉");
    }

    #[test]
    fn test_truncated_stream_flushes_one_replacement() {
        let mut decoder = StreamDecoder::new();
        assert_eq!(decoder.feed(&[0x6F, 0x6B, 0x20, 0xE2, 0x82]), "ok ");
        assert_eq!(decoder.finish(), "\u{FFFD}");
        // finish is idempotent once drained
        assert_eq!(decoder.finish(), "");
    }
}
