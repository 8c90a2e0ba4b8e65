//! Server-Sent-Event line splitting and payload extraction.

use serde_json::Value;

const DATA_PREFIX: &str = "data:";

/// Byte-level line splitter.
///
/// Bytes are held until a `\n` arrives, so a multi-byte UTF-8 character cut
/// across two chunks is decoded only once it is whole.
#[derive(Debug, Default)]
pub struct SseLineDecoder {
    pending: Vec<u8>,
}

impl SseLineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `chunk` and return every line it completed, without terminators.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.pending[start..].iter().position(|b| *b == b'\n') {
            let end = start + offset;
            lines.push(decode_line(&self.pending[start..end]));
            start = end + 1;
        }
        self.pending.drain(..start);
        lines
    }

    /// Flush the unterminated tail left at end of stream.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let tail = std::mem::take(&mut self.pending);
        Some(decode_line(&tail))
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

/// The text increment carried by one SSE line, if any.
///
/// Only `data:` lines count. A JSON object payload contributes its string
/// `message` field (or `content`); anything else contributes the raw payload.
/// Empty payloads contribute nothing.
pub fn extract_increment(line: &str) -> Option<String> {
    let payload = line.strip_prefix(DATA_PREFIX)?;
    let payload = payload.strip_prefix(' ').unwrap_or(payload);
    if payload.is_empty() {
        return None;
    }

    if let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(payload) {
        let text = ["message", "content"]
            .iter()
            .find_map(|key| fields.get(*key).and_then(Value::as_str));
        if let Some(text) = text {
            return Some(text.to_string());
        }
    }
    Some(payload.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_split_across_chunks() {
        let mut decoder = SseLineDecoder::new();
        assert!(decoder.push(b"data: Hel").is_empty());
        assert!(decoder.has_pending());
        assert_eq!(decoder.push(b"lo\n\n"), vec!["data: Hello", ""]);
        assert!(!decoder.has_pending());
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn test_crlf_is_stripped() {
        let mut decoder = SseLineDecoder::new();
        assert_eq!(decoder.push(b"data: a\r\n\r\nid: 3\r\n"), vec!["data: a", "", "id: 3"]);
    }

    #[test]
    fn test_split_multibyte_character() {
        let text = "data: 龍\n".as_bytes();
        // "龍" is three bytes; cut inside it.
        let cut = "data: ".len() + 1;
        let mut decoder = SseLineDecoder::new();
        assert!(decoder.push(&text[..cut]).is_empty());
        assert_eq!(decoder.push(&text[cut..]), vec!["data: 龍"]);
    }

    #[test]
    fn test_finish_returns_tail() {
        let mut decoder = SseLineDecoder::new();
        decoder.push(b"data: one\ndata: two");
        assert_eq!(decoder.finish().as_deref(), Some("data: two"));
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn test_increment_from_json_fields() {
        assert_eq!(
            extract_increment(r#"data: {"message":"hi"}"#).as_deref(),
            Some("hi")
        );
        assert_eq!(
            extract_increment(r#"data: {"content":"yo"}"#).as_deref(),
            Some("yo")
        );
        assert_eq!(
            extract_increment(r#"data: {"message":"m","content":"c"}"#).as_deref(),
            Some("m")
        );
    }

    #[test]
    fn test_increment_falls_back_to_raw_payload() {
        assert_eq!(extract_increment("data: plain words").as_deref(), Some("plain words"));
        assert_eq!(extract_increment("data:{broken").as_deref(), Some("{broken"));
        assert_eq!(
            extract_increment(r#"data: {"delta":"x"}"#).as_deref(),
            Some(r#"{"delta":"x"}"#)
        );
        assert_eq!(extract_increment("data: 42").as_deref(), Some("42"));
        assert_eq!(extract_increment("data:  two spaces").as_deref(), Some(" two spaces"));
    }

    #[test]
    fn test_non_data_lines_ignored() {
        assert_eq!(extract_increment(""), None);
        assert_eq!(extract_increment("event: message"), None);
        assert_eq!(extract_increment(": keep-alive"), None);
        assert_eq!(extract_increment("id: 7"), None);
        assert_eq!(extract_increment("data:"), None);
        assert_eq!(extract_increment("data: "), None);
    }
}
