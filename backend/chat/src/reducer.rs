//! Folds a streaming chat body into the growing assistant reply.

use bytes::Bytes;
use dragon_core::{ChatError, StreamState};
use futures::{Stream, StreamExt};
use tracing::{debug, trace};

use crate::sse::{extract_increment, SseLineDecoder};

/// Per-request reducer: `Idle -> Streaming -> Completed | Failed`.
///
/// Every increment is appended to the accumulated text and the callback sees
/// the whole text so far, never a delta.
#[derive(Debug, Default)]
pub struct StreamReducer {
    decoder: SseLineDecoder,
    text: String,
    state: StreamState,
    updates: usize,
}

impl StreamReducer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of increments published so far.
    pub fn updates(&self) -> usize {
        self.updates
    }

    pub fn begin(&mut self) {
        self.state = StreamState::Streaming;
    }

    /// Process one chunk of the body.
    pub fn feed<F>(&mut self, chunk: &[u8], on_update: &mut F)
    where
        F: FnMut(&str),
    {
        for line in self.decoder.push(chunk) {
            self.apply_line(&line, on_update);
        }
    }

    /// End of stream: flush any unterminated line and close as `Completed`.
    pub fn finish<F>(&mut self, on_update: &mut F)
    where
        F: FnMut(&str),
    {
        if let Some(tail) = self.decoder.finish() {
            self.apply_line(&tail, on_update);
        }
        self.state = StreamState::Completed;
    }

    pub fn fail(&mut self) {
        self.state = StreamState::Failed;
    }

    fn apply_line<F>(&mut self, line: &str, on_update: &mut F)
    where
        F: FnMut(&str),
    {
        let Some(increment) = extract_increment(line) else {
            trace!(line, "Skipping non-data line");
            return;
        };
        self.text.push_str(&increment);
        self.updates += 1;
        on_update(&self.text);
    }

    /// Read `stream` to the end, publishing through `on_update`.
    ///
    /// Returns the final text, or the read error after moving to `Failed`.
    pub async fn drive<S, F>(&mut self, mut stream: S, mut on_update: F) -> Result<String, ChatError>
    where
        S: Stream<Item = Result<Bytes, ChatError>> + Unpin,
        F: FnMut(&str),
    {
        self.begin();
        while let Some(chunk) = stream.next().await {
            match chunk {
                Ok(bytes) => self.feed(&bytes, &mut on_update),
                Err(err) => {
                    debug!(error = %err, updates = self.updates, "Stream read failed");
                    self.fail();
                    return Err(err);
                }
            }
        }
        self.finish(&mut on_update);
        debug!(chars = self.text.chars().count(), updates = self.updates, "Stream completed");
        Ok(self.text.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn chunks(parts: &[&[u8]]) -> impl Stream<Item = Result<Bytes, ChatError>> + Unpin {
        let items: Vec<Result<Bytes, ChatError>> = parts
            .iter()
            .map(|p| Ok(Bytes::copy_from_slice(p)))
            .collect();
        stream::iter(items)
    }

    async fn reduce(parts: &[&[u8]]) -> (String, Vec<String>, StreamState) {
        let mut reducer = StreamReducer::new();
        let mut published = Vec::new();
        let text = reducer
            .drive(chunks(parts), |t| published.push(t.to_string()))
            .await
            .unwrap();
        (text, published, reducer.state())
    }

    const BODY: &str = "data: {\"message\":\"Hi \"}\n\nevent: ping\n\ndata: there, \n\ndata: {\"content\":\"龍 friend\"}\n\n: note\ndata: !\n\n";

    #[tokio::test]
    async fn test_split_prefix_across_chunks() {
        let (text, published, state) = reduce(&[b"data: Hel", b"lo\n\n"]).await;
        assert_eq!(text, "Hello");
        assert_eq!(published, vec!["Hello"]);
        assert_eq!(state, StreamState::Completed);
    }

    #[tokio::test]
    async fn test_chunk_boundaries_do_not_matter() {
        let bytes = BODY.as_bytes();
        let (whole, _, _) = reduce(&[bytes]).await;
        assert_eq!(whole, "Hi there, 龍 friend!");

        for cut in 1..bytes.len() {
            let (text, _, _) = reduce(&[&bytes[..cut], &bytes[cut..]]).await;
            assert_eq!(text, whole, "cut at byte {cut}");
        }

        let singles: Vec<&[u8]> = bytes.chunks(1).collect();
        let (text, _, _) = reduce(&singles).await;
        assert_eq!(text, whole);
    }

    #[tokio::test]
    async fn test_replay_is_idempotent() {
        let first = reduce(&[BODY.as_bytes()]).await;
        let second = reduce(&[BODY.as_bytes()]).await;
        assert_eq!(first.0, second.0);
        assert_eq!(first.1, second.1);
    }

    #[tokio::test]
    async fn test_publishes_full_text_each_time() {
        let (_, published, _) = reduce(&[b"data: a\n\ndata: b\n\ndata: c\n\n"]).await;
        assert_eq!(published, vec!["a", "ab", "abc"]);
    }

    #[tokio::test]
    async fn test_non_json_payloads_still_advance() {
        let (text, published, _) = reduce(&[b"data: {oops\n\ndata: [1,2]\n\n"]).await;
        assert_eq!(text, "{oops[1,2]");
        assert_eq!(published.len(), 2);
    }

    #[tokio::test]
    async fn test_zero_frames_completes_empty() {
        let (text, published, state) = reduce(&[]).await;
        assert_eq!(text, "");
        assert!(published.is_empty());
        assert_eq!(state, StreamState::Completed);

        let (text, _, state) = reduce(&[b": comment only\n\n"]).await;
        assert_eq!(text, "");
        assert_eq!(state, StreamState::Completed);
    }

    #[tokio::test]
    async fn test_trailing_line_flushed_at_end() {
        let (text, _, _) = reduce(&[b"data: one\n", b"data: two"]).await;
        assert_eq!(text, "onetwo");
    }

    #[tokio::test]
    async fn test_read_error_fails() {
        let items: Vec<Result<Bytes, ChatError>> = vec![
            Ok(Bytes::from_static(b"data: partial\n")),
            Err(ChatError::connection_refused()),
        ];
        let mut reducer = StreamReducer::new();
        let mut published = Vec::new();
        let err = reducer
            .drive(stream::iter(items), |t| published.push(t.to_string()))
            .await
            .unwrap_err();
        assert_eq!(err, ChatError::connection_refused());
        assert_eq!(reducer.state(), StreamState::Failed);
        assert_eq!(published, vec!["partial"]);
    }
}
