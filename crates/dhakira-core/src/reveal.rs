//! Typewriter reveal of a finished answer.

use std::time::Duration;

use futures::stream::{self, Stream};

/// Delay between revealed characters.
pub const REVEAL_INTERVAL: Duration = Duration::from_millis(30);

/// Growing prefixes of `text`, one character per `interval`.
///
/// The last item is the full text. Dropping the stream stops the reveal.
pub fn reveal(text: &str, interval: Duration) -> impl Stream<Item = String> {
    let chars: Vec<char> = text.chars().collect();
    stream::unfold((chars, 0usize), move |(chars, shown)| async move {
        if shown >= chars.len() {
            return None;
        }
        tokio::time::sleep(interval).await;
        let shown = shown + 1;
        let prefix: String = chars[..shown].iter().collect();
        Some((prefix, (chars, shown)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test(start_paused = true)]
    async fn reveals_one_char_per_tick() {
        let start = tokio::time::Instant::now();
        let frames: Vec<String> = reveal("نوفمبر", REVEAL_INTERVAL).collect().await;
        assert_eq!(frames.len(), 6);
        assert_eq!(frames[0], "ن");
        assert_eq!(frames.last().map(String::as_str), Some("نوفمبر"));
        let elapsed = start.elapsed();
        assert!(elapsed >= REVEAL_INTERVAL * 6 && elapsed < REVEAL_INTERVAL * 7);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_text_yields_nothing() {
        let frames: Vec<String> = reveal("", REVEAL_INTERVAL).collect().await;
        assert!(frames.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_cancels() {
        let mut s = Box::pin(reveal("1954", Duration::from_millis(10)));
        assert_eq!(s.next().await.as_deref(), Some("1"));
        assert_eq!(s.next().await.as_deref(), Some("19"));
        drop(s);
    }
}
