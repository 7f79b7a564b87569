pub mod chrome;
pub mod mock;

use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use tokio_util::sync::CancellationToken;

use crate::consts::WORD_PLACEHOLDER;

/// Characters `encodeURIComponent` leaves alone.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Why a scrape failed. The `Display` text is shown to the user as-is.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("failed to load {url}: {reason}")]
    Navigate { url: String, reason: String },

    #[error("waiting for selector `{selector}` failed: timeout {}ms exceeded", .waited.as_millis())]
    WaitTimeout { selector: String, waited: Duration },

    #[error("failed to extract meanings: {0}")]
    Extract(String),

    #[error("lookup cancelled")]
    Cancelled,
}

/// Somewhere meanings come from. Returns the raw text of every meaning
/// element in page order; cleanup happens in [`crate::meaning`].
#[async_trait]
pub trait DictionarySource: Send + Sync {
    fn name(&self) -> &str;

    /// The page a human would open to see the same results.
    fn search_url(&self, word: &str) -> String;

    /// Fetch the raw meanings for `word`. When `cancel` fires the source
    /// releases whatever it holds and returns [`ScrapeError::Cancelled`].
    async fn fetch(
        &self,
        word: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, ScrapeError>;
}

/// Substitute `{word}` in `template` with the URI-component-encoded word.
pub fn search_url(template: &str, word: &str) -> String {
    let encoded = utf8_percent_encode(word, URI_COMPONENT).to_string();
    template.replace(WORD_PLACEHOLDER, &encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::DEFAULT_SEARCH_URL;

    #[test]
    fn plain_word_is_unchanged() {
        assert_eq!(
            search_url(DEFAULT_SEARCH_URL, "apple"),
            "https://en.dict.naver.com/#/search?query=apple"
        );
    }

    #[test]
    fn spaces_and_reserved_chars_are_encoded() {
        assert_eq!(search_url("q={word}", "ice cream"), "q=ice%20cream");
        assert_eq!(search_url("q={word}", "a&b=c/d?"), "q=a%26b%3Dc%2Fd%3F");
        assert_eq!(search_url("q={word}", "#+"), "q=%23%2B");
    }

    #[test]
    fn unreserved_marks_are_kept() {
        assert_eq!(
            search_url("q={word}", "rock-'n'-roll_(x)!~*."),
            "q=rock-'n'-roll_(x)!~*."
        );
    }

    #[test]
    fn non_ascii_is_utf8_encoded() {
        assert_eq!(search_url("q={word}", "café"), "q=caf%C3%A9");
        assert_eq!(search_url("q={word}", "사과"), "q=%EC%82%AC%EA%B3%BC");
    }

    #[test]
    fn every_placeholder_is_replaced() {
        assert_eq!(search_url("{word}/{word}", "x"), "x/x");
    }

    #[test]
    fn timeout_message_mentions_selector_and_millis() {
        let err = ScrapeError::WaitTimeout {
            selector: "ul.mean_list".to_string(),
            waited: Duration::from_secs(10),
        };
        assert_eq!(
            err.to_string(),
            "waiting for selector `ul.mean_list` failed: timeout 10000ms exceeded"
        );
    }
}
