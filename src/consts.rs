//! Project-wide constants.

use std::path::PathBuf;
use std::time::Duration;

pub const AUTHOR: &str = env!("CARGO_PKG_AUTHORS");
pub const HOMEPAGE: &str = env!("CARGO_PKG_HOMEPAGE");
pub const REPO: &str = env!("CARGO_PKG_REPOSITORY");

/// Search page template. `{word}` is replaced with the URI-encoded word.
pub const DEFAULT_SEARCH_URL: &str = "https://en.dict.naver.com/#/search?query={word}";

/// Placeholder substituted in [`DEFAULT_SEARCH_URL`] and user templates.
pub const WORD_PLACEHOLDER: &str = "{word}";

/// The dictionary renders client-side, so it gets a desktop Chrome UA.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/114.0.0.0 Safari/537.36";

/// Container that appears once search results have rendered.
pub const RESULTS_SELECTOR: &str = "ul.mean_list";

/// One element per meaning inside [`RESULTS_SELECTOR`].
pub const MEANING_SELECTOR: &str = "ul.mean_list li.mean_item p.mean";

/// How long to wait for [`RESULTS_SELECTOR`] to appear.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound on page navigation.
pub const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Meanings shown per lookup.
pub const DEFAULT_MAX_MEANINGS: usize = 3;

/// Hard ceiling for the `max_meanings` setting.
pub const MAX_MEANINGS_LIMIT: usize = 20;

/// Default database path: `~/.engdict/engdict.db`.
/// Falls back to the working directory when there is no home directory.
pub fn default_db_path() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(".engdict").join("engdict.db"),
        None => PathBuf::from("engdict.db"),
    }
}
