//! The lookup routine: one word in, one outcome out.

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::consts::DEFAULT_MAX_MEANINGS;
use crate::meaning::extract_meanings;
use crate::source::{DictionarySource, ScrapeError};

/// Every way a lookup can end. Errors are information, not failures.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LookupOutcome {
    /// Nothing to look up.
    NoWord,
    Found { word: String, meanings: Vec<String> },
    NotFound { word: String },
    Failed { word: String, error: String },
    /// Interrupted before the source answered.
    Cancelled { word: String },
}

impl LookupOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Found { .. } | Self::NotFound { .. })
    }

    pub fn word(&self) -> Option<&str> {
        match self {
            Self::NoWord => None,
            Self::Found { word, .. }
            | Self::NotFound { word }
            | Self::Failed { word, .. }
            | Self::Cancelled { word } => Some(word),
        }
    }
}

/// Wires a [`DictionarySource`] to meaning extraction.
pub struct Lookup {
    source: Box<dyn DictionarySource>,
    max_meanings: usize,
}

impl Lookup {
    pub fn new(source: Box<dyn DictionarySource>, max_meanings: usize) -> Self {
        Self {
            source,
            max_meanings,
        }
    }

    pub fn with_source(source: Box<dyn DictionarySource>) -> Self {
        Self::new(source, DEFAULT_MAX_MEANINGS)
    }

    pub fn source(&self) -> &dyn DictionarySource {
        self.source.as_ref()
    }

    pub fn max_meanings(&self) -> usize {
        self.max_meanings
    }

    /// Look up `word`. A blank word never reaches the source.
    pub async fn run(&self, word: &str) -> LookupOutcome {
        self.run_cancellable(word, &CancellationToken::new()).await
    }

    /// Like [`Lookup::run`], but ends with [`LookupOutcome::Cancelled`]
    /// once `cancel` fires. The source has cleaned up by the time this
    /// returns.
    pub async fn run_cancellable(&self, word: &str, cancel: &CancellationToken) -> LookupOutcome {
        let word = word.trim();
        if word.is_empty() {
            return LookupOutcome::NoWord;
        }

        info!(word, source = self.source.name(), "looking up");
        match self.source.fetch(word, cancel).await {
            Ok(raws) => {
                let meanings = extract_meanings(&raws, self.max_meanings);
                info!(word, raw = raws.len(), kept = meanings.len(), "lookup finished");
                if meanings.is_empty() {
                    LookupOutcome::NotFound {
                        word: word.to_string(),
                    }
                } else {
                    LookupOutcome::Found {
                        word: word.to_string(),
                        meanings,
                    }
                }
            }
            Err(ScrapeError::Cancelled) => {
                info!(word, "lookup cancelled");
                LookupOutcome::Cancelled {
                    word: word.to_string(),
                }
            }
            Err(e) => {
                warn!(word, "lookup failed: {e}");
                LookupOutcome::Failed {
                    word: word.to_string(),
                    error: e.to_string(),
                }
            }
        }
    }
}
