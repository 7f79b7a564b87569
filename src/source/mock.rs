use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio_util::sync::CancellationToken;

use super::{DictionarySource, ScrapeError};

/// What a scripted word returns.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Meanings(Vec<String>),
    Timeout,
    Fail(String),
    /// Never answers; only cancellation ends the fetch.
    Hang,
}

/// A scripted source for tests. Unknown words return no meanings.
pub struct MockSource {
    responses: Mutex<HashMap<String, MockResponse>>,
    calls: AtomicUsize,
    finished: AtomicUsize,
}

impl MockSource {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
            finished: AtomicUsize::new(0),
        }
    }

    /// Script the raw meaning texts returned for `word`.
    pub fn with_meanings(self, word: &str, raws: &[&str]) -> Self {
        self.respond(
            word,
            MockResponse::Meanings(raws.iter().map(|s| s.to_string()).collect()),
        )
    }

    pub fn respond(self, word: &str, response: MockResponse) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(word.to_string(), response);
        self
    }

    /// Number of `fetch` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of `fetch` calls that ran their cleanup and returned.
    pub fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DictionarySource for MockSource {
    fn name(&self) -> &str {
        "mock"
    }

    fn search_url(&self, word: &str) -> String {
        super::search_url("mock://search?q={word}", word)
    }

    async fn fetch(
        &self,
        word: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, ScrapeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let response = self.responses.lock().unwrap().get(word).cloned();
        let result = match response {
            Some(MockResponse::Meanings(raws)) => Ok(raws),
            Some(MockResponse::Timeout) => Err(ScrapeError::WaitTimeout {
                selector: crate::consts::RESULTS_SELECTOR.to_string(),
                waited: crate::consts::DEFAULT_WAIT_TIMEOUT,
            }),
            Some(MockResponse::Fail(reason)) => Err(ScrapeError::Navigate {
                url: DictionarySource::search_url(self, word),
                reason,
            }),
            Some(MockResponse::Hang) => {
                cancel.cancelled().await;
                Err(ScrapeError::Cancelled)
            }
            None => Ok(Vec::new()),
        };
        self.finished.fetch_add(1, Ordering::SeqCst);
        result
    }
}
