//! Headless Chrome scraping via the DevTools protocol.
//!
//! Each fetch launches its own browser and closes it before returning,
//! whether or not the scrape succeeded.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{DictionarySource, ScrapeError};
use crate::consts::{
    DEFAULT_NAVIGATION_TIMEOUT, DEFAULT_SEARCH_URL, DEFAULT_USER_AGENT, DEFAULT_WAIT_TIMEOUT,
    MEANING_SELECTOR, RESULTS_SELECTOR,
};

/// How often to check whether the results container has rendered.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Configuration for [`ChromeSource`].
#[derive(Debug, Clone)]
pub struct ChromeConfig {
    pub search_url: String,
    pub user_agent: String,
    pub results_selector: String,
    pub meaning_selector: String,
    pub wait_timeout: Duration,
    pub navigation_timeout: Duration,
}

impl Default for ChromeConfig {
    fn default() -> Self {
        Self {
            search_url: DEFAULT_SEARCH_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            results_selector: RESULTS_SELECTOR.to_string(),
            meaning_selector: MEANING_SELECTOR.to_string(),
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
        }
    }
}

/// Scrapes the dictionary's rendered search page.
pub struct ChromeSource {
    config: ChromeConfig,
}

impl ChromeSource {
    pub fn new(config: ChromeConfig) -> Self {
        Self { config }
    }

    /// JavaScript returning the `textContent` of every meaning element.
    fn extraction_script(selector: &str) -> String {
        let literal = js_string(selector);
        format!(
            "Array.from(document.querySelectorAll({literal})).map(el => (el.textContent || '').trim())"
        )
    }

    /// JavaScript returning whether `selector` matches anything yet.
    fn presence_script(selector: &str) -> String {
        format!("document.querySelector({}) !== null", js_string(selector))
    }

    async fn launch(&self) -> Result<(Browser, JoinHandle<()>), ScrapeError> {
        let config = BrowserConfig::builder()
            .no_sandbox()
            .arg(format!("--user-agent={}", self.config.user_agent))
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .build()
            .map_err(ScrapeError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScrapeError::Launch(e.to_string()))?;

        // The handler drives the CDP websocket; it must be polled for the
        // browser to make progress.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    debug!("CDP handler loop ended");
                    break;
                }
            }
        });

        Ok((browser, handler_task))
    }

    async fn scrape(&self, browser: &Browser, url: &str) -> Result<Vec<String>, ScrapeError> {
        let navigate_err = |reason: String| ScrapeError::Navigate {
            url: url.to_string(),
            reason,
        };

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| navigate_err(e.to_string()))?;

        debug!(url, "navigating");
        tokio::time::timeout(self.config.navigation_timeout, page.goto(url))
            .await
            .map_err(|_| {
                navigate_err(format!(
                    "timeout {}ms exceeded",
                    self.config.navigation_timeout.as_millis()
                ))
            })?
            .map_err(|e| navigate_err(e.to_string()))?;

        self.wait_for_results(&page, url).await?;

        let script = Self::extraction_script(&self.config.meaning_selector);
        let texts: Vec<String> = page
            .evaluate(script.as_str())
            .await
            .map_err(|e| ScrapeError::Extract(e.to_string()))?
            .into_value()
            .map_err(|e| ScrapeError::Extract(e.to_string()))?;

        debug!(count = texts.len(), "extracted meaning elements");
        Ok(texts)
    }

    async fn wait_for_results(&self, page: &Page, url: &str) -> Result<(), ScrapeError> {
        let selector = self.config.results_selector.as_str();
        let script = Self::presence_script(selector);
        let script = script.as_str();
        let start = Instant::now();

        // Only "not there yet" keeps the wait going; a CDP failure
        // (closed target, crashed tab) ends it.
        let rendered = poll_until(self.config.wait_timeout, POLL_INTERVAL, move || async move {
            match page.evaluate(script).await {
                Ok(result) => result.into_value::<bool>().map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            }
        })
        .await;

        match rendered {
            Ok(()) => {
                debug!(selector, elapsed_ms = start.elapsed().as_millis() as u64, "results rendered");
                Ok(())
            }
            Err(PollError::TimedOut) => Err(ScrapeError::WaitTimeout {
                selector: selector.to_string(),
                waited: self.config.wait_timeout,
            }),
            Err(PollError::Check(reason)) => Err(ScrapeError::Navigate {
                url: url.to_string(),
                reason,
            }),
        }
    }

    async fn shutdown(mut browser: Browser, handler_task: JoinHandle<()>) {
        if let Err(e) = browser.close().await {
            warn!("error closing browser: {e}");
        }
        if let Err(e) = browser.wait().await {
            warn!("error waiting for browser exit: {e}");
        }
        handler_task.abort();
    }
}

impl Default for ChromeSource {
    fn default() -> Self {
        Self::new(ChromeConfig::default())
    }
}

#[async_trait]
impl DictionarySource for ChromeSource {
    fn name(&self) -> &str {
        "chrome"
    }

    fn search_url(&self, word: &str) -> String {
        super::search_url(&self.config.search_url, word)
    }

    async fn fetch(
        &self,
        word: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, ScrapeError> {
        if cancel.is_cancelled() {
            return Err(ScrapeError::Cancelled);
        }
        let url = DictionarySource::search_url(self, word);

        info!("launching headless browser");
        let (browser, handler_task) = self.launch().await?;

        // Cancelling only stops the scrape; the browser is still shut down.
        let result = tokio::select! {
            result = self.scrape(&browser, &url) => result,
            _ = cancel.cancelled() => Err(ScrapeError::Cancelled),
        };

        Self::shutdown(browser, handler_task).await;
        result
    }
}

/// A JS string literal for `text`.
fn js_string(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| "''".to_string())
}

/// Why [`poll_until`] gave up.
#[derive(Debug, PartialEq)]
enum PollError<E> {
    TimedOut,
    Check(E),
}

/// Run `check` every `interval` until it yields `Ok(true)`. The whole
/// loop is bounded by `timeout`, including a check that never returns.
/// A failing check ends the wait at once.
async fn poll_until<F, Fut, E>(
    timeout: Duration,
    interval: Duration,
    mut check: F,
) -> Result<(), PollError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    let polling = async {
        loop {
            match check().await {
                Ok(true) => return Ok(()),
                Ok(false) => tokio::time::sleep(interval).await,
                Err(e) => return Err(PollError::Check(e)),
            }
        }
    };
    tokio::time::timeout(timeout, polling)
        .await
        .unwrap_or(Err(PollError::TimedOut))
}
