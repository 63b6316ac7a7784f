// src/fetch/stub.rs
// In-memory Fetcher for tests. Counts calls per URL so tests can assert
// "fetched exactly once".

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use super::Fetcher;
use crate::error::FetchError;

#[derive(Debug, Clone)]
pub enum StubPage {
    Html(String),
    Status(u16),
    /// Never completes; used to exercise forced cancellation.
    Hang,
}

#[derive(Debug, Default)]
pub struct StubFetcher {
    pages: HashMap<String, StubPage>,
    delay: Duration,
    calls: Mutex<HashMap<String, usize>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages
            .insert(url.to_string(), StubPage::Html(html.to_string()));
        self
    }

    pub fn with_status(mut self, url: &str, status: u16) -> Self {
        self.pages.insert(url.to_string(), StubPage::Status(status));
        self
    }

    pub fn with_hang(mut self, url: &str) -> Self {
        self.pages.insert(url.to_string(), StubPage::Hang);
        self
    }

    /// Every fetch sleeps this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        *self.calls.lock().unwrap().entry(url.to_string()).or_insert(0) += 1;

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        // Unknown pages behave like a 404
        match self.pages.get(url).cloned().unwrap_or(StubPage::Status(404)) {
            StubPage::Html(html) => Ok(html),
            StubPage::Status(status) => Err(FetchError::HttpStatus { status }),
            StubPage::Hang => std::future::pending().await,
        }
    }
}
