// src/crawl/coordinator.rs
// =============================================================================
// Decides what gets crawled and hands it to the worker pool.
//
// Life of a URL:
//
//   Unseen --(registry admits it)--> Admitted --(pool accepts it)--> Dispatched
//   Dispatched --(fetched + links offered back)--> Completed
//   Dispatched --(fetch failed)--> Failed
//
// - Admission happens once per normalized URL. Losing the race to admit a
//   URL is normal dedup, not an error, and is silently ignored
// - If the pool is already closed the admitted URL is simply dropped. It
//   stays in the registry
// - A failed unit is logged and stops expanding. Nothing else is affected
//
// "Crawling a page may cause more crawling" is expressed by each unit pushing
// new units onto the pool's queue, never by recursing on the call stack.
//
// Rust concepts:
// - Arc<Self>: every crawl unit holds a shared handle to the coordinator
// - self: &Arc<Self>: a method that can hand out clones of that handle
// - dyn Fetcher: the fetcher is a trait object, so tests can swap it out
// =============================================================================

use futures::FutureExt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};
use url::Url;

use super::pool::WorkerPool;
use super::registry::VisitedRegistry;
use super::shutdown::{ShutdownController, ShutdownOutcome};
use crate::config::CrawlConfig;
use crate::error::{CrawlError, FetchError};
use crate::fetch::Fetcher;
use crate::links::{domain_of, extract_links, normalize};

pub struct Coordinator {
    seed_url: String,
    seed_domain: String,
    registry: Arc<VisitedRegistry>,
    fetcher: Arc<dyn Fetcher>,
    pool: WorkerPool,
    shutdown: ShutdownController,
}

impl Coordinator {
    /// Validates the seed and spins up the worker pool. Nothing is fetched
    /// until start() is called.
    ///
    /// Fails with `CrawlError::InvalidSeed` if the seed can't be parsed or
    /// has no host. Must be called inside a tokio runtime.
    pub fn new(
        seed_url: &str,
        fetcher: Arc<dyn Fetcher>,
        registry: Arc<VisitedRegistry>,
        config: &CrawlConfig,
    ) -> Result<Arc<Self>, CrawlError> {
        Url::parse(seed_url).map_err(|e| CrawlError::InvalidSeed {
            url: seed_url.to_string(),
            reason: e.to_string(),
        })?;

        let seed_domain = domain_of(seed_url);
        if seed_domain.is_empty() {
            return Err(CrawlError::InvalidSeed {
                url: seed_url.to_string(),
                reason: "URL has no host".to_string(),
            });
        }

        Ok(Arc::new(Self {
            seed_url: seed_url.to_string(),
            seed_domain,
            registry,
            fetcher,
            pool: WorkerPool::new(config.workers),
            shutdown: ShutdownController::new(config.grace_period),
        }))
    }

    pub fn seed_domain(&self) -> &str {
        &self.seed_domain
    }

    pub fn workers(&self) -> usize {
        self.pool.size()
    }

    /// Offers the seed URL. Everything else is discovered from there.
    pub fn start(self: &Arc<Self>) {
        self.offer(&self.seed_url);
    }

    /// Resolves when no unit is queued or running, i.e. the reachable
    /// in-domain graph has been exhausted.
    pub async fn wait_for_quiescence(&self) {
        self.pool.wait_idle().await;
    }

    /// Stops the pool. See ShutdownController::shutdown.
    pub async fn shutdown(
        &self,
        interrupt: &CancellationToken,
    ) -> Result<ShutdownOutcome, CrawlError> {
        self.shutdown.shutdown(&self.pool, interrupt).await
    }

    /// Every admitted URL in ascending order.
    pub fn visited(&self) -> Vec<String> {
        self.registry.sorted_snapshot()
    }

    // Admission gate + dispatch
    fn offer(self: &Arc<Self>, url: &str) {
        // Dedup is done on the canonical form, not the raw href
        let url = normalize(url);

        // Unseen -> Admitted. Only one caller ever wins this for a URL;
        // everyone else just walks away
        if !self.registry.add_if_absent(&url) {
            trace!("Already admitted: {}", url);
            return;
        }

        // Admitted -> Dispatched. The unit owns a clone of the Arc so it can
        // offer the links it finds back to us from a worker task
        let unit = Arc::clone(self).visit(url.clone()).boxed();

        // submit() returns false once shutdown has closed the pool. The URL
        // stays in the registry, it just never gets fetched
        if self.pool.submit(unit) {
            debug!("Dispatched: {}", url);
        } else {
            debug!("Pool is shutting down, dropping {}", url);
        }
    }

    // One crawl unit: fetch, pull links, offer each one back
    async fn visit(self: Arc<Self>, url: String) {
        info!("Crawling: {}", url);

        // Fetch the page. Any failure ends this unit (Failed) and nothing
        // else: no retry, other units keep running
        let content = match self.fetcher.fetch(&url).await {
            Ok(content) => content,
            Err(FetchError::HttpStatus { status }) => {
                warn!("Failed to crawl {}: HTTP {}", url, status);
                return;
            }
            Err(e) => {
                error!("Failed to crawl {}: {}", url, e);
                return;
            }
        };

        // Pull out same-domain links we haven't seen yet. This skip is only
        // a hint; offer() below does the real dedup
        let links = extract_links(&content, &url, &self.seed_domain, &self.registry);
        debug!("Found {} candidate link(s) on {}", links.len(), url);

        // Fan out: each link becomes (at most) one new unit on the queue.
        // When this loop ends the unit is Completed
        for link in links {
            self.offer(&link);
        }
    }
}
