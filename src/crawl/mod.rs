// src/crawl/mod.rs
// =============================================================================
// The concurrent crawl engine.
//
// Submodules:
// - registry: VisitedRegistry, the "already seen" set and admission gate
// - pool: WorkerPool, N workers draining one shared queue
// - coordinator: Coordinator, admits URLs and turns them into crawl units
// - shutdown: ShutdownController, closes the pool with a grace period
//
// Typical use (see main.rs):
//   let coordinator = Coordinator::new(seed, fetcher, registry, &config)?;
//   coordinator.start();
//   coordinator.wait_for_quiescence().await;
//   let outcome = coordinator.shutdown(&interrupt).await?;
//   let report = CrawlReport::new(seed, coordinator.visited(), Some(outcome));
// =============================================================================

mod coordinator;
mod pool;
mod registry;
mod shutdown;

use serde::Serialize;

pub use coordinator::Coordinator;
pub use registry::VisitedRegistry;
pub use shutdown::ShutdownOutcome;

/// What a finished crawl produced.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub seed: String,
    /// Every admitted URL, ascending.
    pub visited: Vec<String>,
    /// None when shutdown was interrupted before it could finish.
    #[serde(flatten)]
    pub outcome: Option<ShutdownOutcome>,
}

impl CrawlReport {
    pub fn new(seed: &str, visited: Vec<String>, outcome: Option<ShutdownOutcome>) -> Self {
        Self {
            seed: seed.to_string(),
            visited,
            outcome,
        }
    }
}
