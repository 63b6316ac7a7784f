// src/crawl/shutdown.rs
// =============================================================================
// Brings the worker pool to a halt.
//
// Steps:
// 1. Close the pool: anything discovered from now on is dropped
// 2. Wait (up to the grace period) for queued and running units to finish
// 3. Grace period over -> abort every worker. Their half-expanded pages are
//    lost and this is NOT an error for the caller
// 4. Interrupted while waiting -> abort every worker right away and return
//    CrawlError::ShutdownInterrupted so the caller knows
//
// Call it once, after the crawl is considered done (or was stopped early).
// A second call finds no workers left and reports Drained.
//
// Rust concepts:
// - tokio::select!: wait on several futures, run the branch of the first one
//   that finishes and drop the others
// - biased: check branches top to bottom, so a pending interrupt wins
// - CancellationToken: a cloneable "stop" flag that can be awaited
// =============================================================================

use serde::Serialize;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::pool::WorkerPool;
use crate::error::CrawlError;

/// How the pool came to a stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "shutdown", rename_all = "snake_case")]
pub enum ShutdownOutcome {
    /// Every queued and running unit finished inside the grace period.
    Drained,
    /// The grace period ran out and the remaining units were cancelled.
    Forced { abandoned_units: usize },
}

pub struct ShutdownController {
    grace_period: Duration,
}

enum Wait {
    Drained,
    TimedOut,
    Interrupted,
}

impl ShutdownController {
    pub fn new(grace_period: Duration) -> Self {
        Self { grace_period }
    }

    /// Stops `pool`, waiting at most the grace period. `interrupt` cuts the
    /// wait short.
    pub async fn shutdown(
        &self,
        pool: &WorkerPool,
        interrupt: &CancellationToken,
    ) -> Result<ShutdownOutcome, CrawlError> {
        // Step 1: no new work from here on
        pool.close();

        // We own the worker tasks from now on. None means someone already
        // shut this pool down
        let Some(mut workers) = pool.take_workers() else {
            debug!("Worker pool already shut down");
            return Ok(ShutdownOutcome::Drained);
        };

        info!(
            "Shutting down, waiting up to {:?} for {} unit(s)",
            self.grace_period,
            pool.pending()
        );

        // Step 2: race "all workers exited" against the grace period and the
        // interrupt signal
        let waited = tokio::select! {
            biased;
            _ = interrupt.cancelled() => Wait::Interrupted,
            drained = tokio::time::timeout(self.grace_period, drain(&mut workers)) => {
                if drained.is_ok() { Wait::Drained } else { Wait::TimedOut }
            }
        };

        match waited {
            Wait::Drained => {
                info!("All crawl units finished");
                Ok(ShutdownOutcome::Drained)
            }
            // Step 3: out of time, cancel and carry on
            Wait::TimedOut => {
                let abandoned_units = force_cancel(pool, workers).await;
                warn!(
                    "Grace period of {:?} elapsed, cancelled {} unit(s)",
                    self.grace_period, abandoned_units
                );
                Ok(ShutdownOutcome::Forced { abandoned_units })
            }
            // Step 4: cancel right away and tell the caller
            Wait::Interrupted => {
                let abandoned_units = force_cancel(pool, workers).await;
                warn!(
                    "Shutdown interrupted, cancelled {} unit(s)",
                    abandoned_units
                );
                Err(CrawlError::ShutdownInterrupted)
            }
        }
    }
}

// Workers exit on their own once the closed queue is empty
async fn drain(workers: &mut JoinSet<()>) {
    while workers.join_next().await.is_some() {}
}

// Aborts every worker; queued units are dropped along with the queue.
// Returns how many units were queued or running.
async fn force_cancel(pool: &WorkerPool, mut workers: JoinSet<()>) -> usize {
    // Read the count first, aborting the workers leaves it stale
    let abandoned = pool.pending();

    // abort() every worker and wait until they're really gone. Dropping the
    // last worker drops the queue receiver and any jobs still in it
    workers.shutdown().await;

    // Release anyone still waiting in wait_idle()
    pool.clear_pending();
    abandoned
}
