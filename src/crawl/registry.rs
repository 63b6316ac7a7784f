// src/crawl/registry.rs
// =============================================================================
// The set of every URL the crawl has admitted.
//
// add_if_absent() is the admission gate: exactly one caller ever gets `true`
// for a given URL, no matter how many workers race on it. contains() is only
// a hint for filtering early, its answer can be stale by the time you use it.
//
// Entries are never removed. A URL stays "visited" even if its crawl unit
// failed or was cancelled during shutdown.
//
// Rust concepts:
// - BTreeSet: a sorted set, so the final report comes out in order for free
// - Mutex: only one thread touches the set at a time
// =============================================================================

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct VisitedRegistry {
    urls: Mutex<BTreeSet<String>>,
}

impl VisitedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `url`, returning true only if it was not already present.
    pub fn add_if_absent(&self, url: &str) -> bool {
        // Check and insert under one lock, so two workers offering the same
        // URL can't both see it as new
        let mut urls = self.lock();
        if urls.contains(url) {
            return false;
        }
        urls.insert(url.to_string())
    }

    /// Best-effort membership check. Never use this to decide admission.
    pub fn contains(&self, url: &str) -> bool {
        self.lock().contains(url)
    }

    /// Every URL in ascending lexicographic order.
    pub fn sorted_snapshot(&self) -> Vec<String> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    // The set is always left consistent (each operation is a single insert or
    // read), so a panic elsewhere while holding the lock can't corrupt it and
    // we keep going with the poisoned guard.
    fn lock(&self) -> MutexGuard<'_, BTreeSet<String>> {
        self.urls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
