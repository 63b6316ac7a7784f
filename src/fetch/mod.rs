// src/fetch/mod.rs
// =============================================================================
// The page-fetching boundary.
//
// The crawler only needs "URL in, page text out (or an error)", so that's all
// the Fetcher trait asks for. HttpFetcher is the real implementation; tests
// plug in a stub that serves canned pages from memory.
//
// Rust concepts:
// - Traits: a shared interface that several types can implement
// - async-trait: lets a trait have async methods that work behind Arc<dyn ..>
// =============================================================================

mod http;
#[cfg(test)]
pub mod stub;

use async_trait::async_trait;

use crate::error::FetchError;

pub use http::HttpFetcher;

/// Fetches the raw content of a page.
///
/// Implementations must return `FetchError::HttpStatus` for any status code
/// >= 400 instead of handing back an error page as content.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}
