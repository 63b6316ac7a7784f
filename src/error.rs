// src/error.rs
// =============================================================================
// Typed errors for the crawler.
//
// The crawl code returns these instead of anyhow::Error so callers can match
// on what went wrong. main.rs still uses anyhow for the top-level plumbing.
//
// Rust concepts:
// - thiserror: derives std::error::Error and Display from attributes
// - #[from]: lets the ? operator convert one error type into another
// =============================================================================

use thiserror::Error;

/// Errors that stop a crawl, or that are reported by shutdown.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// The seed URL cannot be parsed or has no host. Fatal, raised before
    /// any work is dispatched.
    #[error("invalid seed URL '{url}': {reason}")]
    InvalidSeed { url: String, reason: String },

    /// The grace-period wait was interrupted; in-flight units were cancelled.
    #[error("shutdown interrupted, remaining crawl units were cancelled")]
    ShutdownInterrupted,
}

/// Errors from fetching a single page. These only ever fail one crawl unit.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level failure: timeout, DNS, connection reset, bad body...
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a status >= 400, so there is no content.
    #[error("HTTP {status}")]
    HttpStatus { status: u16 },
}
