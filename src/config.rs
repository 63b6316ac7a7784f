// src/config.rs
// =============================================================================
// Crawl settings.
//
// The binary always runs with CrawlConfig::default(). Tests build their own
// config with a tiny grace period so shutdown paths finish quickly.
// =============================================================================

use std::time::Duration;

/// Number of worker tasks pulling crawl units off the queue.
pub const DEFAULT_WORKERS: usize = 10;

/// How long to wait for a TCP/TLS connection to be established.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// How long a single read from the response may stall.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// How long shutdown waits for queued and running units before cancelling.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(10 * 60);

/// User-Agent sent with every request, e.g. "site-crawler/0.1.0".
pub const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub workers: usize,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub grace_period: Duration,
    pub user_agent: String,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            grace_period: DEFAULT_GRACE_PERIOD,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}
