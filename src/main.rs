// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Set up logging (tracing, filtered by RUST_LOG, printed to stderr)
// 2. Parse the seed URL with clap
// 3. Crawl until no new in-domain pages turn up (or Ctrl-C)
// 4. Shut the worker pool down and print the visited URLs, sorted
// 5. Exit with proper code (0 = success, 2 = error, 130 = interrupted)
//
// Ctrl-C once: stop crawling and shut down gracefully.
// Ctrl-C twice: stop waiting for running pages and quit now.
// =============================================================================

mod cli;
mod config;
mod crawl;
mod error;
mod fetch;
mod links;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::Cli;
use config::CrawlConfig;
use crawl::{Coordinator, CrawlReport, VisitedRegistry};
use error::CrawlError;
use fetch::HttpFetcher;

const EXIT_INTERRUPTED: i32 = 130;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    let config = CrawlConfig::default();

    let fetcher = Arc::new(HttpFetcher::new(&config).context("failed to build HTTP client")?);
    let registry = Arc::new(VisitedRegistry::new());
    let coordinator = Coordinator::new(&cli.seed_url, fetcher, Arc::clone(&registry), &config)?;

    info!(
        "Crawling {} with {} worker(s)",
        coordinator.seed_domain(),
        coordinator.workers()
    );

    let stop = CancellationToken::new();
    let interrupt = CancellationToken::new();
    let signals = tokio::spawn(watch_ctrl_c(stop.clone(), interrupt.clone()));

    coordinator.start();
    tokio::select! {
        _ = coordinator.wait_for_quiescence() => info!("No more pages to discover"),
        _ = stop.cancelled() => warn!("Interrupted, stopping crawl early"),
    }

    let (outcome, exit_code) = match coordinator.shutdown(&interrupt).await {
        Ok(outcome) => (Some(outcome), 0),
        Err(CrawlError::ShutdownInterrupted) => {
            warn!("Shutdown interrupted, report may be incomplete");
            (None, EXIT_INTERRUPTED)
        }
        Err(e) => return Err(e.into()),
    };
    signals.abort();

    info!("Visited {} page(s)", registry.len());
    let report = CrawlReport::new(&cli.seed_url, coordinator.visited(), outcome);
    print_report(&report, cli.json)?;

    Ok(exit_code)
}

// First Ctrl-C ends the crawl, second one cuts the shutdown grace period short
async fn watch_ctrl_c(stop: CancellationToken, interrupt: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_err() {
        return;
    }
    stop.cancel();

    if tokio::signal::ctrl_c().await.is_err() {
        return;
    }
    interrupt.cancel();
}

// Prints the report either as plain sorted lines or JSON
fn print_report(report: &CrawlReport, json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(report)?;
        println!("{}", json_output);
    } else {
        for url in &report.visited {
            println!("{}", url);
        }
    }
    Ok(())
}
