// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// There is only one thing to do (crawl a site), so unlike a multi-command
// tool there are no subcommands: just the seed URL and an output flag.
// Worker count and timeouts are fixed (see config.rs).
// =============================================================================

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "site-crawler",
    version,
    about = "Crawl every page of a website that lives on the same domain",
    long_about = "site-crawler starts from a seed URL, follows every link that stays on the seed's \
                  host, visits each page exactly once, and prints the visited URLs in sorted order."
)]
pub struct Cli {
    /// Seed URL to start crawling from (e.g., https://example.com)
    pub seed_url: String,

    /// Output the report as JSON instead of one URL per line
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_seed_and_flag() {
        let cli = Cli::parse_from(["site-crawler", "https://example.com", "--json"]);
        assert_eq!(cli.seed_url, "https://example.com");
        assert!(cli.json);
    }

    #[test]
    fn test_seed_is_required() {
        assert!(Cli::try_parse_from(["site-crawler"]).is_err());
    }
}
