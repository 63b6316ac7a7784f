// src/links/normalize.rs
// =============================================================================
// URL canonicalization and same-domain scoping.
//
// Two URLs that normalize to the same string are the same page as far as the
// crawler is concerned, so normalize() is the identity used for dedup.
//
// Canonical form:  scheme://host<path>
// - runs of '/' in the path collapse into one
// - a trailing '/' is dropped ("https://example.com/" -> "https://example.com")
// - port, query string and fragment are dropped
//
// Malformed input is never an error here: normalize() hands the string back
// unchanged and domain_of() returns "". Page HTML is untrusted, so a bad link
// should cost us that link and nothing more.
// =============================================================================

use tracing::warn;
use url::Url;

/// Rewrites `url` into its canonical form, or returns it unchanged (with a
/// warning) if it cannot be parsed.
///
/// ```text
/// https://example.com//a///b/   ->  https://example.com/a/b
/// https://Example.com:8080/x?q  ->  https://example.com/x
/// ```
pub fn normalize(url: &str) -> String {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Malformed URL '{}': {}", url, e);
            return url.to_string();
        }
    };

    let path = collapse_slashes(parsed.path());
    // After collapsing there is at most one trailing '/'. The url crate always
    // reports the root as "/", so the root ends up as the bare authority.
    let path = path.strip_suffix('/').unwrap_or(&path);

    format!(
        "{}://{}{}",
        parsed.scheme(),
        parsed.host_str().unwrap_or(""),
        path
    )
}

/// Host of `url`, or an empty string if it has none or cannot be parsed.
pub fn domain_of(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_string))
        .unwrap_or_default()
}

/// True when the host of `url` is exactly `seed_domain`.
///
/// No subdomain, scheme, port or "www." equivalence: `www.example.com` is
/// out of scope for a crawl seeded at `example.com`.
pub fn in_scope(url: &str, seed_domain: &str) -> bool {
    domain_of(url) == seed_domain
}

// Squashes "//a///b" into "/a/b"
fn collapse_slashes(path: &str) -> String {
    let mut collapsed = String::with_capacity(path.len());
    for ch in path.chars() {
        if ch == '/' && collapsed.ends_with('/') {
            continue;
        }
        collapsed.push(ch);
    }
    collapsed
}
