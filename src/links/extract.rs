// src/links/extract.rs
// =============================================================================
// Turns a fetched page into the list of pages we should crawl next.
//
// How it works:
// 1. Find every <a href="..."> in the page (scraper/html5ever is happy with
//    broken markup and upper-case tags, so no well-formedness is required)
// 2. Throw away hrefs that can never be a page: "#anchors", "{{templates}}",
//    mailto:/tel: links and values with spaces in them
// 3. Absolute hrefs are used as-is. Some sites glue several URLs into one
//    href, so we split at every "http://" / "https://" boundary
// 4. Anything else is relative and gets appended to the page URL with a
//    single '/' between them. This is plain concatenation, not browser
//    resolution: "//host" and "?query" links are simply glued on
// 5. Normalize, keep only same-domain URLs we haven't visited yet
//
// The "haven't visited yet" check is only an early filter. Two pages can
// discover the same link at the same moment, so the coordinator's admission
// gate is still the thing that guarantees each page is crawled once.
// =============================================================================

use scraper::{Html, Selector};
use tracing::{trace, warn};
use url::Url;

use super::normalize::{in_scope, normalize};
use crate::crawl::VisitedRegistry;

/// Extracts crawlable same-domain links from `content`.
///
/// Parameters:
///   content: raw page text
///   base_url: the (normalized) URL of the page, used for relative links
///   seed_domain: host every accepted link must have
///   visited: registry used to skip pages we've already seen
///
/// Returns: normalized candidate URLs in the order they were found. The same
/// URL may appear more than once.
pub fn extract_links(
    content: &str,
    base_url: &str,
    seed_domain: &str,
    visited: &VisitedRegistry,
) -> Vec<String> {
    let mut links = Vec::new();

    for href in anchor_hrefs(content) {
        let href = href.trim();
        if should_skip(href) {
            trace!("Skipping href '{}' on {}", href, base_url);
            continue;
        }

        if href.contains("http://") || href.contains("https://") {
            for segment in split_at_protocols(href) {
                process_link(segment, base_url, seed_domain, visited, &mut links);
            }
        } else {
            process_link(href, base_url, seed_domain, visited, &mut links);
        }
    }

    links
}

// Collects the raw href value of every anchor in the document
fn anchor_hrefs(content: &str) -> Vec<String> {
    let document = Html::parse_document(content);
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect()
}

fn should_skip(href: &str) -> bool {
    let lower = href.to_ascii_lowercase();
    href.is_empty()
        || href.starts_with('#')
        || href.contains("{{")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || href.contains(' ')
}

// "https://a.com/xhttps://b.com/y" -> ["https://a.com/x", "https://b.com/y"]
//
// Whatever comes before the first protocol is kept as its own segment.
fn split_at_protocols(href: &str) -> Vec<&str> {
    let mut starts: Vec<usize> = href
        .match_indices("http://")
        .chain(href.match_indices("https://"))
        .map(|(index, _)| index)
        .filter(|&index| index > 0)
        .collect();
    starts.sort_unstable();

    let mut segments = Vec::with_capacity(starts.len() + 1);
    let mut from = 0;
    for start in starts {
        segments.push(&href[from..start]);
        from = start;
    }
    segments.push(&href[from..]);
    segments
}

// Turns one href (or one segment of a glued href) into a candidate and
// pushes it onto `links` if it's in scope and unseen
fn process_link(
    link: &str,
    base_url: &str,
    seed_domain: &str,
    visited: &VisitedRegistry,
    links: &mut Vec<String>,
) {
    let candidate = match Url::parse(link) {
        // A real http(s) URL is used as-is
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => link.to_string(),
        // Looks absolute but isn't parseable, e.g. "https-guide.html"
        Err(_) if link.starts_with("http") => {
            warn!("Skipping malformed URL: {}", link);
            return;
        }
        // Everything else is relative, including "Help:Contents" style paths
        // that the url crate would happily read as a scheme
        _ => join_relative(base_url, link),
    };

    let normalized = normalize(&candidate);
    if in_scope(&normalized, seed_domain) && !visited.contains(&normalized) {
        links.push(normalized);
    }
}

// base + "/" + link, with exactly one '/' at the seam
fn join_relative(base_url: &str, link: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        link.trim_start_matches('/')
    )
}
