// src/links/mod.rs
// =============================================================================
// Everything about URLs as strings: canonical form, domain scoping, and
// pulling candidate links out of a page.
//
// Submodules:
// - normalize: normalize(), domain_of(), in_scope() (used by extract)
// - extract: extract_links()
//
// Nothing in here does I/O or touches the worker pool.
// =============================================================================

mod extract;
mod normalize;

pub use extract::extract_links;
pub use normalize::{domain_of, normalize};
