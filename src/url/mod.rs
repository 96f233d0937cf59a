//! URL handling module for Jury-Corpus
//!
//! This module provides href normalization, URL classification (page, file,
//! or invalid), and the scope filter that keeps the crawl inside one section
//! of one domain.

mod classify;
mod domain;
mod normalize;
mod scope;

// Re-export main functions
pub use classify::{classify, FileKind, UrlKind};
pub use domain::{extract_domain, same_host};
pub use normalize::{format_url, parse_http_url, title_from_url};
pub use scope::{ScopeFilter, ScopeRejection};
