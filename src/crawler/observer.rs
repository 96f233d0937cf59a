//! Structured crawl events and the observer that renders them
//!
//! The engine never logs page outcomes directly; it emits a `CrawlEvent`
//! and the injected observer decides how to present it.

use crate::url::{ScopeRejection, UrlKind};

/// Why a popped URL was not fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Rejected by the scope filter
    OutOfScope(ScopeRejection),
    /// Failed earlier in this run; failures are never retried
    PreviouslyFailed,
}

/// One observable step of the crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlEvent {
    /// A URL was extracted and inserted into the corpus
    PageFetched {
        url: String,
        kind: UrlKind,
        parent: Option<String>,
        child_links: usize,
    },
    /// A rediscovered URL gained a parent instead of being fetched again
    ParentMerged { url: String, parent: String },
    /// A URL was dropped without fetching
    PageSkipped {
        url: String,
        parent: Option<String>,
        reason: SkipReason,
    },
    /// Classification, fetch, or extraction failed
    PageFailed {
        url: String,
        parent: Option<String>,
        error: String,
    },
}

/// Receives crawl events
pub trait CrawlObserver: Send + Sync {
    fn on_event(&self, event: &CrawlEvent);
}

/// Default observer: renders events through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl CrawlObserver for TracingObserver {
    fn on_event(&self, event: &CrawlEvent) {
        match event {
            CrawlEvent::PageFetched {
                url,
                kind,
                child_links,
                ..
            } => {
                tracing::info!(url = %url, kind = %kind, links = child_links, "Fetched");
            }
            CrawlEvent::ParentMerged { url, parent } => {
                tracing::debug!(url = %url, parent = %parent, "Merged parent");
            }
            CrawlEvent::PageSkipped {
                url,
                parent,
                reason: SkipReason::OutOfScope(rejection),
            } => {
                tracing::debug!(
                    url = %url,
                    referrer = parent.as_deref().unwrap_or("-"),
                    "Skipped: {}",
                    rejection
                );
            }
            CrawlEvent::PageSkipped {
                url,
                reason: SkipReason::PreviouslyFailed,
                ..
            } => {
                tracing::trace!(url = %url, "Skipped: failed earlier in this run");
            }
            CrawlEvent::PageFailed { url, error, .. } => {
                tracing::warn!(url = %url, "Failed: {}", error);
            }
        }
    }
}
