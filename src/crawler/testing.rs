//! In-memory collaborators for crawler unit tests

use crate::crawler::coordinator::ShutdownHandle;
use crate::crawler::extract::ExtractError;
use crate::crawler::fetcher::{FetchError, FetchedResource, Fetcher};
use crate::crawler::observer::{CrawlEvent, CrawlObserver, SkipReason};
use crate::crawler::text::{normalize_text, DocumentKind, DocumentTextExtractor, TextExtractor};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone)]
enum Canned {
    Body { content_type: String, body: Vec<u8> },
    Status(u16),
    Panic,
}

/// Serves canned responses and counts fetches per URL
///
/// Unknown URLs answer 404.
#[derive(Clone, Default)]
pub struct MapFetcher {
    responses: Arc<HashMap<String, Canned>>,
    delays: Arc<HashMap<String, Duration>>,
    default_delay: Option<Duration>,
    counts: Arc<Mutex<HashMap<String, usize>>>,
}

impl MapFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    fn with(mut self, url: &str, canned: Canned) -> Self {
        Arc::make_mut(&mut self.responses).insert(url.to_string(), canned);
        self
    }

    pub fn with_response(self, url: &str, content_type: &str, body: Vec<u8>) -> Self {
        self.with(
            url,
            Canned::Body {
                content_type: content_type.to_string(),
                body,
            },
        )
    }

    pub fn with_html(self, url: &str, html: &str) -> Self {
        self.with_response(url, "text/html; charset=utf-8", html.as_bytes().to_vec())
    }

    pub fn with_pdf(self, url: &str, body: &[u8]) -> Self {
        self.with_response(url, "application/pdf", body.to_vec())
    }

    pub fn with_status(self, url: &str, status: u16) -> Self {
        self.with(url, Canned::Status(status))
    }

    /// Panics inside `fetch` for this URL
    pub fn with_panic(self, url: &str) -> Self {
        self.with(url, Canned::Panic)
    }

    /// Delays every response
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.default_delay = Some(delay);
        self
    }

    /// Delays responses for one URL
    pub fn with_url_delay(mut self, url: &str, delay: Duration) -> Self {
        Arc::make_mut(&mut self.delays).insert(url.to_string(), delay);
        self
    }

    pub fn fetch_count(&self, url: &str) -> usize {
        self.counts.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn total_fetches(&self) -> usize {
        self.counts.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl Fetcher for MapFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedResource, FetchError> {
        *self.counts.lock().unwrap().entry(url.to_string()).or_insert(0) += 1;

        if let Some(delay) = self.delays.get(url).copied().or(self.default_delay) {
            tokio::time::sleep(delay).await;
        }

        match self.responses.get(url) {
            Some(Canned::Body { content_type, body }) => Ok(FetchedResource {
                final_url: url.to_string(),
                status: 200,
                content_type: content_type.clone(),
                body: body.clone(),
            }),
            Some(Canned::Status(status)) => Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: *status,
            }),
            Some(Canned::Panic) => panic!("fetcher blew up on {}", url),
            None => Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

/// HTML through the default extractor; "PDF" bytes taken as plain text
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn to_text(&self, bytes: &[u8], kind: DocumentKind) -> Result<String, ExtractError> {
        match kind {
            DocumentKind::Html => DocumentTextExtractor.to_text(bytes, kind),
            DocumentKind::Pdf => Ok(normalize_text(&String::from_utf8_lossy(bytes))),
        }
    }
}

/// HTML through the default extractor; panics on every PDF
pub struct PanickingPdfExtractor;

impl TextExtractor for PanickingPdfExtractor {
    fn to_text(&self, bytes: &[u8], kind: DocumentKind) -> Result<String, ExtractError> {
        match kind {
            DocumentKind::Html => DocumentTextExtractor.to_text(bytes, kind),
            DocumentKind::Pdf => panic!("malformed PDF"),
        }
    }
}

/// Builds a page whose content container holds one anchor per href
pub fn html_page(title: &str, hrefs: &[&str]) -> String {
    let anchors: String = hrefs
        .iter()
        .map(|href| format!(r#"<a href="{}">{}</a>"#, href, href))
        .collect();
    format!(
        r#"<html><head><title>{title}</title></head><body>
            <nav><a href="/navigation">Menu</a></nav>
            <div id="page-content"><p>{title} body</p>{anchors}</div>
        </body></html>"#
    )
}

/// Records every event; can request a shutdown after N fetched pages
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<CrawlEvent>>,
    stop: Mutex<Option<(usize, ShutdownHandle)>>,
}

impl RecordingObserver {
    pub fn stop_after_fetches(&self, fetches: usize, handle: ShutdownHandle) {
        *self.stop.lock().unwrap() = Some((fetches, handle));
    }

    pub fn events(&self) -> Vec<CrawlEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn merged(&self) -> Vec<(String, String)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                CrawlEvent::ParentMerged { url, parent } => Some((url, parent)),
                _ => None,
            })
            .collect()
    }

    pub fn failed(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                CrawlEvent::PageFailed { url, .. } => Some(url),
                _ => None,
            })
            .collect()
    }

    pub fn skipped_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| {
                matches!(
                    e,
                    CrawlEvent::PageSkipped {
                        reason: SkipReason::OutOfScope(_),
                        ..
                    }
                )
            })
            .count()
    }
}

impl CrawlObserver for RecordingObserver {
    fn on_event(&self, event: &CrawlEvent) {
        let mut events = self.events.lock().unwrap();
        events.push(event.clone());

        let fetched = events
            .iter()
            .filter(|e| matches!(e, CrawlEvent::PageFetched { .. }))
            .count();
        if let Some((limit, handle)) = self.stop.lock().unwrap().as_ref() {
            if fetched >= *limit {
                handle.request();
            }
        }
    }
}
