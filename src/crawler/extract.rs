//! Content extractor dispatch
//!
//! Routes a classified URL to the page or file extraction path and returns a
//! uniform `Page`. Extraction never touches the corpus or the ledger.

use crate::config::CrawlerConfig;
use crate::corpus::Page;
use crate::crawler::fetcher::{FetchError, FetchedResource, Fetcher};
use crate::crawler::parser::parse_page;
use crate::crawler::text::{DocumentKind, TextExtractor};
use crate::url::{title_from_url, FileKind, ScopeFilter, UrlKind};
use scraper::Selector;
use std::sync::Arc;
use thiserror::Error;

/// Extraction failures; each one drops the URL for the rest of the run
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Content container '{selector}' not found on {url}")]
    MissingContent { url: String, selector: String },

    #[error("Unsupported content type '{content_type}' at {url}")]
    UnsupportedContent { url: String, content_type: String },

    #[error("PDF text extraction failed: {0}")]
    Pdf(String),

    #[error("Invalid content selector: {0}")]
    Selector(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Extraction settings taken from the crawler configuration
#[derive(Debug, Clone)]
pub struct ExtractSettings {
    pub content_selector: String,
    pub extract_file_text: bool,
}

impl From<&CrawlerConfig> for ExtractSettings {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            content_selector: config.content_selector.clone(),
            extract_file_text: config.extract_file_text,
        }
    }
}

/// Turns a classified URL into a `Page`
///
/// Cheap to clone; every worker task holds its own handle.
#[derive(Clone)]
pub struct Extractor {
    fetcher: Arc<dyn Fetcher>,
    text: Arc<dyn TextExtractor>,
    scope: Arc<ScopeFilter>,
    selector: Arc<Selector>,
    settings: Arc<ExtractSettings>,
}

impl Extractor {
    /// Creates an extractor
    ///
    /// # Returns
    ///
    /// * `Ok(Extractor)` - Ready to extract
    /// * `Err(ExtractError::Selector)` - The content selector does not parse
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        text: Arc<dyn TextExtractor>,
        scope: Arc<ScopeFilter>,
        settings: ExtractSettings,
    ) -> Result<Self, ExtractError> {
        let selector = Selector::parse(&settings.content_selector)
            .map_err(|e| ExtractError::Selector(format!("'{}': {:?}", settings.content_selector, e)))?;

        Ok(Self {
            fetcher,
            text,
            scope,
            selector: Arc::new(selector),
            settings: Arc::new(settings),
        })
    }

    /// Extracts a page or file
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to extract
    /// * `kind` - Its classification
    ///
    /// # Returns
    ///
    /// * `Ok(Page)` - A complete page; never partial
    /// * `Err(ExtractError)` - The URL must be dropped
    pub async fn extract(&self, url: &str, kind: &UrlKind) -> Result<Page, ExtractError> {
        match kind {
            UrlKind::Invalid => Err(ExtractError::InvalidUrl(url.to_string())),
            UrlKind::File(file_kind) => self.extract_file(url, file_kind).await,
            UrlKind::Page => self.extract_page(url).await,
        }
    }

    async fn extract_file(&self, url: &str, file_kind: &FileKind) -> Result<Page, ExtractError> {
        let text = if self.settings.extract_file_text && *file_kind == FileKind::Pdf {
            let resource = self.fetcher.fetch(url).await?;
            self.pdf_text(resource.body).await?
        } else {
            String::new()
        };

        Ok(Page::new_file(url, title_from_url(url), text))
    }

    async fn extract_page(&self, url: &str) -> Result<Page, ExtractError> {
        let resource = self.fetcher.fetch(url).await?;

        if resource.is_pdf() {
            tracing::debug!("{} served a PDF, recording as file", url);
            return self.file_from_resource(url, resource).await;
        }

        if !resource.is_html() && !resource.content_type.is_empty() {
            return Err(ExtractError::UnsupportedContent {
                url: url.to_string(),
                content_type: resource.content_type,
            });
        }

        let html = String::from_utf8_lossy(&resource.body);
        let parsed = parse_page(
            &html,
            url,
            &self.selector,
            &self.settings.content_selector,
            &self.scope,
        )?;

        let text = self
            .text
            .to_text(parsed.content_html.as_bytes(), DocumentKind::Html)?;
        let title = parsed.title.unwrap_or_else(|| title_from_url(url));

        Ok(Page::new_page(url, title, text, parsed.links))
    }

    async fn file_from_resource(&self, url: &str, resource: FetchedResource) -> Result<Page, ExtractError> {
        let text = if self.settings.extract_file_text {
            self.pdf_text(resource.body).await?
        } else {
            String::new()
        };
        Ok(Page::new_file(url, title_from_url(url), text))
    }

    /// Runs PDF text extraction on the blocking pool
    ///
    /// A panic inside the PDF decoder is reported as `ExtractError::Pdf`.
    async fn pdf_text(&self, body: Vec<u8>) -> Result<String, ExtractError> {
        let text = self.text.clone();
        tokio::task::spawn_blocking(move || text.to_text(&body, DocumentKind::Pdf))
            .await
            .map_err(|e| ExtractError::Pdf(format!("decoder aborted: {}", e)))?
    }
}
