//! Crawler module for page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The `Fetcher` and `TextExtractor` seams and their default implementations
//! - Content-container parsing and link extraction
//! - Extractor dispatch by URL classification
//! - The frontier and the crawl coordinator

mod coordinator;
mod extract;
mod fetcher;
mod frontier;
mod observer;
mod parser;
mod text;

#[cfg(test)]
pub(crate) mod testing;

pub use coordinator::{Coordinator, CrawlOutput, CrawlReport, ShutdownHandle, SkippedUrl};
pub use extract::{ExtractError, ExtractSettings, Extractor};
pub use fetcher::{build_http_client, FetchError, FetchedResource, Fetcher, HttpFetcher};
pub use frontier::{Frontier, FrontierEntry};
pub use observer::{CrawlEvent, CrawlObserver, SkipReason, TracingObserver};
pub use parser::{parse_page, ParsedPage};
pub use text::{normalize_text, DocumentKind, DocumentTextExtractor, TextExtractor};

use crate::config::Config;
use crate::output::write_outputs;
use crate::CorpusError;
use std::sync::Arc;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP fetcher
/// 2. Crawl from the seed until the frontier is empty or `shutdown` is requested
/// 3. Hand the corpus to every configured sink
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `config_hash` - Hash of the configuration file, stored with database runs
/// * `shutdown` - Handle that stops the crawl gracefully
///
/// # Returns
///
/// * `Ok(CrawlOutput)` - Crawl completed and outputs were written
/// * `Err(CorpusError)` - Crawl or output failed
pub async fn crawl(
    config: &Config,
    config_hash: &str,
    shutdown: ShutdownHandle,
) -> Result<CrawlOutput, CorpusError> {
    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::from_config(
        &config.crawler,
        &config.user_agent,
    )?);

    let coordinator = Coordinator::new(
        &config.crawler,
        fetcher.clone(),
        Arc::new(DocumentTextExtractor),
        Arc::new(TracingObserver),
    )?
    .with_shutdown(shutdown);

    let output = coordinator.run().await?;
    write_outputs(config, config_hash, &output, fetcher).await?;

    Ok(output)
}
