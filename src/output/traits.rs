//! Output sink traits and types
//!
//! This module defines the trait interface for corpus sinks and
//! associated data structures for crawl summaries.

use crate::crawler::CrawlOutput;
use crate::storage::{SkippedRecord, StorageError};
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("Failed to serialize corpus: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// A destination for a finished crawl
///
/// Sinks receive the corpus only after the frontier is exhausted or the crawl
/// was interrupted, so every page they see is complete.
#[async_trait]
pub trait CorpusSink: Send + Sync {
    /// Short label used in log lines
    fn name(&self) -> &'static str;

    /// Writes the crawl output to this sink
    async fn export(&self, output: &CrawlOutput) -> OutputResult<()>;
}

/// Summary of one recorded crawl run
#[derive(Debug, Clone, Default)]
pub struct CrawlSummary {
    // Run metadata
    pub run_id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub duration_seconds: Option<u64>,
    pub status: String,
    pub config_hash: String,
    pub seed_url: String,

    // Corpus statistics
    pub total_pages: u64,
    pub total_files: u64,
    pub total_links: u64,
    pub parent_edges: u64,

    // Outcomes
    pub pages_failed: u64,
    pub skipped: Vec<SkippedRecord>,
    pub failed: Vec<(String, String)>,

    // Pages with the most parents
    pub most_referenced: Vec<(String, u64)>,
}

impl CrawlSummary {
    /// Creates an empty summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Percentage of claimed URLs that made it into the corpus
    pub fn success_rate(&self) -> f64 {
        let attempted = self.total_pages + self.pages_failed;
        if attempted == 0 {
            return 0.0;
        }
        (self.total_pages as f64 / attempted as f64) * 100.0
    }

    /// Percentage of claimed URLs that failed
    pub fn error_rate(&self) -> f64 {
        let attempted = self.total_pages + self.pages_failed;
        if attempted == 0 {
            return 0.0;
        }
        (self.pages_failed as f64 / attempted as f64) * 100.0
    }

    /// Average number of parents per recorded page
    pub fn average_parents(&self) -> f64 {
        if self.total_pages == 0 {
            return 0.0;
        }
        self.parent_edges as f64 / self.total_pages as f64
    }
}
