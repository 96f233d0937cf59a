//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::corpus::{Corpus, Page};
use crate::state::UrlState;
use crate::storage::{RunRecord, RunStatus, SkippedRecord};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("No crawl runs recorded")]
    NoRuns,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// This trait defines the database operations needed to persist a crawl
/// and to report on it afterwards.
pub trait Storage {
    // ===== Run Management =====

    /// Creates a new crawl run
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file
    /// * `seed_url` - The URL the crawl started from
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, config_hash: &str, seed_url: &str) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Sets the final status of a run and its finish timestamp
    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()>;

    // ===== Corpus Persistence =====

    /// Inserts a fetched page with its parent and child edges
    ///
    /// Returns the page ID.
    fn insert_page(&mut self, run_id: i64, page: &Page) -> StorageResult<i64>;

    /// Inserts every page of a corpus in one transaction
    ///
    /// Returns the number of pages written.
    fn insert_corpus(&mut self, run_id: i64, corpus: &Corpus) -> StorageResult<usize>;

    /// Records a URL whose classification, fetch, or extraction failed
    fn record_failed(&mut self, run_id: i64, url: &str, error: &str) -> StorageResult<()>;

    /// Records a scoped-out URL with one referrer
    fn record_skipped(
        &mut self,
        run_id: i64,
        url: &str,
        referrer: &str,
        reason: &str,
    ) -> StorageResult<()>;

    /// Rebuilds the corpus stored for a run
    fn load_corpus(&self, run_id: i64) -> StorageResult<Corpus>;

    // ===== Statistics =====

    /// Counts pages of a run in a given state
    fn count_pages_by_state(&self, run_id: i64, state: UrlState) -> StorageResult<u64>;

    /// Counts fetched file pages of a run
    fn count_files(&self, run_id: i64) -> StorageResult<u64>;

    /// Counts child link edges of a run
    fn count_links(&self, run_id: i64) -> StorageResult<u64>;

    /// Counts parent edges of a run
    fn count_parent_edges(&self, run_id: i64) -> StorageResult<u64>;

    /// Gets scoped-out URLs with their reason and referrer count, most referenced first
    fn get_skipped_urls(&self, run_id: i64) -> StorageResult<Vec<SkippedRecord>>;

    /// Gets failed URLs with their error message
    fn get_failed_urls(&self, run_id: i64) -> StorageResult<Vec<(String, String)>>;

    /// Gets the pages with the most parents
    ///
    /// Returns (url, parent count) pairs, most referenced first.
    fn get_most_referenced(&self, run_id: i64, limit: usize) -> StorageResult<Vec<(String, u64)>>;
}
