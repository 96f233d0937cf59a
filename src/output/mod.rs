//! Output module for writing the corpus and reporting on crawls
//!
//! This module handles:
//! - Handing a finished crawl to every configured sink
//! - Generating markdown summaries of recorded runs
//! - Recording crawl statistics

mod markdown;
mod sinks;
pub mod stats;
mod traits;

pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use sinks::{
    print_export_metadata, read_export_metadata, record_key, ExportDirSink, ExportedRecord,
    JsonCorpusSink, SqliteSink,
};
pub use stats::{load_statistics, print_statistics, CrawlStatistics};
pub use traits::{CorpusSink, CrawlSummary, OutputError, OutputResult};

use crate::config::Config;
use crate::crawler::{CrawlOutput, Fetcher};
use crate::state::UrlState;
use crate::storage::{SqliteStorage, Storage, StorageError};
use crate::CorpusError;
use std::path::Path;
use std::sync::Arc;

/// Builds the sinks named by the output configuration
///
/// The JSON corpus sink is always first. The SQLite and export-directory
/// sinks are added when their paths are configured.
///
/// # Arguments
///
/// * `config` - The full configuration
/// * `config_hash` - Hash of the configuration file, stored with database runs
/// * `fetcher` - Used by the export directory to download file bytes
pub fn build_sinks(
    config: &Config,
    config_hash: &str,
    fetcher: Arc<dyn Fetcher>,
) -> Result<Vec<Box<dyn CorpusSink>>, CorpusError> {
    let mut sinks: Vec<Box<dyn CorpusSink>> =
        vec![Box::new(JsonCorpusSink::new(&config.output.corpus_path))];

    if let Some(db_path) = &config.output.database_path {
        let storage = SqliteStorage::new(Path::new(db_path))?;
        sinks.push(Box::new(SqliteSink::new(
            storage,
            config_hash,
            &config.crawler.seed_url,
        )));
    }

    if let Some(dir) = &config.output.export_dir {
        sinks.push(Box::new(ExportDirSink::new(
            dir,
            &config.output.source,
            fetcher,
        )));
    }

    Ok(sinks)
}

/// Writes a finished crawl to every configured sink
///
/// When both a database and a summary path are configured, the markdown
/// summary of the new run is written as well.
///
/// # Returns
///
/// * `Ok(())` - Every sink succeeded
/// * `Err(CorpusError)` - A sink failed; later sinks are not run
pub async fn write_outputs(
    config: &Config,
    config_hash: &str,
    output: &CrawlOutput,
    fetcher: Arc<dyn Fetcher>,
) -> Result<(), CorpusError> {
    for sink in build_sinks(config, config_hash, fetcher)? {
        tracing::debug!("Writing {} output", sink.name());
        sink.export(output).await?;
    }

    if let (Some(db_path), Some(summary_path)) =
        (&config.output.database_path, &config.output.summary_path)
    {
        let storage = SqliteStorage::new(Path::new(db_path))?;
        let summary = generate_summary(&storage)?;
        generate_markdown_summary(&summary, Path::new(summary_path))?;
        tracing::info!("Summary written to {}", summary_path);
    }

    Ok(())
}

/// Generates a crawl summary of the latest run from storage
///
/// # Arguments
///
/// * `storage` - The storage backend containing crawl data
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - Successfully generated summary
/// * `Err(CorpusError)` - No run is recorded or a query failed
pub fn generate_summary(storage: &dyn Storage) -> Result<CrawlSummary, CorpusError> {
    let run = storage.get_latest_run()?.ok_or(StorageError::NoRuns)?;

    // Calculate duration if finished
    let duration_seconds = if let (Ok(started), Some(finished_str)) = (
        run.started_at.parse::<chrono::DateTime<chrono::Utc>>(),
        &run.finished_at,
    ) {
        finished_str
            .parse::<chrono::DateTime<chrono::Utc>>()
            .ok()
            .map(|finished| (finished - started).num_seconds().max(0) as u64)
    } else {
        None
    };

    let stats = stats::load_statistics(storage)?;
    let pages_failed = stats
        .pages_by_state
        .get(&UrlState::Failed)
        .copied()
        .unwrap_or(0);

    Ok(CrawlSummary {
        run_id: run.id,
        started_at: run.started_at,
        finished_at: run.finished_at,
        duration_seconds,
        status: run.status.to_db_string().to_string(),
        config_hash: run.config_hash,
        seed_url: run.seed_url,
        total_pages: stats.total_pages,
        total_files: stats.total_files,
        total_links: stats.total_links,
        parent_edges: stats.parent_edges,
        pages_failed,
        skipped: storage.get_skipped_urls(run.id)?,
        failed: storage.get_failed_urls(run.id)?,
        most_referenced: stats.most_referenced,
    })
}
