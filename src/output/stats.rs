//! Statistics generation from crawl database
//!
//! This module provides functionality for extracting and displaying
//! crawl statistics from the storage layer.

use crate::state::UrlState;
use crate::storage::{Storage, StorageError};
use crate::CorpusError;
use std::collections::HashMap;

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Run the statistics were taken from
    pub run_id: i64,

    /// Seed URL of that run
    pub seed_url: String,

    /// Final status of that run
    pub status: String,

    /// Number of pages and files in the corpus
    pub total_pages: u64,

    /// How many of those are files
    pub total_files: u64,

    /// Count of recorded URLs by state
    pub pages_by_state: HashMap<UrlState, u64>,

    /// Total number of child links recorded
    pub total_links: u64,

    /// Total number of parent edges recorded
    pub parent_edges: u64,

    /// Distinct scoped-out URLs
    pub skipped_urls: u64,

    /// Pages with the most parents
    pub most_referenced: Vec<(String, u64)>,
}

/// Loads statistics for the latest run from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Successfully loaded statistics
/// * `Err(CorpusError)` - No run is recorded or a query failed
pub fn load_statistics(storage: &dyn Storage) -> Result<CrawlStatistics, CorpusError> {
    let run = storage.get_latest_run()?.ok_or(StorageError::NoRuns)?;

    let mut pages_by_state = HashMap::new();
    for state in UrlState::all_states() {
        let count = storage.count_pages_by_state(run.id, state)?;
        if count > 0 {
            pages_by_state.insert(state, count);
        }
    }

    let total_pages = pages_by_state.get(&UrlState::Fetched).copied().unwrap_or(0);
    let skipped_urls = storage.get_skipped_urls(run.id)?.len() as u64;

    Ok(CrawlStatistics {
        run_id: run.id,
        seed_url: run.seed_url,
        status: run.status.to_db_string().to_string(),
        total_pages,
        total_files: storage.count_files(run.id)?,
        pages_by_state,
        total_links: storage.count_links(run.id)?,
        parent_edges: storage.count_parent_edges(run.id)?,
        skipped_urls,
        most_referenced: storage.get_most_referenced(run.id, 10)?,
    })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Run #{} ({})", stats.run_id, stats.status);
    println!("  Seed: {}", stats.seed_url);
    println!();

    println!("Overview:");
    println!("  Pages in corpus: {}", stats.total_pages);
    println!("  Files: {}", stats.total_files);
    println!("  Child links: {}", stats.total_links);
    println!("  Parent edges: {}", stats.parent_edges);
    println!("  Skipped URLs: {}", stats.skipped_urls);
    println!();

    println!("URLs by State:");
    let mut state_counts: Vec<_> = stats.pages_by_state.iter().collect();
    state_counts.sort_by(|a, b| b.1.cmp(a.1));

    let recorded: u64 = stats.pages_by_state.values().sum();
    for (state, count) in state_counts {
        let percentage = if recorded > 0 {
            (*count as f64 / recorded as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", state, count, percentage);
    }
    println!();

    if !stats.most_referenced.is_empty() {
        println!("Most Referenced Pages:");
        for (url, parents) in &stats.most_referenced {
            println!("  {} ({} parents)", url, parents);
        }
        println!();
    }

    let failed = stats.pages_by_state.get(&UrlState::Failed).unwrap_or(&0);
    let success_rate = if recorded > 0 {
        (stats.total_pages as f64 / recorded as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Success Rate: {:.1}% ({} fetched, {} failed)",
        success_rate, stats.total_pages, failed
    );
}
