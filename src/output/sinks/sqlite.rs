use crate::crawler::CrawlOutput;
use crate::output::traits::{CorpusSink, OutputResult};
use crate::storage::{RunStatus, SqliteStorage, Storage};
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Records a finished crawl as one run in the SQLite database
///
/// The corpus, failed URLs and every (skipped URL, referrer) pair are stored
/// under a fresh run so `--stats` and `--export-summary` can report on it.
pub struct SqliteSink {
    storage: Mutex<SqliteStorage>,
    config_hash: String,
    seed_url: String,
}

impl SqliteSink {
    /// Creates a new SQLite sink
    ///
    /// # Arguments
    ///
    /// * `storage` - The opened database
    /// * `config_hash` - Hash of the configuration file, stored with the run
    /// * `seed_url` - The seed the crawl started from
    pub fn new(storage: SqliteStorage, config_hash: impl Into<String>, seed_url: impl Into<String>) -> Self {
        Self {
            storage: Mutex::new(storage),
            config_hash: config_hash.into(),
            seed_url: seed_url.into(),
        }
    }

    /// Access to the underlying storage
    pub fn storage(&self) -> MutexGuard<'_, SqliteStorage> {
        self.storage.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Writes the output under a new run and returns its ID
    pub fn record(&self, output: &CrawlOutput) -> OutputResult<i64> {
        let mut storage = self.storage();
        let run_id = storage.create_run(&self.config_hash, &self.seed_url)?;

        let written = storage.insert_corpus(run_id, &output.corpus)?;

        for (url, error) in &output.report.failed {
            storage.record_failed(run_id, url, error)?;
        }

        for (url, skipped) in &output.report.skipped {
            let reason = skipped.reason.to_string();
            for referrer in &skipped.referrers {
                storage.record_skipped(run_id, url, referrer, &reason)?;
            }
        }

        let status = if output.report.interrupted {
            RunStatus::Interrupted
        } else {
            RunStatus::Completed
        };
        storage.finish_run(run_id, status)?;

        tracing::info!(
            "Recorded run {} with {} pages ({} failed, {} skipped)",
            run_id,
            written,
            output.report.failed.len(),
            output.report.skipped.len()
        );
        Ok(run_id)
    }
}

#[async_trait]
impl CorpusSink for SqliteSink {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn export(&self, output: &CrawlOutput) -> OutputResult<()> {
        self.record(output)?;
        Ok(())
    }
}
