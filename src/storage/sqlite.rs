//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::corpus::{Corpus, Page};
use crate::state::UrlState;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{RunRecord, RunStatus, SkippedRecord};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeSet;
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn count(&self, sql: &str, run_id: i64) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(sql, params![run_id], |row| row.get(0))?;
        Ok(count as u64)
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        seed_url: row.get(4)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(5)?).unwrap_or(RunStatus::Running),
    })
}

/// Writes a page and its edges; shared by single inserts and transactions
fn insert_page_on(conn: &Connection, run_id: i64, page: &Page) -> StorageResult<i64> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO pages (run_id, url, state, title, text, is_file, recorded_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(run_id, url) DO UPDATE SET
            state = excluded.state,
            title = excluded.title,
            text = excluded.text,
            is_file = excluded.is_file,
            error_message = NULL",
        params![
            run_id,
            page.url,
            UrlState::Fetched.to_db_string(),
            page.title,
            page.text,
            page.is_file,
            now
        ],
    )?;

    let page_id: i64 = conn.query_row(
        "SELECT id FROM pages WHERE run_id = ?1 AND url = ?2",
        params![run_id, page.url],
        |row| row.get(0),
    )?;

    for parent in &page.parent_pages {
        conn.execute(
            "INSERT OR IGNORE INTO page_parents (page_id, parent_url) VALUES (?1, ?2)",
            params![page_id, parent],
        )?;
    }

    for child in &page.child_links {
        conn.execute(
            "INSERT OR IGNORE INTO page_links (page_id, child_url) VALUES (?1, ?2)",
            params![page_id, child],
        )?;
    }

    Ok(page_id)
}

impl Storage for SqliteStorage {
    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str, seed_url: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, seed_url, status) VALUES (?1, ?2, ?3, ?4)",
            params![now, config_hash, seed_url, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                "SELECT id, started_at, finished_at, config_hash, seed_url, status FROM runs WHERE id = ?1",
                params![run_id],
                run_from_row,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                "SELECT id, started_at, finished_at, config_hash, seed_url, status FROM runs ORDER BY id DESC LIMIT 1",
                [],
                run_from_row,
            )
            .optional()?;

        Ok(run)
    }

    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![status.to_db_string(), now, run_id],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    // ===== Corpus Persistence =====

    fn insert_page(&mut self, run_id: i64, page: &Page) -> StorageResult<i64> {
        insert_page_on(&self.conn, run_id, page)
    }

    fn insert_corpus(&mut self, run_id: i64, corpus: &Corpus) -> StorageResult<usize> {
        let tx = self.conn.transaction()?;
        let mut written = 0;
        for page in corpus.pages() {
            insert_page_on(&tx, run_id, page)?;
            written += 1;
        }
        tx.commit()?;
        Ok(written)
    }

    fn record_failed(&mut self, run_id: i64, url: &str, error: &str) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO pages (run_id, url, state, error_message, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(run_id, url) DO UPDATE SET
                state = excluded.state,
                error_message = excluded.error_message",
            params![run_id, url, UrlState::Failed.to_db_string(), error, now],
        )?;
        Ok(())
    }

    fn record_skipped(
        &mut self,
        run_id: i64,
        url: &str,
        referrer: &str,
        reason: &str,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT OR IGNORE INTO skipped_urls (url, referrer, reason, run_id, discovered_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![url, referrer, reason, run_id, now],
        )?;
        Ok(())
    }

    fn load_corpus(&self, run_id: i64) -> StorageResult<Corpus> {
        let mut stmt = self.conn.prepare(
            "SELECT id, url, title, text, is_file FROM pages
             WHERE run_id = ?1 AND state = ?2 ORDER BY url",
        )?;
        let rows = stmt
            .query_map(params![run_id, UrlState::Fetched.to_db_string()], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    Page {
                        url: row.get(1)?,
                        title: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                        text: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                        is_file: row.get(4)?,
                        child_links: BTreeSet::new(),
                        parent_pages: BTreeSet::new(),
                    },
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut parents_stmt = self
            .conn
            .prepare("SELECT parent_url FROM page_parents WHERE page_id = ?1")?;
        let mut links_stmt = self
            .conn
            .prepare("SELECT child_url FROM page_links WHERE page_id = ?1")?;

        let mut corpus = Corpus::new();
        for (page_id, mut page) in rows {
            page.parent_pages = parents_stmt
                .query_map(params![page_id], |row| row.get(0))?
                .collect::<Result<BTreeSet<String>, _>>()?;
            page.child_links = links_stmt
                .query_map(params![page_id], |row| row.get(0))?
                .collect::<Result<BTreeSet<String>, _>>()?;
            corpus.insert(page);
        }

        Ok(corpus)
    }

    // ===== Statistics =====

    fn count_pages_by_state(&self, run_id: i64, state: UrlState) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM pages WHERE run_id = ?1 AND state = ?2",
            params![run_id, state.to_db_string()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_files(&self, run_id: i64) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM pages WHERE run_id = ?1 AND state = ?2 AND is_file = 1",
            params![run_id, UrlState::Fetched.to_db_string()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_links(&self, run_id: i64) -> StorageResult<u64> {
        self.count(
            "SELECT COUNT(*) FROM page_links l JOIN pages p ON p.id = l.page_id WHERE p.run_id = ?1",
            run_id,
        )
    }

    fn count_parent_edges(&self, run_id: i64) -> StorageResult<u64> {
        self.count(
            "SELECT COUNT(*) FROM page_parents pp JOIN pages p ON p.id = pp.page_id WHERE p.run_id = ?1",
            run_id,
        )
    }

    fn get_skipped_urls(&self, run_id: i64) -> StorageResult<Vec<SkippedRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT url, reason, COUNT(*) AS refs FROM skipped_urls WHERE run_id = ?1
             GROUP BY url, reason ORDER BY refs DESC, url",
        )?;

        let skipped = stmt
            .query_map(params![run_id], |row| {
                Ok(SkippedRecord {
                    url: row.get(0)?,
                    reason: row.get(1)?,
                    referrers: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(skipped)
    }

    fn get_failed_urls(&self, run_id: i64) -> StorageResult<Vec<(String, String)>> {
        let mut stmt = self.conn.prepare(
            "SELECT url, COALESCE(error_message, '') FROM pages
             WHERE run_id = ?1 AND state = ?2 ORDER BY url",
        )?;

        let failed = stmt
            .query_map(params![run_id, UrlState::Failed.to_db_string()], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(failed)
    }

    fn get_most_referenced(&self, run_id: i64, limit: usize) -> StorageResult<Vec<(String, u64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT p.url, COUNT(pp.id) AS parents FROM pages p
             JOIN page_parents pp ON pp.page_id = p.id
             WHERE p.run_id = ?1
             GROUP BY p.id ORDER BY parents DESC, p.url LIMIT ?2",
        )?;

        let pages = stmt
            .query_map(params![run_id, limit as i64], |row| {
                Ok((row.get(0)?, row.get::<_, i64>(1)? as u64))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(pages)
    }
}
