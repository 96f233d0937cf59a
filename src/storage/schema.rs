//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Jury-Corpus database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track crawl runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    seed_url TEXT NOT NULL,
    status TEXT NOT NULL
);

-- Every URL the crawl claimed: fetched pages and files, and failures
CREATE TABLE IF NOT EXISTS pages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    url TEXT NOT NULL,
    state TEXT NOT NULL,
    title TEXT,
    text TEXT,
    is_file INTEGER NOT NULL DEFAULT 0,
    error_message TEXT,
    recorded_at TEXT NOT NULL,
    UNIQUE(run_id, url)
);

CREATE INDEX IF NOT EXISTS idx_pages_run ON pages(run_id);
CREATE INDEX IF NOT EXISTS idx_pages_state ON pages(state);
CREATE INDEX IF NOT EXISTS idx_pages_url ON pages(url);

-- Pages that linked to a page (multi-parent edges)
CREATE TABLE IF NOT EXISTS page_parents (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    page_id INTEGER NOT NULL REFERENCES pages(id),
    parent_url TEXT NOT NULL,
    UNIQUE(page_id, parent_url)
);

CREATE INDEX IF NOT EXISTS idx_page_parents_page ON page_parents(page_id);

-- Outbound links found in a page's content region
CREATE TABLE IF NOT EXISTS page_links (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    page_id INTEGER NOT NULL REFERENCES pages(id),
    child_url TEXT NOT NULL,
    UNIQUE(page_id, child_url)
);

CREATE INDEX IF NOT EXISTS idx_page_links_page ON page_links(page_id);

-- Track scoped-out URLs and who linked to them
CREATE TABLE IF NOT EXISTS skipped_urls (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL,
    referrer TEXT NOT NULL,
    reason TEXT NOT NULL,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    discovered_at TEXT NOT NULL,
    UNIQUE(run_id, url, referrer)
);

CREATE INDEX IF NOT EXISTS idx_skipped_url ON skipped_urls(url);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_initializes() {
        let conn = Connection::open_in_memory().unwrap();
        let result = initialize_schema(&conn);
        assert!(result.is_ok());
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        initialize_schema(&conn).unwrap();
        let result = initialize_schema(&conn);

        assert!(result.is_ok());
    }

    #[test]
    fn test_tables_exist_after_init() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        let tables = vec!["runs", "pages", "page_parents", "page_links", "skipped_urls"];

        for table in tables {
            let count: Result<i64, _> = conn.query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                [table],
                |row| row.get(0),
            );
            assert!(count.is_ok());
            assert_eq!(count.unwrap(), 1, "Table {} should exist", table);
        }
    }
}
