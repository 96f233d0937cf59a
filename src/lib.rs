//! Jury-Corpus: a scoped site crawler that builds a text corpus
//!
//! This crate crawls one section of a website from a seed URL, extracts
//! normalized text from HTML pages and linked documents, and records the link
//! graph with multi-parent tracking. The resulting corpus is written to JSON,
//! SQLite, or a blob-style export directory.

pub mod config;
pub mod corpus;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Jury-Corpus operations
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Seed URL {url} could not be crawled: {reason}")]
    SeedUnreachable { url: String, reason: String },

    #[error("Fetch error: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("Extraction error: {0}")]
    Extract(#[from] crawler::ExtractError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    StorageError(#[from] storage::StorageError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CorpusError {
    /// Process exit code for this error
    ///
    /// * `1` - configuration error
    /// * `2` - unrecoverable fetch error (the seed could not be crawled)
    /// * `3` - output or storage error
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 1,
            Self::SeedUnreachable { .. } | Self::Fetch(_) | Self::Extract(_) | Self::Reqwest(_) => 2,
            _ => 3,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid content selector: {0}")]
    InvalidSelector(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for Jury-Corpus operations
pub type Result<T> = std::result::Result<T, CorpusError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use corpus::{Corpus, Page};
pub use crawler::{crawl, Coordinator, CrawlOutput, CrawlReport};
pub use state::UrlState;
pub use url::{classify, format_url, FileKind, ScopeFilter, UrlKind};
