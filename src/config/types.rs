use serde::Deserialize;

/// Browser-like identification sent with every request by default
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/129.0.0.0 Safari/537.36 Edg/129.0.0.0";

/// Main configuration structure for Jury-Corpus
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Order in which the frontier hands out work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TraversalOrder {
    /// LIFO stack: newest discovered links are processed first
    #[default]
    DepthFirst,
    /// FIFO queue: links are processed in discovery order
    BreadthFirst,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// URL the crawl starts from
    #[serde(rename = "seed-url")]
    pub seed_url: String,

    /// Base URL of the crawl domain (e.g. "https://www.njcourts.gov")
    pub domain: String,

    /// Any URL containing one of these strings is out of scope
    #[serde(rename = "excluded-prefixes", default)]
    pub excluded_prefixes: Vec<String>,

    #[serde(default)]
    pub traversal: TraversalOrder,

    /// Maximum number of concurrent fetches
    #[serde(default = "default_workers")]
    pub workers: u32,

    /// CSS selector of the primary content region of a page
    #[serde(rename = "content-selector", default = "default_content_selector")]
    pub content_selector: String,

    /// File extensions that still denote navigable pages
    #[serde(rename = "page-extensions", default = "default_page_extensions")]
    pub page_extensions: Vec<String>,

    /// Download PDFs and extract their text instead of leaving it empty
    #[serde(rename = "extract-file-text", default)]
    pub extract_file_text: bool,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Value of the User-Agent header
    #[serde(default = "default_user_agent")]
    pub header: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            header: default_user_agent(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the JSON corpus file
    #[serde(rename = "corpus-path")]
    pub corpus_path: String,

    /// Path to the SQLite database file
    #[serde(rename = "database-path", default)]
    pub database_path: Option<String>,

    /// Directory receiving one record per page
    #[serde(rename = "export-dir", default)]
    pub export_dir: Option<String>,

    /// Path to the markdown summary file
    #[serde(rename = "summary-path", default)]
    pub summary_path: Option<String>,

    /// Source label written into exported records
    #[serde(default = "default_source")]
    pub source: String,
}

fn default_workers() -> u32 {
    1
}

fn default_content_selector() -> String {
    "div#page-content".to_string()
}

fn default_page_extensions() -> Vec<String> {
    ["html", "htm", "aspx", "php", "jsp"]
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_source() -> String {
    "crawl".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let config: Config = toml::from_str(
            r#"
[crawler]
seed-url = "https://example.org/root"
domain = "https://example.org"

[output]
corpus-path = "./corpus.json"
"#,
        )
        .unwrap();

        assert_eq!(config.crawler.traversal, TraversalOrder::DepthFirst);
        assert_eq!(config.crawler.workers, 1);
        assert_eq!(config.crawler.content_selector, "div#page-content");
        assert!(config.crawler.page_extensions.contains(&"aspx".to_string()));
        assert!(!config.crawler.extract_file_text);
        assert_eq!(config.user_agent.header, DEFAULT_USER_AGENT);
        assert!(config.output.database_path.is_none());
        assert_eq!(config.output.source, "crawl");
    }

    #[test]
    fn test_breadth_first_parses() {
        let crawler: CrawlerConfig = toml::from_str(
            r#"
seed-url = "https://example.org/root"
domain = "https://example.org"
traversal = "breadth-first"
"#,
        )
        .unwrap();
        assert_eq!(crawler.traversal, TraversalOrder::BreadthFirst);
    }
}
