use crate::config::CrawlerConfig;
use crate::url::domain::same_host;
use crate::url::normalize::parse_http_url;
use crate::UrlError;
use std::fmt;
use url::Url;

/// Reason a URL was kept out of the crawl
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScopeRejection {
    /// The URL is the bare domain root
    DomainRoot,
    /// The URL contains an excluded prefix
    Excluded(String),
    /// The URL is not on the crawl domain (or does not parse)
    ForeignDomain,
}

impl fmt::Display for ScopeRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DomainRoot => write!(f, "domain root"),
            Self::Excluded(prefix) => write!(f, "excluded by '{}'", prefix),
            Self::ForeignDomain => write!(f, "foreign domain"),
        }
    }
}

/// Decides whether a discovered URL may be traversed
///
/// A URL is out of scope when, checked in this order:
/// 1. it equals the bare domain root
/// 2. it contains any excluded prefix as a substring
/// 3. its host (and port) differ from the crawl domain
#[derive(Debug, Clone)]
pub struct ScopeFilter {
    domain: Url,
    root: String,
    excluded: Vec<String>,
}

impl ScopeFilter {
    /// Creates a filter for `domain`, a base URL such as `https://www.njcourts.gov`
    pub fn new(domain: &str, excluded_prefixes: &[String]) -> Result<Self, UrlError> {
        let parsed = parse_http_url(domain)?;

        Ok(Self {
            domain: parsed,
            root: domain.trim().trim_end_matches('/').to_string(),
            excluded: excluded_prefixes
                .iter()
                .filter(|p| !p.is_empty())
                .cloned()
                .collect(),
        })
    }

    /// Creates a filter from the crawler configuration
    pub fn from_config(config: &CrawlerConfig) -> Result<Self, UrlError> {
        Self::new(&config.domain, &config.excluded_prefixes)
    }

    /// The crawl domain without a trailing slash, used to absolutize paths
    pub fn domain(&self) -> &str {
        &self.root
    }

    /// Returns true when the URL is on the crawl domain
    pub fn is_same_domain(&self, url: &str) -> bool {
        match Url::parse(url) {
            Ok(parsed) => same_host(&self.domain, &parsed),
            Err(_) => false,
        }
    }

    /// Checks a URL and reports why it is out of scope
    pub fn check(&self, url: &str) -> Result<(), ScopeRejection> {
        if url.trim_end_matches('/') == self.root {
            return Err(ScopeRejection::DomainRoot);
        }

        if let Some(prefix) = self.excluded.iter().find(|p| url.contains(p.as_str())) {
            return Err(ScopeRejection::Excluded(prefix.clone()));
        }

        if !self.is_same_domain(url) {
            return Err(ScopeRejection::ForeignDomain);
        }

        Ok(())
    }

    /// Returns true when the URL may be fetched
    pub fn in_scope(&self, url: &str) -> bool {
        self.check(url).is_ok()
    }
}
