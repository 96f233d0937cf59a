//! HTTP fetcher implementation
//!
//! This module defines the `Fetcher` seam used by the extractor and the
//! export sink, and its default `HttpFetcher` built on reqwest:
//! - Browser-like user agent string
//! - Per-request and connect timeouts
//! - No internal retries; a failure is reported once to the caller

use crate::config::{CrawlerConfig, UserAgentConfig};
use async_trait::async_trait;
use reqwest::{header, Client};
use std::time::Duration;
use thiserror::Error;

/// Connect timeout applied to every request
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Raw response handed back by a fetcher
#[derive(Debug, Clone)]
pub struct FetchedResource {
    /// Final URL after redirects
    pub final_url: String,
    /// HTTP status code
    pub status: u16,
    /// Content-Type header value (empty when absent)
    pub content_type: String,
    /// Response body
    pub body: Vec<u8>,
}

impl FetchedResource {
    /// Returns true when the content type denotes an HTML document
    pub fn is_html(&self) -> bool {
        let ct = self.content_type.to_ascii_lowercase();
        ct.contains("text/html") || ct.contains("application/xhtml")
    }

    /// Returns true when the content type denotes a PDF document
    pub fn is_pdf(&self) -> bool {
        self.content_type.to_ascii_lowercase().contains("application/pdf")
    }
}

/// Fetch failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Network failure fetching {url}: {message}")]
    Network { url: String, message: String },

    #[error("HTTP {status} fetching {url}")]
    HttpStatus { url: String, status: u16 },
}

impl FetchError {
    /// The URL that failed
    pub fn url(&self) -> &str {
        match self {
            Self::Network { url, .. } | Self::HttpStatus { url, .. } => url,
        }
    }
}

/// Retrieves raw bytes for a URL
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches a URL once
    ///
    /// # Returns
    ///
    /// * `Ok(FetchedResource)` - A 2xx response and its body
    /// * `Err(FetchError::HttpStatus)` - A non-2xx response
    /// * `Err(FetchError::Network)` - Connection, timeout, or body read failure
    async fn fetch(&self, url: &str) -> Result<FetchedResource, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `timeout` - Total per-request timeout
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static("text/html,application/xhtml+xml,application/pdf;q=0.9,*/*;q=0.8"),
    );

    Client::builder()
        .user_agent(user_agent.header.clone())
        .default_headers(headers)
        .timeout(timeout)
        .connect_timeout(CONNECT_TIMEOUT)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Default fetcher over a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a fetcher from the crawler and user agent settings
    pub fn from_config(
        crawler: &CrawlerConfig,
        user_agent: &UserAgentConfig,
    ) -> Result<Self, reqwest::Error> {
        let client = build_http_client(
            user_agent,
            Duration::from_secs(crawler.request_timeout_secs),
        )?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedResource, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| network_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let body = response
            .bytes()
            .await
            .map_err(|e| network_error(url, &e))?;

        Ok(FetchedResource {
            final_url,
            status: status.as_u16(),
            content_type,
            body: body.to_vec(),
        })
    }
}

/// Classifies a reqwest error into a readable message
fn network_error(url: &str, error: &reqwest::Error) -> FetchError {
    let message = if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        "Connection refused".to_string()
    } else if error.is_redirect() {
        "Redirect loop".to_string()
    } else {
        error.to_string()
    };

    FetchError::Network {
        url: url.to_string(),
        message,
    }
}
