use crate::UrlError;
use url::Url;

/// Normalizes a discovered href into the identity string of a crawl node
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace
/// 2. Remove the fragment (everything after `#`)
/// 3. A path starting with a single `/` is rewritten to `domain + path`
///
/// Everything else is returned unchanged: URLs on other domains are rejected
/// later by the scope filter, not here. No trailing-slash, query or case
/// canonicalization is performed.
///
/// # Examples
///
/// ```
/// use jury_corpus::url::format_url;
///
/// let domain = "https://www.njcourts.gov";
/// assert_eq!(
///     format_url("/jurors/reporting", domain),
///     "https://www.njcourts.gov/jurors/reporting"
/// );
/// assert_eq!(format_url("https://other.org/a", domain), "https://other.org/a");
/// ```
pub fn format_url(href: &str, domain: &str) -> String {
    let href = href.trim();
    let href = match href.find('#') {
        Some(idx) => &href[..idx],
        None => href,
    };

    if href.starts_with('/') && !href.starts_with("//") {
        format!("{}{}", domain.trim_end_matches('/'), href)
    } else {
        href.to_string()
    }
}

/// Parses an absolute HTTP(S) URL that has a host
pub fn parse_http_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    Ok(url)
}

/// Derives a display title from the last path segment of a URL
///
/// The query string and fragment are stripped. Falls back to the whole URL
/// when the last segment is empty.
pub fn title_from_url(url: &str) -> String {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    let segment = without_query.rsplit('/').next().unwrap_or("");

    if segment.is_empty() {
        url.to_string()
    } else {
        segment.to_string()
    }
}
