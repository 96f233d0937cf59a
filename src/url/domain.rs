use url::Url;

/// Extracts the domain from a URL
///
/// Returns the lowercase host, or `None` when the URL has no host.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use jury_corpus::url::extract_domain;
///
/// let url = Url::parse("https://WWW.NJCOURTS.GOV/jurors").unwrap();
/// assert_eq!(extract_domain(&url), Some("www.njcourts.gov".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns true when both URLs point at the same host and port
///
/// The scheme is not compared, so `http://` and `https://` links to the
/// crawl domain are both treated as in-domain. Ports are compared after
/// applying the scheme's default.
pub fn same_host(a: &Url, b: &Url) -> bool {
    match (extract_domain(a), extract_domain(b)) {
        (Some(host_a), Some(host_b)) => {
            host_a == host_b && a.port_or_known_default() == b.port_or_known_default()
        }
        _ => false,
    }
}
