//! HTML parser for extracting the content region, title, and links
//!
//! Only anchors inside the configured content container are followed, so
//! site-wide navigation, headers, and footers never enter the link graph.

use crate::crawler::ExtractError;
use crate::url::{format_url, ScopeFilter};
use scraper::{ElementRef, Html, Selector};

/// Extracted information from an HTML page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// Inner HTML of the content container
    pub content_html: String,

    /// Links found in the content container (absolute, deduplicated, in document order)
    pub links: Vec<String>,
}

/// Parses an HTML document and extracts its content region
///
/// # Link Extraction Rules
///
/// **Include** (anchors inside the container only):
/// - hrefs starting with `/` (rewritten to `domain + path`)
/// - absolute URLs on the crawl domain
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs and fragment-only links
/// - Protocol-relative and document-relative hrefs
/// - Absolute URLs on other domains
/// - The page's own URL
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `page_url` - URL of the page being parsed
/// * `selector` - Parsed content container selector
/// * `selector_text` - The selector as configured, for error messages
/// * `scope` - Scope filter providing the crawl domain
///
/// # Returns
///
/// * `Ok(ParsedPage)` - Successfully parsed page
/// * `Err(ExtractError::MissingContent)` - The container is absent
pub fn parse_page(
    html: &str,
    page_url: &str,
    selector: &Selector,
    selector_text: &str,
    scope: &ScopeFilter,
) -> Result<ParsedPage, ExtractError> {
    let document = Html::parse_document(html);

    let container = document
        .select(selector)
        .next()
        .ok_or_else(|| ExtractError::MissingContent {
            url: page_url.to_string(),
            selector: selector_text.to_string(),
        })?;

    let title = extract_title(&document);
    let links = extract_links(container, page_url, scope);

    Ok(ParsedPage {
        title,
        content_html: container.inner_html(),
        links,
    })
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extracts followable links from the content container
fn extract_links(container: ElementRef<'_>, page_url: &str, scope: &ScopeFilter) -> Vec<String> {
    let mut links: Vec<String> = Vec::new();

    let a_selector = match Selector::parse("a[href]") {
        Ok(selector) => selector,
        Err(_) => return links,
    };

    for element in container.select(&a_selector) {
        // Skip if it has the download attribute
        if element.value().attr("download").is_some() {
            continue;
        }

        if let Some(href) = element.value().attr("href") {
            if let Some(link) = resolve_link(href, scope) {
                if link != page_url && !links.contains(&link) {
                    links.push(link);
                }
            }
        }
    }

    links
}

/// Resolves a link href to an absolute in-domain URL
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only or empty hrefs
/// - anything that is neither a root-relative path nor an absolute URL on the crawl domain
fn resolve_link(href: &str, scope: &ScopeFilter) -> Option<String> {
    let href = href.trim();

    // Skip empty hrefs
    if href.is_empty() {
        return None;
    }

    // Skip special schemes
    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    // Skip fragment-only links (same page anchors)
    if href.starts_with('#') {
        return None;
    }

    let is_root_relative = href.starts_with('/') && !href.starts_with("//");
    if !is_root_relative && !scope.is_same_domain(href) {
        return None;
    }

    let url = format_url(href, scope.domain());
    if url.is_empty() {
        None
    } else {
        Some(url)
    }
}
