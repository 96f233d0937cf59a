//! Text extraction from raw HTML and PDF bytes

use crate::crawler::ExtractError;
use scraper::{ElementRef, Html};

/// Elements whose text never belongs in the corpus
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Elements that separate words; inline markup joins its text to its neighbors
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr",
    "li", "main", "nav", "ol", "option", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// Kind of document handed to a text extractor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Html,
    Pdf,
}

/// Converts raw document bytes to normalized plain text
pub trait TextExtractor: Send + Sync {
    fn to_text(&self, bytes: &[u8], kind: DocumentKind) -> Result<String, ExtractError>;
}

/// Default extractor: scraper for HTML, pdf-extract for PDF
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentTextExtractor;

impl TextExtractor for DocumentTextExtractor {
    fn to_text(&self, bytes: &[u8], kind: DocumentKind) -> Result<String, ExtractError> {
        let raw = match kind {
            DocumentKind::Html => html_text(&String::from_utf8_lossy(bytes)),
            DocumentKind::Pdf => pdf_extract::extract_text_from_mem(bytes)
                .map_err(|e| ExtractError::Pdf(e.to_string()))?,
        };
        Ok(normalize_text(&raw))
    }
}

/// Collects the visible text of an HTML fragment
fn html_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut out = String::new();
    collect_text(fragment.root_element(), &mut out);
    out
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child_element) = ElementRef::wrap(child) {
            let name = child_element.value().name();
            if SKIPPED_ELEMENTS.contains(&name) {
                continue;
            }
            let block = BLOCK_ELEMENTS.contains(&name);
            if block {
                out.push(' ');
            }
            collect_text(child_element, out);
            if block {
                out.push(' ');
            }
        }
    }
}

/// Strips non-ASCII and control characters and collapses whitespace
///
/// # Example
///
/// ```
/// use jury_corpus::crawler::normalize_text;
///
/// assert_eq!(normalize_text("  Juror\u{a0}Info\n\tCenter  "), "Juror Info Center");
/// assert_eq!(normalize_text("caf\u{e9} hours"), "caf hours");
/// ```
pub fn normalize_text(raw: &str) -> String {
    let ascii: String = raw
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .filter(|c| c.is_ascii() && !c.is_ascii_control())
        .collect();

    ascii.split_whitespace().collect::<Vec<_>>().join(" ")
}
