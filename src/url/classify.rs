use crate::url::normalize::parse_http_url;
use std::fmt;

/// Kind of downloadable file
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// PDF document (text can be extracted)
    Pdf,
    /// Any other extension, stored lowercase
    Other(String),
}

/// Classification of a URL by its shape
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UrlKind {
    /// Navigable HTML page
    Page,
    /// Downloadable file; never traversed for links
    File(FileKind),
    /// Not a crawlable target
    Invalid,
}

impl UrlKind {
    pub fn is_page(&self) -> bool {
        matches!(self, Self::Page)
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid)
    }
}

impl fmt::Display for UrlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page => write!(f, "page"),
            Self::File(FileKind::Pdf) => write!(f, "file (pdf)"),
            Self::File(FileKind::Other(ext)) => write!(f, "file ({})", ext),
            Self::Invalid => write!(f, "invalid"),
        }
    }
}

/// Classifies a URL as a page, a file, or an invalid target
///
/// # Rules
///
/// 1. Anything that is not an absolute HTTP(S) URL with a host is `Invalid`
/// 2. The final path segment (after the last `/`, query excluded) decides:
///    - no `.` in the segment → `Page`
///    - a trailing `.` with no extension → `Invalid`
///    - an extension listed in `page_extensions` → `Page`
///    - `pdf` → `File(Pdf)`
///    - any other extension → `File(Other)`
///
/// Extension matching is case-insensitive.
///
/// # Examples
///
/// ```
/// use jury_corpus::url::{classify, FileKind, UrlKind};
///
/// let page_exts = vec!["html".to_string()];
/// assert_eq!(classify("https://www.njcourts.gov/jurors", &page_exts), UrlKind::Page);
/// assert_eq!(
///     classify("https://www.njcourts.gov/forms/jury.pdf", &page_exts),
///     UrlKind::File(FileKind::Pdf)
/// );
/// assert_eq!(classify("mailto:clerk@example.org", &page_exts), UrlKind::Invalid);
/// ```
pub fn classify(url: &str, page_extensions: &[String]) -> UrlKind {
    let parsed = match parse_http_url(url) {
        Ok(parsed) => parsed,
        Err(_) => return UrlKind::Invalid,
    };

    let segment = parsed.path().rsplit('/').next().unwrap_or("");

    match segment.rsplit_once('.') {
        None => UrlKind::Page,
        Some((_, "")) => UrlKind::Invalid,
        Some((_, ext)) => {
            let ext = ext.to_ascii_lowercase();
            if page_extensions.iter().any(|p| p.eq_ignore_ascii_case(&ext)) {
                UrlKind::Page
            } else if ext == "pdf" {
                UrlKind::File(FileKind::Pdf)
            } else {
                UrlKind::File(FileKind::Other(ext))
            }
        }
    }
}
