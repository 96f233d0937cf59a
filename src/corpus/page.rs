use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The unit of crawled content
///
/// Serialized with the field names downstream consumers already expect
/// (`isFile`, `child_pages`, `parent_pages`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Node identity
    pub url: String,

    /// Document title, or the last path segment for files
    pub title: String,

    /// Normalized plain text; empty for files unless text extraction is enabled
    pub text: String,

    /// True when the resource is a downloadable file rather than a page
    #[serde(rename = "isFile")]
    pub is_file: bool,

    /// Outbound links found in the page's content region
    #[serde(rename = "child_pages")]
    pub child_links: BTreeSet<String>,

    /// Pages that linked here; only ever grows
    #[serde(rename = "parent_pages")]
    pub parent_pages: BTreeSet<String>,
}

impl Page {
    /// Creates a navigable page
    ///
    /// The page's own URL is dropped from `child_links`.
    pub fn new_page(
        url: impl Into<String>,
        title: impl Into<String>,
        text: impl Into<String>,
        child_links: impl IntoIterator<Item = String>,
    ) -> Self {
        let url = url.into();
        let child_links = child_links
            .into_iter()
            .filter(|link| *link != url)
            .collect();

        Self {
            url,
            title: title.into(),
            text: text.into(),
            is_file: false,
            child_links,
            parent_pages: BTreeSet::new(),
        }
    }

    /// Creates a file leaf with no outbound links
    pub fn new_file(url: impl Into<String>, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            text: text.into(),
            is_file: true,
            child_links: BTreeSet::new(),
            parent_pages: BTreeSet::new(),
        }
    }

    /// Records a parent page
    ///
    /// Returns false when the parent was already recorded or is the page itself.
    pub fn add_parent(&mut self, parent: &str) -> bool {
        if parent == self.url {
            return false;
        }
        self.parent_pages.insert(parent.to_string())
    }
}
