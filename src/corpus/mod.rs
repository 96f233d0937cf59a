//! Corpus module: the accumulated mapping from URL to crawled page
//!
//! The corpus is the crawl's output. A URL is a key at most once; revisiting
//! a URL only adds parents to the existing page.

mod page;

pub use page::Page;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Outcome of merging a rediscovered parent into an existing page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentMerge {
    /// The parent was new and has been appended
    Added,
    /// The parent was already recorded
    AlreadyPresent,
    /// The parent is the page itself
    SelfLink,
    /// The URL is not in the corpus
    Missing,
}

/// Mapping from URL to Page, ordered by URL
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Corpus {
    pages: BTreeMap<String, Page>,
}

impl Corpus {
    /// Creates an empty corpus
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a page if its URL is not yet a key
    ///
    /// Returns false (and leaves the corpus untouched) for a duplicate URL.
    pub fn insert(&mut self, page: Page) -> bool {
        if self.pages.contains_key(&page.url) {
            return false;
        }
        self.pages.insert(page.url.clone(), page);
        true
    }

    /// Appends `parent` to the page stored under `url`
    pub fn merge_parent(&mut self, url: &str, parent: &str) -> ParentMerge {
        match self.pages.get_mut(url) {
            None => ParentMerge::Missing,
            Some(_) if url == parent => ParentMerge::SelfLink,
            Some(page) => {
                if page.add_parent(parent) {
                    ParentMerge::Added
                } else {
                    ParentMerge::AlreadyPresent
                }
            }
        }
    }

    pub fn contains(&self, url: &str) -> bool {
        self.pages.contains_key(url)
    }

    pub fn get(&self, url: &str) -> Option<&Page> {
        self.pages.get(url)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Iterates over pages in URL order
    pub fn pages(&self) -> impl Iterator<Item = &Page> {
        self.pages.values()
    }

    /// Number of file pages
    pub fn file_count(&self) -> usize {
        self.pages.values().filter(|p| p.is_file).count()
    }

    /// Total number of child links across all pages
    pub fn link_count(&self) -> usize {
        self.pages.values().map(|p| p.child_links.len()).sum()
    }

    pub fn into_pages(self) -> impl Iterator<Item = Page> {
        self.pages.into_values()
    }
}

impl FromIterator<Page> for Corpus {
    fn from_iter<I: IntoIterator<Item = Page>>(iter: I) -> Self {
        let mut corpus = Corpus::new();
        for page in iter {
            corpus.insert(page);
        }
        corpus
    }
}
