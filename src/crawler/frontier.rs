//! Frontier: the work list of discovered-but-not-yet-processed URLs
//!
//! Duplicate entries for the same URL are allowed; they are resolved when
//! popped, so every rediscovering parent gets a chance to be merged.

use crate::config::TraversalOrder;
use std::collections::VecDeque;

/// A URL waiting to be processed, with the page that linked to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    /// The URL to process
    pub url: String,

    /// The originating page; None only for the seed
    pub parent: Option<String>,
}

impl FrontierEntry {
    pub fn seed(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            parent: None,
        }
    }

    pub fn child(url: impl Into<String>, parent: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            parent: Some(parent.into()),
        }
    }
}

/// LIFO stack or FIFO queue of frontier entries
#[derive(Debug)]
pub struct Frontier {
    order: TraversalOrder,
    entries: VecDeque<FrontierEntry>,
    pushed: u64,
}

impl Frontier {
    pub fn new(order: TraversalOrder) -> Self {
        Self {
            order,
            entries: VecDeque::new(),
            pushed: 0,
        }
    }

    pub fn push(&mut self, entry: FrontierEntry) {
        self.pushed += 1;
        self.entries.push_back(entry);
    }

    /// Removes the next entry
    ///
    /// Depth-first pops the newest entry, breadth-first the oldest.
    pub fn pop(&mut self) -> Option<FrontierEntry> {
        match self.order {
            TraversalOrder::DepthFirst => self.entries.pop_back(),
            TraversalOrder::BreadthFirst => self.entries.pop_front(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of entries ever pushed
    pub fn total_pushed(&self) -> u64 {
        self.pushed
    }

    pub fn order(&self) -> TraversalOrder {
        self.order
    }
}
