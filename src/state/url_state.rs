/// URL state definitions for tracking crawl progress
///
/// This module defines the states a URL can be in once the crawl engine has
/// popped it from the frontier. URLs still waiting in the frontier have no
/// entry in the ledger.
use std::fmt;

/// Represents the current state of a URL in the crawl process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlState {
    // ===== Active States =====
    /// URL has been claimed by a worker and is being fetched
    Claimed,

    // ===== Terminal Success States =====
    /// URL was fetched, extracted, and inserted into the corpus
    Fetched,

    // ===== Terminal Skip States =====
    /// URL was rejected by the scope filter - recorded but never fetched
    ScopedOut,

    // ===== Terminal Error States =====
    /// Classification, fetch, or extraction failed; never retried
    Failed,
}

impl UrlState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Claimed)
    }

    /// Returns true if this represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Fetched)
    }

    /// Returns true if this represents a skip state
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::ScopedOut)
    }

    /// Returns true if this represents an error state
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed)
    }

    /// Converts the state to a database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Claimed => "claimed",
            Self::Fetched => "fetched",
            Self::ScopedOut => "scoped_out",
            Self::Failed => "failed",
        }
    }

    /// Parses a state from a database string representation
    ///
    /// Returns None if the string doesn't match any known state.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "claimed" => Some(Self::Claimed),
            "fetched" => Some(Self::Fetched),
            "scoped_out" => Some(Self::ScopedOut),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Returns all possible URL states
    pub fn all_states() -> Vec<Self> {
        vec![Self::Claimed, Self::Fetched, Self::ScopedOut, Self::Failed]
    }
}

impl fmt::Display for UrlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
