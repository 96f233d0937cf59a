//! Visit ledger: the per-URL state arena shared by the crawl engine
//!
//! The ledger is decoupled from the corpus so that "claimed for fetch" and
//! "content available" are distinct. Claiming is an atomic test-and-insert
//! under one lock, so a URL is handed to at most one worker per run.

use crate::state::UrlState;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Result of attempting to claim a URL for fetching
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Claim {
    /// The caller now owns the fetch for this URL
    Acquired,
    /// Another fetch is in flight; the parent was queued for merge on completion
    InFlight,
    /// The URL already reached a terminal state
    Done(UrlState),
}

#[derive(Debug)]
struct Entry {
    state: UrlState,
    pending_parents: Vec<String>,
}

/// Shared URL -> state map
#[derive(Debug, Clone, Default)]
pub struct VisitLedger {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl VisitLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Atomically claims `url` for fetching
    ///
    /// # Arguments
    ///
    /// * `url` - The URL popped from the frontier
    /// * `parent` - The page that linked to it, if any
    ///
    /// # Returns
    ///
    /// * `Claim::Acquired` - The URL was unseen and is now `Claimed`
    /// * `Claim::InFlight` - The URL is already claimed; `parent` is kept as a pending parent
    /// * `Claim::Done(state)` - The URL is in a terminal state
    pub fn try_claim(&self, url: &str, parent: Option<&str>) -> Claim {
        let mut entries = self.lock();

        match entries.get_mut(url) {
            None => {
                entries.insert(
                    url.to_string(),
                    Entry {
                        state: UrlState::Claimed,
                        pending_parents: Vec::new(),
                    },
                );
                Claim::Acquired
            }
            Some(entry) if entry.state == UrlState::Claimed => {
                if let Some(parent) = parent {
                    if parent != url && !entry.pending_parents.iter().any(|p| p == parent) {
                        entry.pending_parents.push(parent.to_string());
                    }
                }
                Claim::InFlight
            }
            Some(entry) => Claim::Done(entry.state),
        }
    }

    /// Records a scope rejection
    ///
    /// Returns true the first time the URL is recorded.
    pub fn mark_scoped_out(&self, url: &str) -> bool {
        let mut entries = self.lock();
        if entries.contains_key(url) {
            return false;
        }
        entries.insert(
            url.to_string(),
            Entry {
                state: UrlState::ScopedOut,
                pending_parents: Vec::new(),
            },
        );
        true
    }

    /// Moves a claimed URL to a terminal state
    ///
    /// Returns the parents that rediscovered the URL while it was in flight.
    pub fn complete(&self, url: &str, state: UrlState) -> Vec<String> {
        let mut entries = self.lock();
        match entries.get_mut(url) {
            Some(entry) => {
                entry.state = state;
                std::mem::take(&mut entry.pending_parents)
            }
            None => {
                entries.insert(
                    url.to_string(),
                    Entry {
                        state,
                        pending_parents: Vec::new(),
                    },
                );
                Vec::new()
            }
        }
    }

    /// Current state of a URL, or None if it was never popped
    pub fn state(&self, url: &str) -> Option<UrlState> {
        self.lock().get(url).map(|e| e.state)
    }

    /// Number of URLs in the given state
    pub fn count(&self, state: UrlState) -> usize {
        self.lock().values().filter(|e| e.state == state).count()
    }

    /// Number of URLs the ledger knows about
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_once() {
        let ledger = VisitLedger::new();
        assert_eq!(ledger.try_claim("https://example.org/a", None), Claim::Acquired);
        assert_eq!(
            ledger.try_claim("https://example.org/a", Some("https://example.org/root")),
            Claim::InFlight
        );
        assert_eq!(ledger.state("https://example.org/a"), Some(UrlState::Claimed));
    }

    #[test]
    fn test_pending_parents_drained_on_complete() {
        let ledger = VisitLedger::new();
        let c = "https://example.org/c";
        ledger.try_claim(c, Some("https://example.org/a"));
        ledger.try_claim(c, Some("https://example.org/b"));
        ledger.try_claim(c, Some("https://example.org/b"));
        ledger.try_claim(c, Some(c));

        let pending = ledger.complete(c, UrlState::Fetched);
        assert_eq!(pending, vec!["https://example.org/b".to_string()]);
        assert_eq!(ledger.try_claim(c, Some("https://example.org/d")), Claim::Done(UrlState::Fetched));
        assert!(ledger.complete(c, UrlState::Fetched).is_empty());
    }

    #[test]
    fn test_failed_is_terminal() {
        let ledger = VisitLedger::new();
        let url = "https://example.org/broken";
        ledger.try_claim(url, None);
        ledger.complete(url, UrlState::Failed);
        assert_eq!(ledger.try_claim(url, None), Claim::Done(UrlState::Failed));
    }

    #[test]
    fn test_scoped_out_recorded_once() {
        let ledger = VisitLedger::new();
        assert!(ledger.mark_scoped_out("https://example.org/self-help/faq"));
        assert!(!ledger.mark_scoped_out("https://example.org/self-help/faq"));
        assert_eq!(
            ledger.try_claim("https://example.org/self-help/faq", None),
            Claim::Done(UrlState::ScopedOut)
        );
    }

    #[test]
    fn test_counts() {
        let ledger = VisitLedger::new();
        ledger.try_claim("https://example.org/a", None);
        ledger.try_claim("https://example.org/b", None);
        ledger.complete("https://example.org/a", UrlState::Fetched);
        ledger.mark_scoped_out("https://other.org/");

        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.count(UrlState::Fetched), 1);
        assert_eq!(ledger.count(UrlState::Claimed), 1);
        assert_eq!(ledger.count(UrlState::ScopedOut), 1);
    }

    #[test]
    fn test_concurrent_claims_single_winner() {
        let ledger = VisitLedger::new();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let ledger = ledger.clone();
                std::thread::spawn(move || {
                    let parent = format!("https://example.org/p{}", i);
                    ledger.try_claim("https://example.org/shared", Some(&parent))
                })
            })
            .collect();

        let acquired = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|c| *c == Claim::Acquired)
            .count();
        assert_eq!(acquired, 1);
        assert_eq!(ledger.complete("https://example.org/shared", UrlState::Fetched).len(), 7);
    }
}
