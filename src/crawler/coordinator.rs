//! Crawler coordinator - main crawl orchestration logic
//!
//! The coordinating task exclusively owns the frontier and the corpus.
//! Extraction runs on worker tasks; the visit ledger guarantees each URL is
//! claimed once, and parents found while a URL is in flight are merged when
//! its fetch completes.

use crate::config::CrawlerConfig;
use crate::corpus::{Corpus, Page, ParentMerge};
use crate::crawler::extract::{ExtractError, ExtractSettings, Extractor};
use crate::crawler::fetcher::Fetcher;
use crate::crawler::frontier::{Frontier, FrontierEntry};
use crate::crawler::observer::{CrawlEvent, CrawlObserver, SkipReason};
use crate::crawler::text::TextExtractor;
use crate::state::{Claim, UrlState, VisitLedger};
use crate::url::{classify, ScopeFilter, ScopeRejection, UrlKind};
use crate::{ConfigError, CorpusError};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::{self, JoinSet};

/// Requests a graceful stop of a running crawl
///
/// After a request no new frontier entries are dequeued; in-flight fetches
/// finish and are merged.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle {
    requested: Arc<AtomicBool>,
}

impl ShutdownHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

/// A URL kept out of the crawl and every page that linked to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedUrl {
    pub reason: ScopeRejection,
    pub referrers: BTreeSet<String>,
}

/// What happened during a crawl, beyond the corpus itself
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// URLs extracted and inserted into the corpus
    pub pages_fetched: usize,

    /// How many of those were files
    pub files: usize,

    /// Parents appended to already-recorded pages
    pub parents_merged: usize,

    /// Scoped-out URLs
    pub skipped: BTreeMap<String, SkippedUrl>,

    /// Failed URLs and the reason they failed
    pub failed: BTreeMap<String, String>,

    /// Frontier entries left unprocessed
    pub pending: usize,

    /// True when the crawl stopped on a shutdown request
    pub interrupted: bool,

    pub elapsed: Duration,
}

/// Final result of a crawl, handed to every sink
#[derive(Debug, Clone)]
pub struct CrawlOutput {
    pub corpus: Corpus,
    pub report: CrawlReport,
}

type WorkResult = (FrontierEntry, UrlKind, Result<Page, ExtractError>);

/// Main crawler coordinator structure
pub struct Coordinator {
    seed: String,
    scope: Arc<ScopeFilter>,
    page_extensions: Vec<String>,
    workers: usize,
    extractor: Extractor,
    observer: Arc<dyn CrawlObserver>,
    ledger: VisitLedger,
    frontier: Frontier,
    corpus: Corpus,
    report: CrawlReport,
    shutdown: ShutdownHandle,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `fetcher` - Retrieves raw bytes for pages and files
    /// * `text` - Converts HTML and PDF bytes to plain text
    /// * `observer` - Receives a `CrawlEvent` for every page outcome
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(CorpusError::Config)` - The domain or content selector is invalid
    pub fn new(
        config: &CrawlerConfig,
        fetcher: Arc<dyn Fetcher>,
        text: Arc<dyn TextExtractor>,
        observer: Arc<dyn CrawlObserver>,
    ) -> Result<Self, CorpusError> {
        let scope = Arc::new(
            ScopeFilter::from_config(config)
                .map_err(|e| ConfigError::InvalidUrl(format!("domain '{}': {}", config.domain, e)))?,
        );

        let extractor = Extractor::new(fetcher, text, scope.clone(), ExtractSettings::from(config))
            .map_err(|e| ConfigError::InvalidSelector(e.to_string()))?;

        Ok(Self {
            seed: config.seed_url.trim().to_string(),
            scope,
            page_extensions: config.page_extensions.clone(),
            workers: config.workers.max(1) as usize,
            extractor,
            observer,
            ledger: VisitLedger::new(),
            frontier: Frontier::new(config.traversal),
            corpus: Corpus::new(),
            report: CrawlReport::default(),
            shutdown: ShutdownHandle::new(),
        })
    }

    /// Replaces the shutdown handle, e.g. with one wired to Ctrl-C
    pub fn with_shutdown(mut self, shutdown: ShutdownHandle) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    pub fn ledger(&self) -> &VisitLedger {
        &self.ledger
    }

    /// Runs the main crawl loop until the frontier is empty or a shutdown is requested
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlOutput)` - The corpus and the crawl report
    /// * `Err(CorpusError::SeedUnreachable)` - The seed was out of scope, invalid, or failed
    pub async fn run(mut self) -> Result<CrawlOutput, CorpusError> {
        tracing::info!(
            "Starting crawl from {} ({:?}, {} worker(s))",
            self.seed,
            self.frontier.order(),
            self.workers
        );

        let start_time = Instant::now();
        let mut in_flight: JoinSet<WorkResult> = JoinSet::new();
        // Entries by task so an aborted extraction can still be failed
        let mut claimed: HashMap<task::Id, FrontierEntry> = HashMap::new();
        let mut processed: u64 = 0;

        self.frontier.push(FrontierEntry::seed(self.seed.clone()));

        loop {
            while in_flight.len() < self.workers && !self.shutdown.is_requested() {
                let entry = match self.frontier.pop() {
                    Some(entry) => entry,
                    None => break,
                };

                if let Some(kind) = self.admit(&entry)? {
                    let extractor = self.extractor.clone();
                    let work = entry.clone();
                    let handle = in_flight.spawn(async move {
                        let result = extractor.extract(&work.url, &kind).await;
                        (work, kind, result)
                    });
                    claimed.insert(handle.id(), entry);
                }
            }

            let joined = match in_flight.join_next_with_id().await {
                Some(joined) => joined,
                None => {
                    if self.frontier.is_empty() {
                        tracing::info!("Frontier is empty, crawl complete");
                    } else {
                        tracing::info!(
                            "Shutdown requested, leaving {} frontier entries unprocessed",
                            self.frontier.len()
                        );
                    }
                    break;
                }
            };

            match joined {
                Ok((id, (entry, kind, result))) => {
                    claimed.remove(&id);
                    self.complete(entry, kind, result)?
                }
                Err(e) => match claimed.remove(&e.id()) {
                    Some(entry) => {
                        tracing::error!("Extraction of {} aborted: {}", entry.url, e);
                        self.fail(&entry, format!("extraction aborted: {}", e))?
                    }
                    None => tracing::error!("Extraction task aborted: {}", e),
                },
            }

            processed += 1;

            // Progress reporting every 10 pages
            if processed % 10 == 0 {
                let elapsed = start_time.elapsed();
                let rate = processed as f64 / elapsed.as_secs_f64();
                tracing::info!(
                    "Progress: {} URLs processed, {} in corpus, {} in frontier, {:.2} pages/sec",
                    processed,
                    self.corpus.len(),
                    self.frontier.len(),
                    rate
                );
            }
        }

        self.report.pending = self.frontier.len();
        self.report.interrupted = self.shutdown.is_requested();
        self.report.elapsed = start_time.elapsed();

        tracing::info!(
            "Crawl finished: {} pages ({} files), {} parents merged, {} skipped, {} failed in {:?}",
            self.report.pages_fetched,
            self.report.files,
            self.report.parents_merged,
            self.report.skipped.len(),
            self.report.failed.len(),
            self.report.elapsed
        );
        tracing::debug!(
            "{} frontier entries pushed, {} child links recorded",
            self.frontier.total_pushed(),
            self.corpus.link_count()
        );

        Ok(CrawlOutput {
            corpus: self.corpus,
            report: self.report,
        })
    }

    /// Decides what to do with a popped entry
    ///
    /// Returns the URL's classification when it must be extracted.
    fn admit(&mut self, entry: &FrontierEntry) -> Result<Option<UrlKind>, CorpusError> {
        let url = entry.url.as_str();
        let parent = entry.parent.as_deref();

        if let Err(rejection) = self.scope.check(url) {
            if parent.is_none() {
                return Err(seed_unreachable(url, format!("out of scope ({})", rejection)));
            }
            self.record_skipped(entry, rejection);
            return Ok(None);
        }

        if self.corpus.contains(url) {
            if let Some(parent) = parent {
                self.merge_parent(url, parent);
            }
            return Ok(None);
        }

        match self.ledger.try_claim(url, parent) {
            Claim::Acquired => {}
            Claim::InFlight => {
                tracing::trace!("{} already in flight, parent queued", url);
                return Ok(None);
            }
            Claim::Done(UrlState::Failed) => {
                self.observer.on_event(&CrawlEvent::PageSkipped {
                    url: entry.url.clone(),
                    parent: entry.parent.clone(),
                    reason: SkipReason::PreviouslyFailed,
                });
                return Ok(None);
            }
            Claim::Done(state) => {
                tracing::trace!("{} already {}", url, state);
                return Ok(None);
            }
        }

        let kind = classify(url, &self.page_extensions);
        if kind.is_invalid() {
            self.fail(entry, ExtractError::InvalidUrl(entry.url.clone()).to_string())?;
            return Ok(None);
        }

        Ok(Some(kind))
    }

    /// Merges a finished extraction into the corpus
    fn complete(
        &mut self,
        entry: FrontierEntry,
        kind: UrlKind,
        result: Result<Page, ExtractError>,
    ) -> Result<(), CorpusError> {
        let mut page = match result {
            Ok(page) => page,
            Err(e) => return self.fail(&entry, e.to_string()),
        };

        let pending = self.ledger.complete(&entry.url, UrlState::Fetched);

        if let Some(parent) = &entry.parent {
            page.add_parent(parent);
        }

        let children: Vec<String> = page.child_links.iter().cloned().collect();
        let is_file = page.is_file;

        self.corpus.insert(page);
        self.report.pages_fetched += 1;
        if is_file {
            self.report.files += 1;
        }

        self.observer.on_event(&CrawlEvent::PageFetched {
            url: entry.url.clone(),
            kind,
            parent: entry.parent.clone(),
            child_links: children.len(),
        });

        for parent in pending {
            self.merge_parent(&entry.url, &parent);
        }

        for child in children {
            self.frontier
                .push(FrontierEntry::child(child, entry.url.clone()));
        }

        Ok(())
    }

    fn merge_parent(&mut self, url: &str, parent: &str) {
        if self.corpus.merge_parent(url, parent) == ParentMerge::Added {
            self.report.parents_merged += 1;
            self.observer.on_event(&CrawlEvent::ParentMerged {
                url: url.to_string(),
                parent: parent.to_string(),
            });
        }
    }

    fn record_skipped(&mut self, entry: &FrontierEntry, rejection: ScopeRejection) {
        let first_time = self.ledger.mark_scoped_out(&entry.url);

        let skipped = self
            .report
            .skipped
            .entry(entry.url.clone())
            .or_insert_with(|| SkippedUrl {
                reason: rejection.clone(),
                referrers: BTreeSet::new(),
            });
        if let Some(parent) = &entry.parent {
            skipped.referrers.insert(parent.clone());
        }

        if first_time {
            self.observer.on_event(&CrawlEvent::PageSkipped {
                url: entry.url.clone(),
                parent: entry.parent.clone(),
                reason: SkipReason::OutOfScope(rejection),
            });
        }
    }

    /// Marks a URL failed; a failing seed aborts the crawl
    fn fail(&mut self, entry: &FrontierEntry, error: String) -> Result<(), CorpusError> {
        self.ledger.complete(&entry.url, UrlState::Failed);
        self.report.failed.insert(entry.url.clone(), error.clone());

        self.observer.on_event(&CrawlEvent::PageFailed {
            url: entry.url.clone(),
            parent: entry.parent.clone(),
            error: error.clone(),
        });

        if entry.parent.is_none() {
            return Err(seed_unreachable(&entry.url, error));
        }
        Ok(())
    }
}

fn seed_unreachable(url: &str, reason: String) -> CorpusError {
    CorpusError::SeedUnreachable {
        url: url.to_string(),
        reason,
    }
}
