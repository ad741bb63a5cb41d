use crate::cache::VisitedCache;
use crate::error::{Result, ScanError};
use crate::fetch::Fetcher;
use crate::filter::admit;
use crate::links::{HtmlLinkExtractor, LinkExtractor};
use crate::normalize::normalize;
use crate::result::{CrawlResult, Edge};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Semaphore, mpsc};
use tracing::{debug, info, warn};

/// Called with `(depth, pages_recorded)` as the crawl advances.
pub type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

pub const DEFAULT_MAX_DEPTH: usize = 5;
pub const DEFAULT_CONCURRENCY: usize = 16;
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogLevel {
    Debug,
    Warn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskOutcome {
    Fetched,
    Failed,
}

/// Messages a fetch task sends back to the coordination loop.
#[derive(Debug)]
enum WorkerEvent {
    Discovered(Edge),
    Log(LogLevel, String),
    Done(TaskOutcome),
}

/// Everything a fetch task needs, cloned into each spawned task.
#[derive(Clone)]
struct Scout {
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn LinkExtractor>,
    origin_domain: Arc<str>,
    allow_cross_origin: bool,
    fetch_timeout: Duration,
}

impl Scout {
    async fn explore(self, url: String, tx: mpsc::UnboundedSender<WorkerEvent>) {
        let outcome = match self.discover(&url, &tx).await {
            Ok(()) => TaskOutcome::Fetched,
            Err(e) => {
                let _ = tx.send(WorkerEvent::Log(LogLevel::Warn, e.to_string()));
                TaskOutcome::Failed
            }
        };
        let _ = tx.send(WorkerEvent::Done(outcome));
    }

    async fn discover(&self, url: &str, tx: &mpsc::UnboundedSender<WorkerEvent>) -> Result<()> {
        let _ = tx.send(WorkerEvent::Log(LogLevel::Debug, format!("GET {}", url)));

        let body = tokio::time::timeout(self.fetch_timeout, self.fetcher.fetch(url))
            .await
            .map_err(|_| {
                ScanError::fetch(url, format!("timed out after {:?}", self.fetch_timeout))
            })??;

        let links = self.extractor.extract_links(&body).map_err(|e| {
            ScanError::Parse(format!("{} ({})", url, e))
        })?;

        // Admission happens here so only candidate edges cross the channel
        for link in links {
            if let Some(edge) =
                admit(&link.href, url, &self.origin_domain, self.allow_cross_origin).edge()
            {
                let _ = tx.send(WorkerEvent::Discovered(edge));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Default)]
struct LevelStats {
    fetched: usize,
    failed: usize,
}

/// Breadth-first, depth-bounded crawler.
///
/// Each level's frontier is fetched concurrently (at most `concurrency` at a
/// time) and the next level only starts once every task of the current one
/// has reported back. The visited cache lives in the coordination loop alone;
/// tasks communicate through a channel.
pub struct Crawler {
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn LinkExtractor>,
    max_depth: usize,
    allow_cross_origin: bool,
    concurrency: usize,
    fetch_timeout: Duration,
    progress_callback: Option<ProgressCallback>,
}

impl Crawler {
    pub fn new(fetcher: impl Fetcher + 'static) -> Self {
        Self::with_fetcher(Arc::new(fetcher))
    }

    pub fn with_fetcher(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            extractor: Arc::new(HtmlLinkExtractor),
            max_depth: DEFAULT_MAX_DEPTH,
            allow_cross_origin: false,
            concurrency: DEFAULT_CONCURRENCY,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            progress_callback: None,
        }
    }

    pub fn with_link_extractor(mut self, extractor: impl LinkExtractor + 'static) -> Self {
        self.extractor = Arc::new(extractor);
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_cross_origin(mut self, allow: bool) -> Self {
        self.allow_cross_origin = allow;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Crawl from `origin` and return every recorded page.
    ///
    /// Fails only when `origin` itself cannot be normalized; failures on
    /// individual pages are logged and the crawl carries on.
    pub async fn crawl(&self, origin: &str) -> Result<CrawlResult> {
        let start = Instant::now();
        info!("Starting crawl of {} (max depth {})", origin, self.max_depth);

        let (origin_url, origin_fields) = normalize(origin, "")?;
        let scout = Scout {
            fetcher: self.fetcher.clone(),
            extractor: self.extractor.clone(),
            origin_domain: Arc::from(origin_fields.canonical_domain.as_str()),
            allow_cross_origin: self.allow_cross_origin,
            fetch_timeout: self.fetch_timeout,
        };
        let semaphore = Arc::new(Semaphore::new(self.concurrency));

        let mut cache = VisitedCache::new();
        let mut frontier = vec![Edge::origin(origin_url)];
        let mut totals = LevelStats::default();

        for depth in 0..=self.max_depth {
            if frontier.is_empty() {
                debug!("Frontier empty at depth {}, stopping", depth);
                break;
            }
            let (next, stats) = self
                .expand_level(depth, frontier, &mut cache, &scout, &semaphore)
                .await;
            totals.fetched += stats.fetched;
            totals.failed += stats.failed;
            frontier = next;
        }

        let mut result = CrawlResult::new(cache.into_entries());
        result.pages_fetched = totals.fetched;
        result.fetch_failures = totals.failed;
        result.duration = start.elapsed();

        info!(
            "Crawled {} unique pages in {:?} ({} fetched, {} failed)",
            result.len(),
            result.duration,
            result.pages_fetched,
            result.fetch_failures
        );
        Ok(result)
    }

    /// Record and dispatch one BFS level, then collect the next frontier.
    async fn expand_level(
        &self,
        depth: usize,
        frontier: Vec<Edge>,
        cache: &mut VisitedCache,
        scout: &Scout,
        semaphore: &Arc<Semaphore>,
    ) -> (Vec<Edge>, LevelStats) {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut dispatched = 0;

        for edge in frontier {
            // First writer wins; later edges to the same URL are dropped
            if !cache.record(&edge, depth) {
                continue;
            }
            // Pages at the depth limit are recorded but never fetched
            if depth == self.max_depth {
                continue;
            }

            let scout = scout.clone();
            let semaphore = semaphore.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    let _ = tx.send(WorkerEvent::Done(TaskOutcome::Failed));
                    return;
                };
                scout.explore(edge.to, tx).await;
            });
            dispatched += 1;
        }
        // Only task senders remain, so recv() returns None once they all exit
        drop(tx);

        debug!("Depth {}: dispatched {} fetches", depth, dispatched);
        self.report_progress(depth, cache.len());

        let mut next = Vec::new();
        let mut queued = HashSet::new();
        let mut stats = LevelStats::default();
        let mut finished = 0;

        // Barrier: the level is done once every dispatched task sent Done
        while finished < dispatched {
            let Some(event) = rx.recv().await else {
                warn!(
                    "{} fetch task(s) at depth {} exited without reporting",
                    dispatched - finished,
                    depth
                );
                stats.failed += dispatched - finished;
                break;
            };

            match event {
                WorkerEvent::Discovered(edge) => {
                    // Skip anything already recorded or queued for the next level
                    if !cache.contains(&edge.to) && queued.insert(edge.to.clone()) {
                        next.push(edge);
                    }
                }
                WorkerEvent::Log(LogLevel::Debug, message) => debug!("{}", message),
                WorkerEvent::Log(LogLevel::Warn, message) => warn!("{}", message),
                WorkerEvent::Done(outcome) => {
                    finished += 1;
                    match outcome {
                        TaskOutcome::Fetched => stats.fetched += 1,
                        TaskOutcome::Failed => stats.failed += 1,
                    }
                    self.report_progress(depth, cache.len());
                }
            }
        }

        (next, stats)
    }

    fn report_progress(&self, depth: usize, recorded: usize) {
        if let Some(ref callback) = self.progress_callback {
            callback(depth, recorded);
        }
    }
}
