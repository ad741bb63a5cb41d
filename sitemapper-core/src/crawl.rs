use crate::sitemap::{SitemapOptions, render_with};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use sitemapper_scanner::crawler::{DEFAULT_CONCURRENCY, DEFAULT_FETCH_TIMEOUT, DEFAULT_MAX_DEPTH};
use sitemapper_scanner::{CrawlResult, Crawler, Fetcher, HttpFetcher, ProgressCallback};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Options for configuring a crawl operation
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub origin: String,
    pub max_depth: usize,
    /// Follow links whose canonical domain differs from the origin's
    pub cross_site: bool,
    /// Upper bound on fetches in flight at once
    pub concurrency: usize,
    /// Deadline for a single page fetch
    pub timeout: Duration,
    pub show_progress_bars: bool,
}

impl CrawlOptions {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            max_depth: DEFAULT_MAX_DEPTH,
            cross_site: false,
            concurrency: DEFAULT_CONCURRENCY,
            timeout: DEFAULT_FETCH_TIMEOUT,
            show_progress_bars: false,
        }
    }
}

/// Crawl over HTTP with the given options.
pub async fn execute_crawl(options: CrawlOptions) -> Result<CrawlResult> {
    let fetcher = HttpFetcher::with_timeout(options.timeout)
        .context("failed to build HTTP client")?;
    execute_crawl_with(options, Arc::new(fetcher)).await
}

/// Crawl with a caller-supplied fetcher.
pub async fn execute_crawl_with(
    options: CrawlOptions,
    fetcher: Arc<dyn Fetcher>,
) -> Result<CrawlResult> {
    let progress_bar = if options.show_progress_bars {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Starting crawl...");
        Some(Arc::new(pb))
    } else {
        None
    };

    let mut crawler = Crawler::with_fetcher(fetcher)
        .with_max_depth(options.max_depth)
        .with_cross_origin(options.cross_site)
        .with_concurrency(options.concurrency)
        .with_fetch_timeout(options.timeout);

    if let Some(ref pb) = progress_bar {
        let pb = pb.clone();
        let callback: ProgressCallback = Arc::new(move |depth: usize, recorded: usize| {
            pb.set_message(format!("Depth {}: {} pages recorded", depth, recorded));
        });
        crawler = crawler.with_progress_callback(callback);
    }

    let result = crawler
        .crawl(&options.origin)
        .await
        .with_context(|| format!("failed to initiate crawl from '{}'", options.origin));

    if let Some(ref pb) = progress_bar {
        pb.finish_and_clear();
    }

    result
}

/// Render `result` to `out`, or to stdout when no path is given.
pub fn write_sitemap(result: &CrawlResult, out: Option<&Path>, options: &SitemapOptions) -> Result<()> {
    debug!("Rendering sitemap with {} URLs", result.len());
    match out {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create '{}'", path.display()))?;
            render_with(result, BufWriter::new(file), options)
                .with_context(|| format!("failed to write sitemap to '{}'", path.display()))
        }
        None => {
            let stdout = io::stdout();
            render_with(result, BufWriter::new(stdout.lock()), options)
                .context("failed to write sitemap to stdout")
        }
    }
}
