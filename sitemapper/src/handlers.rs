use anyhow::Result;
use clap::ArgMatches;
use sitemapper_core::crawl::{CrawlOptions, execute_crawl, write_sitemap};
use sitemapper_core::sitemap::SitemapOptions;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Everything a single sitemapper run needs, taken from the command line.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub crawl: CrawlOptions,
    pub sitemap: SitemapOptions,
    pub out: Option<PathBuf>,
    pub verbose: bool,
    pub quiet: bool,
}

/// Build a [`RunConfig`] from parsed arguments
pub fn config_from_matches(matches: &ArgMatches) -> RunConfig {
    let origin = matches
        .get_one::<String>("origin")
        .cloned()
        .unwrap_or_default();
    let quiet = matches.get_flag("quiet");

    let mut crawl = CrawlOptions::new(origin);
    crawl.max_depth = *matches.get_one::<usize>("depth").unwrap_or(&crawl.max_depth);
    crawl.cross_site = *matches.get_one::<bool>("cross-site").unwrap_or(&false);
    if let Some(workers) = matches.get_one::<u64>("concurrency") {
        crawl.concurrency = *workers as usize;
    }
    if let Some(secs) = matches.get_one::<u64>("timeout") {
        crawl.timeout = Duration::from_secs(*secs);
    }
    crawl.show_progress_bars = !quiet;

    RunConfig {
        crawl,
        sitemap: SitemapOptions {
            include_lastmod: matches.get_flag("lastmod"),
        },
        out: matches
            .get_one::<String>("out")
            .map(|raw| expand_output_path(raw)),
        verbose: matches.get_flag("verbose"),
        quiet,
    }
}

/// Expand a leading `~` in an output path
pub fn expand_output_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// Default log filter for the given verbosity. `RUST_LOG` takes precedence.
pub fn log_filter(verbose: bool, quiet: bool) -> &'static str {
    if verbose {
        "sitemapper=debug,sitemapper_core=debug,sitemapper_scanner=debug,warn"
    } else if quiet {
        "error"
    } else {
        "sitemapper=info,sitemapper_core=info,sitemapper_scanner=info,warn"
    }
}

pub fn init_tracing(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_filter(verbose, quiet)));

    // Logs go to stderr so stdout carries nothing but the sitemap.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub async fn handle_crawl(matches: &ArgMatches) -> Result<()> {
    let config = config_from_matches(matches);
    init_tracing(config.verbose, config.quiet);

    let result = execute_crawl(config.crawl).await?;
    write_sitemap(&result, config.out.as_deref(), &config.sitemap)?;

    match config.out {
        Some(ref path) => info!("Wrote {} URLs to {}", result.len(), path.display()),
        None => info!("Wrote {} URLs to stdout", result.len()),
    }
    Ok(())
}
