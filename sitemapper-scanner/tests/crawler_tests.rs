// Scheduler scenarios against in-memory sites

use async_trait::async_trait;
use sitemapper_scanner::error::{Result, ScanError};
use sitemapper_scanner::{Crawler, Fetcher, Link, LinkExtractor};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Serves fixed bodies keyed by canonical URL and remembers every request.
#[derive(Default)]
struct StaticSite {
    pages: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl StaticSite {
    fn page(mut self, url: &str, hrefs: &[&str]) -> Self {
        let body: String = hrefs
            .iter()
            .map(|href| format!(r#"<a href="{}">link</a>"#, href))
            .collect();
        self.pages
            .insert(url.to_string(), format!("<html><body>{}</body></html>", body));
        self
    }

    fn request_count(&self, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|requested| *requested == url)
            .count()
    }
}

#[async_trait]
impl Fetcher for StaticSite {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.requests.lock().unwrap().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| ScanError::fetch(url, "HTTP 404"))
    }
}

// ============================================================================
// End-to-end
// ============================================================================

#[tokio::test]
async fn test_single_page_scenario() {
    let site = StaticSite::default().page(
        "https://example.com/",
        &["/about", "https://external.com", "mailto:a@b.com"],
    );

    let result = Crawler::new(site)
        .with_max_depth(1)
        .crawl("https://example.com")
        .await
        .unwrap();

    let urls: Vec<&str> = result.urls().collect();
    assert_eq!(urls, vec!["https://example.com/", "https://example.com/about/"]);
    assert_eq!(result.get("https://example.com/").unwrap().depth, 0);
    assert_eq!(result.get("https://example.com/").unwrap().first_referrer, "");

    let about = result.get("https://example.com/about/").unwrap();
    assert_eq!(about.depth, 1);
    assert_eq!(about.first_referrer, "https://example.com/");
}

#[tokio::test]
async fn test_boundary_pages_are_recorded_not_fetched() {
    let site = Arc::new(
        StaticSite::default()
            .page("https://example.com/", &["/a"])
            .page("https://example.com/a/", &["/b"]),
    );

    let result = Crawler::with_fetcher(site.clone())
        .with_max_depth(1)
        .crawl("https://example.com/")
        .await
        .unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(site.request_count("https://example.com/a/"), 0);
    assert!(result.get("https://example.com/b/").is_none());
}

// ============================================================================
// Invariants
// ============================================================================

#[tokio::test]
async fn test_each_url_recorded_and_fetched_once() {
    // Every page links to every other page and to itself.
    let all = ["/", "/a", "/b", "/c"];
    let site = Arc::new(
        StaticSite::default()
            .page("https://example.com/", &all)
            .page("https://example.com/a/", &all)
            .page("https://example.com/b/", &all)
            .page("https://example.com/c/", &all),
    );

    let result = Crawler::with_fetcher(site.clone())
        .with_max_depth(5)
        .crawl("https://example.com")
        .await
        .unwrap();

    assert_eq!(result.len(), 4);
    for url in result.urls() {
        assert_eq!(site.request_count(url), 1, "{} fetched more than once", url);
    }

    let mut urls: Vec<&str> = result.urls().collect();
    urls.dedup();
    assert_eq!(urls.len(), result.len());
}

#[tokio::test]
async fn test_first_referrer_is_from_shallowest_level() {
    let site = StaticSite::default()
        .page("https://example.com/", &["/a", "/b"])
        .page("https://example.com/a/", &["/b", "/deep"])
        .page("https://example.com/b/", &[]);

    let result = Crawler::new(site)
        .with_max_depth(3)
        .crawl("https://example.com")
        .await
        .unwrap();

    let b = result.get("https://example.com/b/").unwrap();
    assert_eq!(b.depth, 1);
    assert_eq!(b.first_referrer, "https://example.com/");

    let deep = result.get("https://example.com/deep/").unwrap();
    assert_eq!(deep.depth, 2);
    assert_eq!(deep.first_referrer, "https://example.com/a/");
}

#[tokio::test]
async fn test_depth_never_exceeds_max() {
    // A chain /1 -> /2 -> ... -> /9
    let mut site = StaticSite::default().page("https://example.com/", &["/1"]);
    for i in 1..10 {
        let url = format!("https://example.com/{}/", i);
        let next = format!("/{}", i + 1);
        site = site.page(&url, &[next.as_str()]);
    }

    let max_depth = 3;
    let result = Crawler::new(site)
        .with_max_depth(max_depth)
        .crawl("https://example.com")
        .await
        .unwrap();

    assert_eq!(result.len(), max_depth + 1);
    assert!(result.entries.iter().all(|entry| entry.depth <= max_depth));
}

#[tokio::test]
async fn test_stays_on_origin_domain_by_default() {
    let site = StaticSite::default()
        .page(
            "https://example.com/",
            &["https://www.example.com/team", "https://other.org/", "/local"],
        )
        .page("https://other.org/", &["/more"]);

    let result = Crawler::new(site)
        .with_max_depth(3)
        .crawl("https://example.com")
        .await
        .unwrap();

    assert!(result.urls().any(|url| url == "https://www.example.com/team/"));
    assert!(result.urls().all(|url| !url.contains("other.org")));
}

#[tokio::test]
async fn test_cross_site_follows_external_links() {
    let site = StaticSite::default()
        .page("https://example.com/", &["https://other.org/"])
        .page("https://other.org/", &["/more"]);

    let result = Crawler::new(site)
        .with_max_depth(2)
        .with_cross_origin(true)
        .crawl("https://example.com")
        .await
        .unwrap();

    assert_eq!(
        result.urls().collect::<Vec<_>>(),
        vec![
            "https://example.com/",
            "https://other.org/",
            "https://other.org/more/"
        ]
    );
}

#[tokio::test]
async fn test_filtered_hrefs_produce_no_edges() {
    let site = StaticSite::default().page(
        "https://example.com/",
        &["#", "", "report.pdf", "javascript:void(0)"],
    );

    let result = Crawler::new(site)
        .with_max_depth(2)
        .crawl("https://example.com")
        .await
        .unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(result.pages_fetched, 1);
}

// ============================================================================
// Resource limits
// ============================================================================

/// Never answers within any reasonable deadline.
struct HangingFetcher;

#[async_trait]
impl Fetcher for HangingFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        if url == "https://example.com/" {
            return Ok(r#"<a href="/stuck">x</a><a href="/also-stuck">y</a>"#.to_string());
        }
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(String::new())
    }
}

#[tokio::test(start_paused = true)]
async fn test_hung_fetch_times_out_and_level_advances() {
    let result = Crawler::new(HangingFetcher)
        .with_max_depth(2)
        .with_fetch_timeout(Duration::from_secs(5))
        .crawl("https://example.com")
        .await
        .unwrap();

    assert_eq!(result.len(), 3);
    assert_eq!(result.pages_fetched, 1);
    assert_eq!(result.fetch_failures, 2);
}

/// Tracks how many fetches are in flight at once.
struct CountingFetcher {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

#[async_trait]
impl Fetcher for CountingFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if url == "https://example.com/" {
            Ok((0..20)
                .map(|i| format!(r#"<a href="/p{}">p</a>"#, i))
                .collect())
        } else {
            Ok(String::new())
        }
    }
}

#[tokio::test]
async fn test_concurrency_is_bounded() {
    let fetcher = Arc::new(CountingFetcher {
        in_flight: AtomicUsize::new(0),
        peak: AtomicUsize::new(0),
    });

    let result = Crawler::with_fetcher(fetcher.clone())
        .with_max_depth(2)
        .with_concurrency(4)
        .crawl("https://example.com")
        .await
        .unwrap();

    assert_eq!(result.len(), 21);
    assert_eq!(result.pages_fetched, 21);
    assert!(fetcher.peak.load(Ordering::SeqCst) <= 4);
}

// ============================================================================
// Parse failures
// ============================================================================

struct UnparseableMarkup;

impl LinkExtractor for UnparseableMarkup {
    fn extract_links(&self, _body: &str) -> Result<Vec<Link>> {
        Err(ScanError::Parse("unexpected end of document".to_string()))
    }
}

#[tokio::test]
async fn test_parse_failure_completes_task_without_edges() {
    let site = Arc::new(
        StaticSite::default().page("https://example.com/", &["/about", "/blog"]),
    );

    let result = Crawler::with_fetcher(site.clone())
        .with_link_extractor(UnparseableMarkup)
        .with_max_depth(2)
        .crawl("https://example.com")
        .await
        .unwrap();

    assert_eq!(result.urls().collect::<Vec<_>>(), vec!["https://example.com/"]);
    assert_eq!(result.pages_fetched, 0);
    assert_eq!(result.fetch_failures, 1);
    assert_eq!(site.request_count("https://example.com/"), 1);
}
