use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A candidate link: `to` was found on `from`. `from` is empty for the origin.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn origin(to: impl Into<String>) -> Self {
        Self::new(String::new(), to)
    }
}

/// One page recorded by the crawl, created the first time its canonical URL
/// is scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitEntry {
    pub url: String,
    pub first_referrer: String,
    pub depth: usize,
    pub discovered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlResult {
    /// Every recorded page, sorted by canonical URL.
    pub entries: Vec<VisitEntry>,
    pub pages_fetched: usize,
    pub fetch_failures: usize,
    pub duration: Duration,
}

impl CrawlResult {
    pub fn new(mut entries: Vec<VisitEntry>) -> Self {
        entries.sort_by(|a, b| a.url.cmp(&b.url));
        Self {
            entries,
            pages_fetched: 0,
            fetch_failures: 0,
            duration: Duration::from_secs(0),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, url: &str) -> Option<&VisitEntry> {
        self.entries
            .binary_search_by(|entry| entry.url.as_str().cmp(url))
            .ok()
            .map(|idx| &self.entries[idx])
    }

    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.url.as_str())
    }
}
