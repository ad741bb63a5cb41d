use crate::result::{Edge, VisitEntry};
use chrono::Utc;
use std::collections::HashMap;

/// Every URL the crawl has scheduled, keyed by canonical URL.
///
/// Owned by the crawl's coordination loop; fetch tasks never touch it.
#[derive(Debug, Default)]
pub struct VisitedCache {
    entries: HashMap<String, VisitEntry>,
}

impl VisitedCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.entries.contains_key(url)
    }

    /// Record `edge.to` at `depth` unless it is already known. Returns `true`
    /// when a new entry was created.
    pub fn record(&mut self, edge: &Edge, depth: usize) -> bool {
        if self.entries.contains_key(&edge.to) {
            return false;
        }
        self.entries.insert(
            edge.to.clone(),
            VisitEntry {
                url: edge.to.clone(),
                first_referrer: edge.from.clone(),
                depth,
                discovered_at: Utc::now(),
            },
        );
        true
    }

    pub fn get(&self, url: &str) -> Option<&VisitEntry> {
        self.entries.get(url)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<VisitEntry> {
        self.entries.into_values().collect()
    }
}
