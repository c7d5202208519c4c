//! Date-keyed cache for feed results.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::upstream::FeedResult;

#[derive(Debug, Clone)]
struct CacheEntry {
    result: FeedResult,
    fetched_at: Instant,
}

/// A thread-safe cache of feed results keyed by date.
///
/// Freshness is evaluated on read; entries are never evicted. Key
/// cardinality is one entry per queried date, so growth tracks usage.
#[derive(Debug, Clone)]
pub struct FeedCache {
    inner: Arc<DashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl FeedCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            ttl,
        }
    }

    /// Entry for `date` if it is still within the freshness window.
    pub fn get_fresh(&self, date: &str) -> Option<FeedResult> {
        self.inner.get(date).and_then(|entry| {
            (Instant::now().duration_since(entry.fetched_at) < self.ttl)
                .then(|| entry.result.clone())
        })
    }

    /// Entry for `date` regardless of freshness, for degraded serving.
    pub fn get_any(&self, date: &str) -> Option<FeedResult> {
        self.inner.get(date).map(|entry| entry.result.clone())
    }

    /// Replace the entry for `date` wholesale.
    pub fn insert(&self, date: &str, result: FeedResult) {
        self.inner.insert(
            date.to_string(),
            CacheEntry {
                result,
                fetched_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(date: &str) -> FeedResult {
        FeedResult {
            date: date.to_string(),
            items: Vec::new(),
            fetched_at: "2024-06-01T00:00:00.000Z".into(),
            cache: None,
            stale: None,
            error: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn freshness_window_expires() {
        let cache = FeedCache::new(Duration::from_secs(15 * 60));
        cache.insert("2024-06-01", result("2024-06-01"));

        assert!(cache.get_fresh("2024-06-01").is_some());

        tokio::time::advance(Duration::from_secs(16 * 60)).await;
        assert!(cache.get_fresh("2024-06-01").is_none());
        // Expired entries remain reachable for degraded serving.
        assert!(cache.get_any("2024-06-01").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn insert_replaces_wholesale() {
        let cache = FeedCache::new(Duration::from_secs(60));
        cache.insert("2024-06-01", result("2024-06-01"));

        let mut updated = result("2024-06-01");
        updated.fetched_at = "2024-06-01T01:00:00.000Z".into();
        cache.insert("2024-06-01", updated.clone());

        assert_eq!(cache.len(), 1);
        assert_eq!(
            cache.get_any("2024-06-01").unwrap().fetched_at,
            updated.fetched_at
        );
    }
}
