//! In-memory memoization tier in front of the aggregator.
//!
//! An injectable object rather than a module global, so tests construct
//! isolated instances and long-lived processes stay bounded: capacity-limited
//! LRU with staleness judged at read time against a TTL. Entries are replaced
//! wholesale; concurrent writers for one key race only on last-write-wins.

use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use lru::LruCache;

use crate::item::{CacheKey, Item};

struct CacheEntry {
    items: Vec<Item>,
    stored_at: Instant,
}

pub struct ClientCache {
    inner: Mutex<LruCache<CacheKey, CacheEntry>>,
    ttl: Duration,
}

impl ClientCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).expect("non-zero capacity");
        Self { inner: Mutex::new(LruCache::new(cap)), ttl }
    }

    /// Fresh stored value for `key`, if any. Stale entries read as misses;
    /// they are superseded by the next store rather than deleted here.
    pub fn get(&self, key: &CacheKey) -> Option<Vec<Item>> {
        let mut guard = self.inner.lock().unwrap();
        let entry = guard.get(key)?;
        if entry.stored_at.elapsed() > self.ttl {
            return None;
        }
        Some(entry.items.clone())
    }

    /// Store a completed result, overwriting any previous entry for the key.
    pub fn insert(&self, key: CacheKey, items: Vec<Item>) {
        let mut guard = self.inner.lock().unwrap();
        guard.put(key, CacheEntry { items, stored_at: Instant::now() });
    }

    /// Serve from cache within the TTL window; otherwise run `fetch` and
    /// store its completed result. A caller that aborts the returned future
    /// before completion never reaches the store, so cancelled requests
    /// cannot poison the cache.
    pub async fn get_or_fetch<F, Fut>(&self, key: CacheKey, fetch: F) -> Vec<Item>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Vec<Item>>,
    {
        if let Some(hit) = self.get(&key) {
            tracing::debug!(query = %key.query, page = key.page, "client cache hit");
            return hit;
        }
        let items = fetch().await;
        self.insert(key, items.clone());
        items
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::SourceKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn item(id: &str) -> Item {
        Item {
            id: id.to_string(),
            title: String::new(),
            thumbnail: Some("u".into()),
            full: Some("u".into()),
            video: None,
            tags: vec![],
            description: String::new(),
            raw: serde_json::Value::Null,
        }
    }

    fn key(q: &str, page: u32) -> CacheKey {
        CacheKey::new(SourceKind::Static, q, page)
    }

    #[tokio::test]
    async fn second_call_within_ttl_skips_upstream() {
        let cache = ClientCache::new(8, Duration::from_secs(60));
        let calls = AtomicUsize::new(0);
        for _ in 0..2 {
            let got = cache
                .get_or_fetch(key("nature", 1), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    vec![item("a")]
                })
                .await;
            assert_eq!(got.len(), 1);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn expired_entry_refetches() {
        let cache = ClientCache::new(8, Duration::from_millis(20));
        let calls = AtomicUsize::new(0);
        let fetch = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            vec![item("a")]
        };
        cache.get_or_fetch(key("nature", 1), fetch).await;
        tokio::time::sleep(Duration::from_millis(40)).await;
        cache
            .get_or_fetch(key("nature", 1), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                vec![item("b")]
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn distinct_keys_do_not_collide() {
        let cache = ClientCache::new(8, Duration::from_secs(60));
        cache.insert(key("nature", 1), vec![item("a")]);
        assert!(cache.get(&key("nature", 2)).is_none());
        assert!(cache.get(&CacheKey::new(SourceKind::Video, "nature", 1)).is_none());
        assert!(cache.get(&key("nature", 1)).is_some());
    }

    #[tokio::test]
    async fn capacity_is_bounded_lru() {
        let cache = ClientCache::new(2, Duration::from_secs(60));
        cache.insert(key("a", 1), vec![]);
        cache.insert(key("b", 1), vec![]);
        cache.insert(key("c", 1), vec![]);
        assert_eq!(cache.len(), 2);
        assert!(cache.get(&key("a", 1)).is_none());
    }

    #[tokio::test]
    async fn aborted_fetch_stores_nothing() {
        use futures::future::{AbortHandle, Abortable};

        let cache = ClientCache::new(8, Duration::from_secs(60));
        let (handle, reg) = AbortHandle::new_pair();
        let fut = cache.get_or_fetch(key("nature", 1), || async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            vec![item("a")]
        });
        let task = Abortable::new(fut, reg);
        handle.abort();
        assert!(task.await.is_err());
        assert!(cache.is_empty());
        assert!(cache.get(&key("nature", 1)).is_none());
    }
}
