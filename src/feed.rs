//! Pagination and refresh driving for one active query.
//!
//! A small state machine (`Idle`/`Loading`/`Exhausted`) accumulates pages
//! into a display-ordered, id-deduplicated list. Query changes and refreshes
//! abort the in-flight load; an aborted or stale-epoch result is discarded
//! without touching state or cache.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use futures::future::{AbortHandle, Abortable};

use crate::aggregator::Aggregator;
use crate::cache::ClientCache;
use crate::item::{CacheKey, Item, SourceKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedState {
    Idle,
    Loading,
    Exhausted,
}

struct FeedInner {
    state: FeedState,
    query: Option<String>,
    source: SourceKind,
    /// Last successfully merged page; 0 before the first load.
    page: u32,
    items: Vec<Item>,
    seen: HashSet<String>,
    /// Bumped on every query change or refresh; in-flight loads carry the
    /// epoch they started under and discard themselves on mismatch.
    epoch: u64,
    abort: Option<AbortHandle>,
    /// Next successful merge replaces the displayed set instead of appending.
    replace_next: bool,
}

pub struct FeedController {
    aggregator: Arc<Aggregator>,
    cache: Arc<ClientCache>,
    inner: Mutex<FeedInner>,
}

impl FeedController {
    pub fn new(aggregator: Arc<Aggregator>, cache: Arc<ClientCache>, source: SourceKind) -> Self {
        Self {
            aggregator,
            cache,
            inner: Mutex::new(FeedInner {
                state: FeedState::Idle,
                query: None,
                source,
                page: 0,
                items: Vec::new(),
                seen: HashSet::new(),
                epoch: 0,
                abort: None,
                replace_next: false,
            }),
        }
    }

    /// Switch the active query. Aborts any in-flight load and resets the
    /// accumulated items; a blank query selects the random home feed.
    pub fn set_query(&self, query: Option<&str>) {
        let mut g = self.inner.lock().unwrap();
        if let Some(handle) = g.abort.take() {
            handle.abort();
        }
        g.epoch += 1;
        g.query = query
            .map(|q| q.trim().to_lowercase())
            .filter(|q| !q.is_empty());
        g.page = 0;
        g.items.clear();
        g.seen.clear();
        g.state = FeedState::Idle;
        g.replace_next = false;
    }

    pub fn state(&self) -> FeedState {
        self.inner.lock().unwrap().state
    }

    pub fn page(&self) -> u32 {
        self.inner.lock().unwrap().page
    }

    pub fn has_more(&self) -> bool {
        self.inner.lock().unwrap().state != FeedState::Exhausted
    }

    pub fn items(&self) -> Vec<Item> {
        self.inner.lock().unwrap().items.clone()
    }

    /// Viewport-intersection entry point: load the next page if the machine
    /// is idle and the feed is not exhausted. Returns whether new items were
    /// merged.
    pub async fn load_next(&self) -> bool {
        let (epoch, page, key, reg) = {
            let mut g = self.inner.lock().unwrap();
            if g.state != FeedState::Idle {
                return false;
            }
            let page = g.page + 1;
            g.state = FeedState::Loading;
            let (handle, reg) = AbortHandle::new_pair();
            g.abort = Some(handle);
            let key = CacheKey::new(g.source, g.query.clone().unwrap_or_default(), page);
            (g.epoch, page, key, reg)
        };

        let aggregator = self.aggregator.clone();
        let query = key.query.clone();
        let source = key.source;
        let fetch = move || async move {
            let q = if query.is_empty() { None } else { Some(query.as_str()) };
            aggregator.aggregate(q, page, source).await.unwrap_or_default()
        };

        let result = Abortable::new(self.cache.get_or_fetch(key, fetch), reg).await;

        let mut g = self.inner.lock().unwrap();
        match result {
            Ok(new_items) => {
                if g.epoch != epoch {
                    // A query change raced this load; its result is dead.
                    return false;
                }
                g.abort = None;
                if new_items.is_empty() {
                    g.state = FeedState::Exhausted;
                    return false;
                }
                if g.replace_next {
                    g.items.clear();
                    g.seen.clear();
                    g.replace_next = false;
                }
                let FeedInner { items, seen, .. } = &mut *g;
                let merged = merge_dedup(items, seen, new_items);
                g.page = page;
                g.state = FeedState::Idle;
                merged
            }
            Err(_aborted) => false,
        }
    }

    /// Pull-to-refresh or explicit refresh: restart at page 1 and replace
    /// the displayed set with the fresh page (still subject to the client
    /// cache). The old items stay visible until the fetch completes.
    pub async fn refresh(&self) -> bool {
        {
            let mut g = self.inner.lock().unwrap();
            if let Some(handle) = g.abort.take() {
                handle.abort();
            }
            g.epoch += 1;
            g.page = 0;
            g.state = FeedState::Idle;
            g.replace_next = true;
        }
        self.load_next().await
    }
}

/// Append `new_items` preserving first-seen order, skipping ids already
/// accumulated. Returns whether anything was added.
fn merge_dedup(items: &mut Vec<Item>, seen: &mut HashSet<String>, new_items: Vec<Item>) -> bool {
    let mut merged = false;
    for item in new_items {
        if seen.insert(item.id.clone()) {
            items.push(item);
            merged = true;
        }
    }
    merged
}

/// Recognizer for the pull-to-refresh gesture: a vertical drag that starts
/// with the viewport at (or within a small slack of) the top and travels past
/// a distance threshold. A drag starting mid-scroll never fires.
#[derive(Debug, Clone)]
pub struct PullGesture {
    threshold: f32,
    top_slack: f32,
    start_y: f32,
    armed: bool,
}

impl Default for PullGesture {
    fn default() -> Self {
        Self { threshold: 80.0, top_slack: 8.0, start_y: 0.0, armed: false }
    }
}

impl PullGesture {
    pub fn new(threshold: f32, top_slack: f32) -> Self {
        Self { threshold, top_slack, start_y: 0.0, armed: false }
    }

    pub fn touch_start(&mut self, y: f32, scroll_offset: f32) {
        self.armed = scroll_offset <= self.top_slack;
        self.start_y = y;
    }

    /// Returns true exactly once, when the drag crosses the threshold.
    pub fn touch_move(&mut self, y: f32) -> bool {
        if !self.armed {
            return false;
        }
        if y - self.start_y > self.threshold {
            self.armed = false;
            return true;
        }
        false
    }

    pub fn touch_end(&mut self) {
        self.armed = false;
    }
}
