pub mod aggregator;
pub mod cache;
pub mod config;
pub mod db;
pub mod extract;
pub mod feed;
pub mod html;
pub mod item;
pub mod normalize;
pub mod offline;
pub mod server;
pub mod source;
pub mod storage;

// --- Library API for embedding ---

/// Convenience re-exports for embedders.
pub mod prelude {
    pub use crate::aggregator::Aggregator;
    pub use crate::cache::ClientCache;
    pub use crate::config::FeedConfig;
    pub use crate::feed::{FeedController, FeedState, PullGesture};
    pub use crate::item::{CacheKey, Item, ItemKind, RawRecord, SourceKind};
    pub use crate::offline::{
        ClientCommand, Destination, FetchOutcome, FetchRequest, LifecycleEvent,
        OfflineCacheManager, WorkerEvent, WorkerState,
    };
    pub use crate::source::SourceAdapter;
    pub use crate::storage::{OfflineStore, StoredResponse};
}

use std::sync::Arc;

use anyhow::Result;

use crate::aggregator::Aggregator;
use crate::cache::ClientCache;
use crate::config::FeedConfig;
use crate::feed::FeedController;
use crate::item::SourceKind;
use crate::source::SourceAdapter;

/// Library entry point: wires the adapter, aggregator and client cache from
/// one config. Feed controllers and the HTTP server share the same pieces.
pub struct Wallfeed {
    aggregator: Arc<Aggregator>,
    cache: Arc<ClientCache>,
    http: reqwest::Client,
}

impl Wallfeed {
    pub fn new(config: FeedConfig) -> Self {
        let http = reqwest::Client::new();
        let cache = Arc::new(ClientCache::new(config.client_cache_capacity, config.client_ttl));
        let aggregator = Arc::new(Aggregator::new(SourceAdapter::new(http.clone()), config));
        Self { aggregator, cache, http }
    }

    pub fn from_env() -> Self {
        Self::new(FeedConfig::from_env())
    }

    pub fn aggregator(&self) -> Arc<Aggregator> {
        self.aggregator.clone()
    }

    pub fn client_cache(&self) -> Arc<ClientCache> {
        self.cache.clone()
    }

    pub fn http(&self) -> reqwest::Client {
        self.http.clone()
    }

    /// A pagination controller for one consuming surface (wallpapers or
    /// videos), backed by the shared cache and aggregator.
    pub fn feed(&self, source: SourceKind) -> FeedController {
        FeedController::new(self.aggregator.clone(), self.cache.clone(), source)
    }

    /// Serve the HTTP API on `bind` until cancelled.
    pub async fn serve(&self, bind: &str) -> Result<()> {
        let state = server::AppState { aggregator: self.aggregator.clone(), http: self.http.clone() };
        server::serve(state, bind).await
    }
}
