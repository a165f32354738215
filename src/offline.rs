//! Offline cache manager: a worker-lifecycle state machine over the
//! persistent response store.
//!
//! One generation tag is authoritative at a time. Install pre-caches the
//! core assets best-effort, activation purges every other generation, and
//! per-request fetch interception picks cache-first or network-first policy
//! by destination. Lifecycle transitions run through a single `dispatch`
//! entry point so the generation invariant stays centrally enforced.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::broadcast;

use crate::storage::{OfflineStore, StoredResponse};

/// Fallback document served when both network and cache come up empty.
pub const OFFLINE_URL: &str = "/offline.html";

/// Assets pre-cached at install time.
pub const CORE_ASSETS: &[&str] = &[
    "/",
    "/manifest.json",
    "/offline.html",
    "/icons/icon-192x192.png",
    "/icons/icon-512x512.png",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Installing,
    Waiting,
    Active,
}

/// One-way notifications to interested clients.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    CacheReady,
    CacheError(String),
    MediaCached(String),
    Activated(String),
}

/// Commands a controlling client may send the manager.
#[derive(Debug, Clone, Copy)]
pub enum ClientCommand {
    /// Activate immediately instead of waiting for open clients to close.
    SkipWaiting,
}

/// Lifecycle inputs, dispatched through [`OfflineCacheManager::dispatch`].
#[derive(Debug, Clone)]
pub enum LifecycleEvent {
    Install,
    Activate,
    Message(ClientCommand),
}

/// What a request is for; decides the caching policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Document,
    Image,
    Video,
    Other,
}

impl Destination {
    pub fn is_media(self) -> bool {
        matches!(self, Destination::Image | Destination::Video)
    }
}

#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub method: reqwest::Method,
    pub url: String,
    pub destination: Destination,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>, destination: Destination) -> Self {
        Self { method: reqwest::Method::GET, url: url.into(), destination }
    }
}

/// Where an intercepted request was answered from.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Served from the persistent cache.
    Hit(StoredResponse),
    /// Served from the network (stored opportunistically when successful).
    Network(StoredResponse),
    /// Served the offline fallback document.
    Offline(StoredResponse),
    /// Non-GET requests bypass the manager entirely.
    Bypass,
    /// Nothing cached, no network, no fallback document installed.
    Miss,
}

pub struct OfflineCacheManager {
    store: Arc<dyn OfflineStore>,
    http: reqwest::Client,
    origin: String,
    generation: String,
    state: WorkerState,
    events: broadcast::Sender<WorkerEvent>,
}

impl OfflineCacheManager {
    pub fn new(
        store: Arc<dyn OfflineStore>,
        http: reqwest::Client,
        origin: impl Into<String>,
        generation: impl Into<String>,
    ) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            store,
            http,
            origin: origin.into(),
            generation: generation.into(),
            state: WorkerState::Installing,
            events,
        }
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn generation(&self) -> &str {
        &self.generation
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WorkerEvent> {
        self.events.subscribe()
    }

    /// Single entry point for lifecycle transitions.
    pub async fn dispatch(&mut self, event: LifecycleEvent) -> Result<()> {
        match event {
            LifecycleEvent::Install => self.install().await,
            LifecycleEvent::Activate => self.activate().await,
            LifecycleEvent::Message(ClientCommand::SkipWaiting) => {
                if self.state == WorkerState::Waiting {
                    self.activate().await
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Pre-cache the core asset list under the current generation.
    /// Best-effort: per-asset failure is reported but never blocks the
    /// transition to `Waiting`.
    async fn install(&mut self) -> Result<()> {
        tracing::info!(generation = %self.generation, "installing offline cache");
        let mut failed: Vec<&str> = Vec::new();
        for &asset in CORE_ASSETS {
            match self.fetch_network(asset).await {
                Some((response, true)) => {
                    if let Err(e) = self.store.put_response(&self.generation, &response, epoch()).await {
                        tracing::warn!(%asset, error = %e, "failed to persist core asset");
                        failed.push(asset);
                    }
                }
                _ => failed.push(asset),
            }
        }
        if failed.is_empty() {
            self.emit(WorkerEvent::CacheReady);
        } else {
            tracing::warn!(?failed, "some core assets could not be cached");
            self.emit(WorkerEvent::CacheError(format!(
                "failed to cache core assets: {}",
                failed.join(", ")
            )));
        }
        self.state = WorkerState::Waiting;
        Ok(())
    }

    /// Generation rollover: delete every stored generation except the
    /// current tag, then claim control.
    async fn activate(&mut self) -> Result<()> {
        for generation in self.store.list_generations().await? {
            if generation != self.generation {
                let removed = self.store.purge_generation(&generation).await?;
                tracing::info!(%generation, removed, "purged superseded cache generation");
            }
        }
        self.state = WorkerState::Active;
        self.emit(WorkerEvent::Activated(self.generation.clone()));
        Ok(())
    }

    /// Per-request interception. Never fails: store errors read as misses,
    /// and total unavailability resolves to the offline fallback (or `Miss`).
    pub async fn handle_fetch(&self, request: &FetchRequest) -> FetchOutcome {
        if request.method != reqwest::Method::GET {
            return FetchOutcome::Bypass;
        }
        if request.destination.is_media() {
            self.cache_first(&request.url).await
        } else {
            self.network_first(&request.url).await
        }
    }

    /// Media policy: persistent cache, then network (stored on success),
    /// then the offline fallback.
    async fn cache_first(&self, url: &str) -> FetchOutcome {
        if let Some(cached) = self.cached(url).await {
            return FetchOutcome::Hit(cached);
        }
        match self.fetch_network(url).await {
            Some((response, ok)) => {
                if ok {
                    if self
                        .store
                        .put_response(&self.generation, &response, epoch())
                        .await
                        .is_ok()
                    {
                        self.emit(WorkerEvent::MediaCached(url.to_string()));
                    }
                }
                FetchOutcome::Network(response)
            }
            None => self.offline_fallback().await,
        }
    }

    /// Everything else: network first (successful responses overwrite the
    /// stored copy), cache on failure, then the offline fallback.
    async fn network_first(&self, url: &str) -> FetchOutcome {
        match self.fetch_network(url).await {
            Some((response, ok)) => {
                if ok {
                    let _ = self
                        .store
                        .put_response(&self.generation, &response, epoch())
                        .await;
                }
                FetchOutcome::Network(response)
            }
            None => {
                if let Some(cached) = self.cached(url).await {
                    return FetchOutcome::Hit(cached);
                }
                self.offline_fallback().await
            }
        }
    }

    async fn offline_fallback(&self) -> FetchOutcome {
        match self.cached(OFFLINE_URL).await {
            Some(doc) => FetchOutcome::Offline(doc),
            None => FetchOutcome::Miss,
        }
    }

    /// Store read with errors degraded to a miss.
    async fn cached(&self, url: &str) -> Option<StoredResponse> {
        match self.store.get_response(&self.generation, url).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(url, error = %e, "offline store read failed; treating as miss");
                None
            }
        }
    }

    /// Returns the body and whether the status was a success, or `None` on
    /// transport failure.
    async fn fetch_network(&self, url: &str) -> Option<(StoredResponse, bool)> {
        let absolute = self.absolute(url);
        match self.http.get(&absolute).send().await {
            Ok(res) => {
                let ok = res.status().is_success();
                let content_type = res
                    .headers()
                    .get(reqwest::header::CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("application/octet-stream")
                    .to_string();
                match res.bytes().await {
                    Ok(bytes) => Some((StoredResponse::new(url, content_type, bytes.to_vec()), ok)),
                    Err(e) => {
                        tracing::warn!(url, error = %e, "failed to read network body");
                        None
                    }
                }
            }
            Err(e) => {
                tracing::debug!(url, error = %e, "network unavailable");
                None
            }
        }
    }

    fn absolute(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("{}/{}", self.origin.trim_end_matches('/'), url.trim_start_matches('/'))
        }
    }

    fn emit(&self, event: WorkerEvent) {
        // No subscribers is fine; notifications are one-way and optional.
        let _ = self.events.send(event);
    }
}

fn epoch() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
