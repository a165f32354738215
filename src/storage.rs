use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One persisted response snapshot, keyed by request identity within a cache
/// generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredResponse {
    pub url: String,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl StoredResponse {
    pub fn new(url: impl Into<String>, content_type: impl Into<String>, body: Vec<u8>) -> Self {
        Self { url: url.into(), content_type: content_type.into(), body }
    }
}

/// Persistent offline cache store. Upserts are per-request-identity; exactly
/// one generation is authoritative at a time, enforced by the manager.
#[async_trait]
pub trait OfflineStore: Send + Sync {
    async fn get_response(&self, generation: &str, url: &str) -> Result<Option<StoredResponse>>;
    async fn put_response(
        &self,
        generation: &str,
        response: &StoredResponse,
        stored_at: i64,
    ) -> Result<()>;
    async fn list_generations(&self) -> Result<Vec<String>>;
    async fn purge_generation(&self, generation: &str) -> Result<u64>;
}
