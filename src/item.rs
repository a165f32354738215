use serde::{Deserialize, Serialize};

/// Upstream records have no fixed schema; they are carried as untyped JSON.
pub type RawRecord = serde_json::Value;

/// Which upstream endpoint family a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Static,
    Video,
}

impl SourceKind {
    /// Tolerant parse of the `source` request parameter; anything that is not
    /// "video" means static wallpapers.
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("video") { SourceKind::Video } else { SourceKind::Static }
    }
}

impl Default for SourceKind {
    fn default() -> Self { SourceKind::Static }
}

/// Normalization flavor for a raw record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Image,
    Video,
}

impl From<SourceKind> for ItemKind {
    fn from(s: SourceKind) -> Self {
        match s {
            SourceKind::Static => ItemKind::Image,
            SourceKind::Video => ItemKind::Video,
        }
    }
}

/// Canonical content record exchanged with consumers.
///
/// Ids are unique within one aggregation pass but not stable across fetches.
/// Media fields may all be absent; consumers degrade to a placeholder instead
/// of failing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub title: String,
    pub thumbnail: Option<String>,
    pub full: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    pub tags: Vec<String>,
    pub description: String,
    /// Un-normalized upstream record, for callers needing extra fields.
    pub raw: RawRecord,
}

impl Item {
    /// Whether the item carries at least one usable media reference.
    pub fn is_usable(&self) -> bool {
        self.thumbnail.is_some() || self.full.is_some() || self.video.is_some()
    }
}

/// Identity of one aggregation request. Two requests with the same key are
/// interchangeable within the client cache TTL window.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub source: SourceKind,
    pub query: String,
    pub page: u32,
}

impl CacheKey {
    pub fn new(source: SourceKind, query: impl Into<String>, page: u32) -> Self {
        Self { source, query: query.into(), page }
    }
}
