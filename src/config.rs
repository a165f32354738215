//! Runtime configuration. Everything is env-overridable with sensible
//! defaults so embedders and tests can construct isolated instances.

use std::time::Duration;

/// Default upstream endpoints. Both take a percent-encoded query; the static
/// endpoint uses `query=`, the video endpoint `q=`.
const DEFAULT_STATIC_BASE: &str = "https://ab-pinetrest.abrahamdw882.workers.dev/?query=";
const DEFAULT_VIDEO_BASE: &str = "https://ab-pintrestvid.abrahamdw882.workers.dev/?q=";

/// Topic pool for the unqueried home feed.
const RANDOM_TOPICS: &[&str] = &[
    "anime",
    "nature",
    "cars",
    "love",
    "space",
    "abstract",
    "black aesthetic",
    "minimal",
    "3d wallpaper",
    "girl aesthetic",
    "lion wallpaper",
];

#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub static_base: String,
    pub video_base: String,
    pub topics: Vec<String>,
    /// How many random topics the home feed fans out to.
    pub fanout: usize,
    /// Client cache entry validity window.
    pub client_ttl: Duration,
    /// Client cache capacity (entries, LRU-evicted).
    pub client_cache_capacity: usize,
    /// Version tag of the authoritative offline cache generation.
    pub cache_generation: String,
    /// Origin the offline manager resolves core asset paths against.
    pub origin: String,
    pub database_url: Option<String>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            static_base: DEFAULT_STATIC_BASE.to_string(),
            video_base: DEFAULT_VIDEO_BASE.to_string(),
            topics: RANDOM_TOPICS.iter().map(|s| s.to_string()).collect(),
            fanout: 3,
            client_ttl: Duration::from_secs(60),
            client_cache_capacity: 128,
            cache_generation: "wallfeed-cache-v3".to_string(),
            origin: "http://127.0.0.1:3000".to_string(),
            database_url: None,
        }
    }
}

impl FeedConfig {
    /// Build a config from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            static_base: env_or("WALLFEED_STATIC_BASE", d.static_base),
            video_base: env_or("WALLFEED_VIDEO_BASE", d.video_base),
            topics: d.topics,
            fanout: env_parsed("WALLFEED_FANOUT", d.fanout),
            client_ttl: Duration::from_secs(env_parsed(
                "WALLFEED_CLIENT_TTL_SECS",
                d.client_ttl.as_secs(),
            )),
            client_cache_capacity: env_parsed("WALLFEED_CACHE_CAPACITY", d.client_cache_capacity),
            cache_generation: env_or("WALLFEED_CACHE_GENERATION", d.cache_generation),
            origin: env_or("WALLFEED_ORIGIN", d.origin),
            database_url: std::env::var("WALLFEED_DATABASE_URL").ok().filter(|s| !s.trim().is_empty()),
        }
    }
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty()).unwrap_or(default)
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|s| s.parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let c = FeedConfig::default();
        assert!(c.static_base.ends_with("query="));
        assert!(c.video_base.ends_with("q="));
        assert!(c.fanout >= 3 && c.fanout <= c.topics.len());
        assert_eq!(c.client_ttl, Duration::from_secs(60));
    }
}
