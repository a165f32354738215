//! Fan-out orchestration over upstream sources.
//!
//! The unqueried home case samples a handful of topics and fetches them
//! concurrently; the queried case is a single adapter call routed to the
//! static or video endpoint. Per-branch failure is already collapsed to an
//! empty list by the adapter, so the join stays free of error handling.
//! Duplicates across topics are tolerated here; dedup by id happens in the
//! pagination layer.

use anyhow::Result;
use rand::seq::SliceRandom;

use crate::config::FeedConfig;
use crate::item::{Item, ItemKind, SourceKind};
use crate::source::SourceAdapter;

pub struct Aggregator {
    adapter: SourceAdapter,
    config: FeedConfig,
}

impl Aggregator {
    pub fn new(adapter: SourceAdapter, config: FeedConfig) -> Self {
        Self { adapter, config }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Dispatch: no query (or a blank one) means the random home feed.
    pub async fn aggregate(
        &self,
        query: Option<&str>,
        page: u32,
        source: SourceKind,
    ) -> Result<Vec<Item>> {
        match query.map(str::trim).filter(|q| !q.is_empty()) {
            Some(q) => self.aggregate_query(q, page, source).await,
            None => self.aggregate_random().await,
        }
    }

    /// Home feed: fetch a random subset of the topic pool concurrently and
    /// flatten the union.
    pub async fn aggregate_random(&self) -> Result<Vec<Item>> {
        let topics: Vec<String> = {
            let mut rng = rand::thread_rng();
            self.config
                .topics
                .choose_multiple(&mut rng, self.config.fanout.max(1))
                .cloned()
                .collect()
        };
        tracing::debug!(?topics, "aggregating random home feed");
        let fetches = topics.iter().map(|topic| {
            let url = self.query_url(topic, 1, SourceKind::Static);
            async move { self.adapter.fetch(&url, ItemKind::Image).await }
        });
        let results = futures::future::join_all(fetches).await;
        Ok(results.into_iter().flatten().collect())
    }

    /// Single-source search for one page of results.
    pub async fn aggregate_query(
        &self,
        query: &str,
        page: u32,
        source: SourceKind,
    ) -> Result<Vec<Item>> {
        let url = self.query_url(query, page, source);
        Ok(self.adapter.fetch(&url, source.into()).await)
    }

    fn query_url(&self, query: &str, page: u32, source: SourceKind) -> String {
        let base = match source {
            SourceKind::Static => &self.config.static_base,
            SourceKind::Video => &self.config.video_base,
        };
        format!("{base}{}&page={page}", urlencoding::encode(query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aggregator_with(config: FeedConfig) -> Aggregator {
        Aggregator::new(SourceAdapter::new(reqwest::Client::new()), config)
    }

    #[test]
    fn query_urls_embed_encoded_query_and_page() {
        let agg = aggregator_with(FeedConfig::default());
        let url = agg.query_url("black aesthetic", 2, SourceKind::Static);
        assert!(url.contains("query=black%20aesthetic"));
        assert!(url.ends_with("&page=2"));
        let url = agg.query_url("clips", 1, SourceKind::Video);
        assert!(url.contains("q=clips"));
    }
}
