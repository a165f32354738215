//! One upstream source behind a uniform, failure-absorbing fetch surface.
//!
//! The upstream contract is "JSON-shaped API, but sometimes an HTML page".
//! The adapter decodes tolerantly and never raises to its caller: transport
//! errors, bad statuses and undecodable bodies all degrade to an empty list,
//! logged for diagnostics.

use crate::html::parse_images_from_html;
use crate::item::{Item, ItemKind, RawRecord};
use crate::normalize::normalize;

#[derive(Clone)]
pub struct SourceAdapter {
    http: reqwest::Client,
}

impl SourceAdapter {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Fetch `url` and decode whatever comes back into items.
    ///
    /// 1. JSON body: the array itself, or the first of `results`/`items`/
    ///    `data` holding an array, normalized element-wise.
    /// 2. Otherwise (or when JSON yields nothing): HTML `<img>` fallback
    ///    against the request URL.
    /// 3. Both empty: `vec![]`.
    pub async fn fetch(&self, url: &str, kind: ItemKind) -> Vec<Item> {
        let text = match self.http.get(url).send().await {
            Ok(res) => {
                let status = res.status();
                if !status.is_success() {
                    tracing::warn!(%url, %status, "source returned non-success status");
                    return Vec::new();
                }
                match res.text().await {
                    Ok(t) => t,
                    Err(e) => {
                        tracing::warn!(%url, error = %e, "failed to read source body");
                        return Vec::new();
                    }
                }
            }
            Err(e) => {
                tracing::warn!(%url, error = %e, "source fetch failed");
                return Vec::new();
            }
        };

        if let Ok(json) = serde_json::from_str::<RawRecord>(&text) {
            if let Some(list) = candidate_list(&json) {
                if !list.is_empty() {
                    return list
                        .iter()
                        .enumerate()
                        .map(|(i, rec)| normalize(rec, i, kind))
                        .collect();
                }
            }
        }

        let imgs = parse_images_from_html(&text, url);
        if imgs.is_empty() {
            tracing::debug!(%url, "source yielded no decodable items");
        }
        imgs
    }
}

/// The record list inside an upstream JSON body, wherever it hides.
fn candidate_list(json: &RawRecord) -> Option<&Vec<RawRecord>> {
    if let Some(arr) = json.as_array() {
        return Some(arr);
    }
    for key in ["results", "items", "data"] {
        if let Some(arr) = json.get(key).and_then(|v| v.as_array()) {
            return Some(arr);
        }
    }
    None
}
