//! Last-resort extraction for sources that answer with a web page instead of
//! an API body: scan the markup for `<img>` tags and promote each source URL
//! to an image item.

use std::sync::OnceLock;

use regex::Regex;
use url::Url;

use crate::item::Item;
use crate::normalize::id_suffix;

fn img_src_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Tolerates single or double quotes; attribute order does not matter.
    RE.get_or_init(|| Regex::new(r#"(?i)<img[^>]+src\s*=\s*["']([^"']*)["']"#).expect("img regex"))
}

/// Scan `html` for image tags and resolve each `src` against `base_url`.
/// Sources that do not resolve to a valid absolute URL are skipped silently.
pub fn parse_images_from_html(html: &str, base_url: &str) -> Vec<Item> {
    let Ok(base) = Url::parse(base_url) else {
        tracing::debug!(base_url, "html fallback skipped: unparseable base url");
        return Vec::new();
    };
    let mut out = Vec::new();
    for caps in img_src_re().captures_iter(html) {
        let src = &caps[1];
        let Ok(abs) = base.join(src) else { continue };
        let abs = abs.to_string();
        out.push(Item {
            id: format!("html_img_{}_{}", out.len(), id_suffix()),
            title: String::new(),
            thumbnail: Some(abs.clone()),
            full: Some(abs),
            video: None,
            tags: Vec::new(),
            description: String::new(),
            raw: serde_json::Value::Null,
        });
    }
    out
}
