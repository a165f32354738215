//! Priority-ordered field probing over untyped upstream records.
//!
//! Upstream sources disagree on field names, so every semantic slot is probed
//! through an ordered candidate list, with the nested `media` sub-object as a
//! final fallback tier. Lookups never fail; a total miss is `None`.

use crate::item::RawRecord;

pub const IMAGE_FIELDS: &[&str] = &["thumbnail", "thumb", "image", "image_url", "img", "url", "src"];
pub const IMAGE_MEDIA_FIELDS: &[&str] = &["src", "image"];

pub const VIDEO_FIELDS: &[&str] = &["video", "mp4", "src", "url"];
pub const VIDEO_MEDIA_FIELDS: &[&str] = &["mp4", "video"];

pub const FULL_FIELDS: &[&str] = &["full", "full_url", "original"];
pub const TITLE_FIELDS: &[&str] = &["title", "name", "alt"];
pub const DESCRIPTION_FIELDS: &[&str] = &["description", "desc", "caption"];
pub const TAG_FIELDS: &[&str] = &["tags", "categories"];
pub const ID_FIELDS: &[&str] = &["id", "post_id", "uid", "key"];

/// Return the first candidate key present with a non-empty string value,
/// probing top-level keys first and the `media.*` sub-object after.
pub fn extract_field<'a>(
    record: &'a RawRecord,
    candidates: &[&str],
    media_candidates: &[&str],
) -> Option<&'a str> {
    let obj = record.as_object()?;
    for key in candidates {
        if let Some(s) = obj.get(*key).and_then(non_empty_str) {
            return Some(s);
        }
    }
    if let Some(media) = obj.get("media").and_then(|m| m.as_object()) {
        for key in media_candidates {
            if let Some(s) = media.get(*key).and_then(non_empty_str) {
                return Some(s);
            }
        }
    }
    None
}

/// First candidate key whose value is usable as an identifier: a non-empty
/// string or a number (rendered to its decimal form).
pub fn extract_id(record: &RawRecord, candidates: &[&str]) -> Option<String> {
    let obj = record.as_object()?;
    for key in candidates {
        if let Some(v) = obj.get(*key) {
            if let Some(s) = non_empty_str(v) {
                return Some(s.to_string());
            }
            if let Some(n) = v.as_i64() {
                return Some(n.to_string());
            }
            if let Some(n) = v.as_u64() {
                return Some(n.to_string());
            }
        }
    }
    None
}

/// First candidate key holding an array; its string elements are collected.
/// Non-string elements are skipped rather than rejected.
pub fn extract_tags(record: &RawRecord, candidates: &[&str]) -> Vec<String> {
    let Some(obj) = record.as_object() else { return Vec::new() };
    for key in candidates {
        if let Some(arr) = obj.get(*key).and_then(|v| v.as_array()) {
            return arr
                .iter()
                .filter_map(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
    }
    Vec::new()
}

fn non_empty_str(v: &serde_json::Value) -> Option<&str> {
    v.as_str().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn probes_candidates_in_order() {
        let rec = json!({ "img": "b", "thumb": "a" });
        assert_eq!(extract_field(&rec, IMAGE_FIELDS, IMAGE_MEDIA_FIELDS), Some("a"));
    }

    #[test]
    fn skips_empty_values() {
        let rec = json!({ "thumb": "", "url": "u" });
        assert_eq!(extract_field(&rec, IMAGE_FIELDS, IMAGE_MEDIA_FIELDS), Some("u"));
    }

    #[test]
    fn falls_back_to_media_subobject() {
        let rec = json!({ "media": { "src": "m" } });
        assert_eq!(extract_field(&rec, IMAGE_FIELDS, IMAGE_MEDIA_FIELDS), Some("m"));
        let rec = json!({ "media": { "mp4": "v" } });
        assert_eq!(extract_field(&rec, VIDEO_FIELDS, VIDEO_MEDIA_FIELDS), Some("v"));
    }

    #[test]
    fn total_miss_is_none_not_error() {
        let rec = json!({ "unrelated": 1 });
        assert_eq!(extract_field(&rec, IMAGE_FIELDS, IMAGE_MEDIA_FIELDS), None);
        assert_eq!(extract_field(&json!("not an object"), IMAGE_FIELDS, IMAGE_MEDIA_FIELDS), None);
        assert_eq!(extract_field(&json!(null), IMAGE_FIELDS, IMAGE_MEDIA_FIELDS), None);
    }

    #[test]
    fn numeric_ids_are_rendered() {
        assert_eq!(extract_id(&json!({ "post_id": 42 }), ID_FIELDS), Some("42".to_string()));
        assert_eq!(extract_id(&json!({ "id": "abc" }), ID_FIELDS), Some("abc".to_string()));
        assert_eq!(extract_id(&json!({}), ID_FIELDS), None);
    }

    #[test]
    fn tags_collects_strings_only() {
        let rec = json!({ "tags": ["a", 3, "b", ""] });
        assert_eq!(extract_tags(&rec, TAG_FIELDS), vec!["a".to_string(), "b".to_string()]);
        assert!(extract_tags(&json!({ "tags": "not-a-list" }), TAG_FIELDS).is_empty());
    }
}
