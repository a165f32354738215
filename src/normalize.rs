//! Raw upstream records become canonical [`Item`]s here.
//!
//! Synthesized ids combine the best natural key with a random suffix: natural
//! keys are not unique across sources or pages, so collision-safety wins over
//! cross-fetch stability.

use crate::extract::{
    extract_field, extract_id, extract_tags, DESCRIPTION_FIELDS, FULL_FIELDS, ID_FIELDS,
    IMAGE_FIELDS, IMAGE_MEDIA_FIELDS, TAG_FIELDS, TITLE_FIELDS, VIDEO_FIELDS, VIDEO_MEDIA_FIELDS,
};
use crate::item::{Item, ItemKind, RawRecord};

/// Normalize one record at position `index` of its batch.
pub fn normalize(record: &RawRecord, index: usize, kind: ItemKind) -> Item {
    match kind {
        ItemKind::Image => normalize_image(record, index),
        ItemKind::Video => normalize_video(record, index),
    }
}

pub fn normalize_image(record: &RawRecord, index: usize) -> Item {
    let base_id = extract_id(record, ID_FIELDS).unwrap_or_else(|| format!("img_{index}"));
    let thumbnail = extract_field(record, IMAGE_FIELDS, IMAGE_MEDIA_FIELDS).map(str::to_string);
    let full = extract_field(record, FULL_FIELDS, &[])
        .map(str::to_string)
        .or_else(|| thumbnail.clone());
    let tags = extract_tags(record, TAG_FIELDS);
    let title = extract_field(record, TITLE_FIELDS, &[])
        .map(str::to_string)
        .or_else(|| tags.first().cloned())
        .unwrap_or_default();
    let description = extract_field(record, DESCRIPTION_FIELDS, &[])
        .unwrap_or_default()
        .to_string();
    Item {
        id: suffixed_id(&base_id),
        title,
        thumbnail,
        full,
        video: None,
        tags,
        description,
        raw: record.clone(),
    }
}

pub fn normalize_video(record: &RawRecord, index: usize) -> Item {
    let base_id = extract_id(record, ID_FIELDS).unwrap_or_else(|| format!("vid_{index}"));
    // Posters come first for clips; the generic image chain is the fallback.
    let thumbnail = extract_field(record, &["thumb", "poster"], &[])
        .or_else(|| extract_field(record, IMAGE_FIELDS, IMAGE_MEDIA_FIELDS))
        .map(str::to_string);
    let video = extract_field(record, VIDEO_FIELDS, VIDEO_MEDIA_FIELDS).map(str::to_string);
    let title = extract_field(record, TITLE_FIELDS, &[]).unwrap_or_default().to_string();
    let description = extract_field(record, DESCRIPTION_FIELDS, &[])
        .unwrap_or_default()
        .to_string();
    let tags = extract_tags(record, TAG_FIELDS);
    Item {
        id: suffixed_id(&base_id),
        title,
        thumbnail,
        full: None,
        video,
        tags,
        description,
        raw: record.clone(),
    }
}

/// Append a random fragment so ids from independently-fetched batches never
/// collide.
pub fn suffixed_id(base: &str) -> String {
    format!("{base}_{}", id_suffix())
}

pub(crate) fn id_suffix() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    id[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_without_media_fields_yields_bare_item() {
        let rec = json!({ "something": "else" });
        let item = normalize(&rec, 0, ItemKind::Image);
        assert!(item.thumbnail.is_none());
        assert!(item.full.is_none());
        assert!(item.video.is_none());
        assert!(item.title.is_empty());
        assert!(!item.is_usable());
        assert!(item.id.starts_with("img_0_"));
    }

    #[test]
    fn same_record_twice_differs_only_in_id() {
        let rec = json!({ "id": "w1", "title": "dunes", "tags": ["desert"], "thumb": "t" });
        let a = normalize(&rec, 0, ItemKind::Image);
        let b = normalize(&rec, 0, ItemKind::Image);
        assert_ne!(a.id, b.id);
        assert_eq!(a.title, b.title);
        assert_eq!(a.tags, b.tags);
        assert_eq!(a.thumbnail, b.thumbnail);
    }

    #[test]
    fn full_falls_back_to_thumbnail() {
        let rec = json!({ "id": "a", "thumb": "u1" });
        let item = normalize_image(&rec, 0);
        assert_eq!(item.thumbnail.as_deref(), Some("u1"));
        assert_eq!(item.full.as_deref(), Some("u1"));

        let rec = json!({ "id": "b", "thumb": "u1", "original": "u2" });
        assert_eq!(normalize_image(&rec, 0).full.as_deref(), Some("u2"));
    }

    #[test]
    fn image_title_falls_back_to_first_tag() {
        let rec = json!({ "tags": ["sunset", "beach"], "url": "u" });
        assert_eq!(normalize_image(&rec, 0).title, "sunset");
    }

    #[test]
    fn video_flavor_picks_poster_and_stream() {
        let rec = json!({ "id": 7, "poster": "p", "mp4": "v.mp4" });
        let item = normalize(&rec, 2, ItemKind::Video);
        assert!(item.id.starts_with("7_"));
        assert_eq!(item.thumbnail.as_deref(), Some("p"));
        assert_eq!(item.video.as_deref(), Some("v.mp4"));
        assert!(item.full.is_none());
    }

    #[test]
    fn raw_record_is_preserved() {
        let rec = json!({ "id": "x", "url": "u", "extra": { "n": 1 } });
        let item = normalize_image(&rec, 0);
        assert_eq!(item.raw["extra"]["n"], 1);
    }
}
