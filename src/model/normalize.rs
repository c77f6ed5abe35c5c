//! Re-deriving blocks from stored records of any age.
//!
//! Older records store content as an HTML string, as a JSON string holding a
//! block array, or as a block array with missing ids; some also carry images
//! in separate URL fields. Everything is folded into one `Vec<ContentBlock>`.

use super::{BlockType, ContentBlock, ImageOptions};
use crate::html::parse_html;
use indexmap::IndexSet;
use serde_json::Value;

/// Converts stored content into blocks. Never fails; the worst case is `[]`.
///
/// `legacy_images` are URLs from old per-record image fields. Any that no
/// image or gallery block references yet are appended as image blocks.
pub fn normalize_content(value: &Value, legacy_images: &[String]) -> Vec<ContentBlock> {
    let mut blocks = match value {
        Value::Array(items) => blocks_from_array(items),
        Value::String(text) => blocks_from_string(text),
        Value::Null => Vec::new(),
        other => {
            log::warn!("Unexpected stored content shape: {}", json_kind(other));
            Vec::new()
        }
    };

    let referenced: IndexSet<String> = blocks
        .iter()
        .flat_map(|b| b.image_urls())
        .map(str::to_string)
        .collect();

    let mut appended = 0;
    for url in legacy_images.iter().map(|u| u.trim()) {
        if url.is_empty() || referenced.contains(url) {
            continue;
        }
        if blocks
            .iter()
            .any(|b| b.kind == BlockType::Image && b.content == url)
        {
            continue;
        }
        blocks.push(ContentBlock::image(url, ImageOptions::default()));
        appended += 1;
    }
    if appended > 0 {
        log::debug!("Appended {} legacy images as blocks", appended);
    }

    blocks
}

fn blocks_from_string(text: &str) -> Vec<ContentBlock> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    if trimmed.starts_with('[') {
        match serde_json::from_str::<Vec<Value>>(trimmed) {
            Ok(items) => return blocks_from_array(&items),
            Err(e) => log::debug!("Content looks like JSON but is not a block array: {}", e),
        }
    }
    parse_html(trimmed)
}

fn blocks_from_array(items: &[Value]) -> Vec<ContentBlock> {
    items
        .iter()
        .enumerate()
        .filter_map(
            |(index, item)| match serde_json::from_value::<ContentBlock>(item.clone()) {
                Ok(block) => Some(block),
                Err(e) => {
                    log::warn!("Skipping malformed block at index {}: {}", index, e);
                    None
                }
            },
        )
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GalleryImage, GalleryStyle};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn block_arrays_get_ids_and_skip_malformed_entries() {
        let value = json!([
            {"type": "paragraph", "content": "a"},
            {"content": "no type"},
            {"id": "keep", "type": "heading", "content": "h", "metadata": {"level": 1}}
        ]);
        let blocks = normalize_content(&value, &[]);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].id.as_str().len(), 32);
        assert_eq!(blocks[1].id.as_str(), "keep");
        assert_eq!(blocks[1].heading_level(), 1);
    }

    #[test]
    fn strings_hold_json_or_html() {
        let json_string = Value::String(r#"[{"type":"quote","content":"q"}]"#.into());
        let blocks = normalize_content(&json_string, &[]);
        assert_eq!(blocks[0].kind, BlockType::Quote);

        let html = Value::String("<h2>Title</h2><p>Body</p>".into());
        let kinds: Vec<_> = normalize_content(&html, &[]).iter().map(|b| b.kind).collect();
        assert_eq!(kinds, vec![BlockType::Heading, BlockType::Paragraph]);

        assert!(normalize_content(&Value::String("[not json".into()), &[]).len() == 1);
        assert!(normalize_content(&json!(42), &[]).is_empty());
        assert!(normalize_content(&Value::Null, &[]).is_empty());
    }

    #[test]
    fn legacy_images_are_appended_once() {
        let gallery = ContentBlock::gallery(
            GalleryStyle::Grid,
            vec![GalleryImage::new("https://cdn.test/in-gallery.jpg")],
        );
        let value = serde_json::to_value(vec![gallery]).unwrap();
        let legacy = vec![
            "https://cdn.test/in-gallery.jpg".to_string(),
            "https://cdn.test/extra.jpg".to_string(),
            "https://cdn.test/extra.jpg".to_string(),
            " ".to_string(),
        ];
        let blocks = normalize_content(&value, &legacy);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].kind, BlockType::Image);
        assert_eq!(blocks[1].content, "https://cdn.test/extra.jpg");
    }
}
