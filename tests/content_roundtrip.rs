// tests/content_roundtrip.rs
//! Blocks → HTML → blocks through the public API, the way the editing
//! surface and stored records exercise it.

use folio::editor::{BlockDialog, ExternalUpdate};
use folio::{
    normalize_content, parse_html, serialize_blocks, BlockEditor, BlockType, ContentBlock, Editor,
    GalleryImage, GalleryStyle, ImageAlign, ImageOptions, ImageSize, ListType, SyncState, Toolbar,
    ToolbarPreset,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn document() -> Vec<ContentBlock> {
    vec![
        ContentBlock::heading(1, "Harbour Pavilion"),
        ContentBlock::paragraph("A <strong>timber</strong> landmark."),
        ContentBlock::image(
            "https://cdn.example/pavilion.webp",
            ImageOptions {
                alt: Some("Pavilion at dusk".into()),
                caption: Some("Photo: North Studio".into()),
                align: Some(ImageAlign::Right),
                size: Some(ImageSize::Medium),
            },
        ),
        ContentBlock::list(ListType::Number, &["Frame", "Roof"]),
        ContentBlock::quote("Built to weather."),
        ContentBlock::gallery(
            GalleryStyle::Masonry,
            vec![
                GalleryImage::new("https://cdn.example/1.webp").with_caption("North"),
                GalleryImage::new("https://cdn.example/2.webp"),
            ],
        ),
        ContentBlock::video("https://vimeo.com/123456"),
        ContentBlock::divider(),
    ]
}

#[test]
fn serialized_documents_parse_back_to_the_same_shape() {
    let original = document();
    let parsed = parse_html(&serialize_blocks(&original));

    let kinds = |blocks: &[ContentBlock]| blocks.iter().map(|b| b.kind).collect::<Vec<_>>();
    assert_eq!(kinds(&parsed), kinds(&original));

    for (before, after) in original.iter().zip(&parsed) {
        assert_eq!(after.content, before.content, "content of {}", before.kind);
    }

    let image = &parsed[2];
    assert_eq!(image.align(), Some(ImageAlign::Right));
    assert_eq!(image.size(), Some(ImageSize::Medium));
    assert_eq!(image.alt(), Some("Pavilion at dusk"));
    assert_eq!(image.caption(), Some("Photo: North Studio"));

    assert_eq!(parsed[3].list_type(), ListType::Number);
    assert_eq!(parsed[5].gallery_style(), GalleryStyle::Masonry);
    assert_eq!(parsed[5].gallery_images(), original[5].gallery_images());
}

#[test]
fn editor_round_trip_keeps_text_blocks() {
    let mut editor = Editor::with_content(Toolbar::preset(ToolbarPreset::Article), document());
    let html = editor.serialize();
    let blocks = editor.parse(&html).to_vec();

    assert_eq!(blocks.len(), document().len());
    assert_eq!(blocks[0].heading_level(), 1);
    assert_eq!(blocks[1].content, "A <strong>timber</strong> landmark.");
    assert!(editor.is_dirty());
}

#[test]
fn simple_toolbar_rejects_media_dialogs() {
    let mut editor = Editor::new(Toolbar::preset(ToolbarPreset::Simple));
    let err = editor
        .insert_from_dialog(
            None,
            BlockDialog::Video {
                url: "https://youtu.be/dQw4w9WgXcQ".into(),
            },
        )
        .unwrap_err();
    assert!(err.to_string().contains("not available in the simple editor"));
    assert!(editor.blocks().is_empty());
}

#[test]
fn external_content_waits_for_typing_to_settle() {
    let mut editor = Editor::new(Toolbar::default());
    editor
        .insert_block(None, ContentBlock::paragraph("typing…"))
        .unwrap();
    assert_eq!(editor.sync_state(), SyncState::Editing);

    let restored = vec![ContentBlock::paragraph("restored draft")];
    assert_eq!(editor.receive_external(restored.clone()), ExternalUpdate::Queued);
    assert_eq!(editor.blocks()[0].content, "typing…");

    assert!(editor.input_settled());
    assert_eq!(editor.blocks(), restored.as_slice());
    assert_eq!(editor.sync_state(), SyncState::Idle);
}

#[test]
fn stored_records_of_every_age_normalize() {
    let html = json!("<h2>Legacy</h2><p>Body</p>");
    let blocks = normalize_content(&html, &["https://cdn.example/old.jpg".to_string()]);
    let kinds: Vec<_> = blocks.iter().map(|b| b.kind).collect();
    assert_eq!(
        kinds,
        vec![BlockType::Heading, BlockType::Paragraph, BlockType::Image]
    );

    let stringified = json!(r#"[{"type":"paragraph","content":"Hi"}]"#);
    let blocks = normalize_content(&stringified, &[]);
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].content, "Hi");

    assert!(normalize_content(&json!(null), &[]).is_empty());
    assert!(normalize_content(&json!("<p></p>"), &[]).is_empty());
}
