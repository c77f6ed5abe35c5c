//! HTML → Block parsing.
//!
//! The input is parsed into an html5ever `RcDom` and the body's top-level
//! children are walked in order. Recognized tags, classes and `data-*`
//! attributes become blocks; unrecognized wrappers are recursed into when
//! they hold block-level children and otherwise become a paragraph of their
//! text. Anything that cannot be turned into a block is dropped.

use super::style::{
    align_from_classes, align_from_style, size_from_length, size_from_style, IMAGE_CLASS,
};
use super::{escape_text, is_blank_fragment};
use crate::model::{
    AccordionItem, CalloutType, ContentBlock, GalleryImage, GalleryStyle,
    ImageAlign, ImageOptions, ImageSize, ListType, SpacerHeight,
};
use crate::types::AccordionItemId;
use html5ever::driver::ParseOpts;
use html5ever::serialize::{SerializeOpts, TraversalScope};
use html5ever::tendril::TendrilSink;
use html5ever::{parse_document, serialize};
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};

/// Tags that make a wrapper element a container worth recursing into.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "details", "div", "figure", "footer", "h1",
    "h2", "h3", "h4", "h5", "h6", "header", "hr", "iframe", "img", "main", "nav", "ol", "p",
    "pre", "section", "table", "ul", "video",
];

/// Elements whose content never becomes a block.
const IGNORED_TAGS: &[&str] = &[
    "br", "head", "link", "meta", "noscript", "script", "style", "template", "title",
];

/// Parses an HTML string into blocks.
///
/// Returns `[]` when the document has no non-empty node, so `"<p></p>"` and
/// `"<p><br></p>"` both yield nothing. Otherwise empty paragraphs are kept
/// to preserve spacing.
pub fn parse_html(html: &str) -> Vec<ContentBlock> {
    if html.trim().is_empty() {
        return Vec::new();
    }

    let dom = parse_document(RcDom::default(), ParseOpts::default()).one(html);
    let Some(body) = find_element(&dom.document, "body") else {
        log::warn!("HTML produced no <body>; nothing to convert");
        return Vec::new();
    };

    let mut blocks = Vec::new();
    for child in body.children.borrow().iter() {
        visit(child, None, &mut blocks);
    }

    if blocks.iter().all(ContentBlock::is_blank_text) {
        log::debug!("HTML had no non-empty nodes; returning no blocks");
        return Vec::new();
    }

    log::debug!("Parsed {} blocks from {} bytes of HTML", blocks.len(), html.len());
    blocks
}

fn visit(node: &Handle, parent: Option<&Handle>, out: &mut Vec<ContentBlock>) {
    match &node.data {
        NodeData::Text { contents } => {
            let text = contents.borrow();
            let text = text.trim();
            if !text.is_empty() {
                out.push(ContentBlock::paragraph(escape_text(text)));
            }
        }
        NodeData::Element { .. } => visit_element(node, parent, out),
        _ => {}
    }
}

fn visit_element(node: &Handle, parent: Option<&Handle>, out: &mut Vec<ContentBlock>) {
    let Some(tag) = tag_name(node) else {
        return;
    };

    // Marker classes and data attributes win over the tag name.
    if has_class(node, "ql-gallery") || attr(node, "data-gallery-type").is_some() {
        out.push(parse_gallery(node));
        return;
    }
    if has_class(node, "ql-video") || attr(node, "data-video").is_some() {
        if let Some(block) = parse_video(node) {
            out.push(block);
        }
        return;
    }
    if has_class(node, "ql-callout") || attr(node, "data-callout-type").is_some() {
        out.push(parse_callout(node));
        return;
    }
    if has_class(node, "ql-spacer") || attr(node, "data-spacer-height").is_some() {
        let height = SpacerHeight::parse(&attr(node, "data-spacer-height").unwrap_or_default());
        out.push(ContentBlock::spacer(height));
        return;
    }
    if has_class(node, "ql-accordion") || attr(node, "data-accordion").is_some() {
        out.push(parse_accordion(node));
        return;
    }

    match tag.as_str() {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = tag[1..].parse::<u8>().unwrap_or(2);
            out.push(ContentBlock::heading(level, text_fragment(node)));
        }
        "p" => visit_paragraph(node, out),
        "ul" | "ol" => {
            let list_type = if tag == "ol" {
                ListType::Number
            } else {
                ListType::Bullet
            };
            let items: Vec<String> = node
                .children
                .borrow()
                .iter()
                .filter(|child| tag_name(child).as_deref() == Some("li"))
                .map(|li| text_content(li).trim().to_string())
                .filter(|text| !text.is_empty())
                .map(|text| escape_text(&text))
                .collect();
            if !items.is_empty() {
                out.push(ContentBlock::list(list_type, items.as_slice()));
            }
        }
        "blockquote" => out.push(ContentBlock::quote(text_fragment(node))),
        "figure" => match find_element(node, "img") {
            Some(img) => {
                if let Some(block) = parse_image(&img, Some(node)) {
                    out.push(block);
                }
            }
            None => visit_children(node, out),
        },
        "img" => {
            if let Some(block) = parse_image(node, parent) {
                out.push(block);
            }
        }
        "iframe" | "video" => {
            if let Some(block) = parse_video(node) {
                out.push(block);
            }
        }
        "hr" => out.push(ContentBlock::divider()),
        "pre" => out.push(parse_code(node)),
        t if IGNORED_TAGS.contains(&t) => {}
        _ => {
            if has_block_children(node) {
                visit_children(node, out);
            } else {
                let text = text_content(node);
                let text = text.trim();
                if !text.is_empty() {
                    out.push(ContentBlock::paragraph(escape_text(text)));
                }
            }
        }
    }
}

fn visit_children(node: &Handle, out: &mut Vec<ContentBlock>) {
    for child in node.children.borrow().iter() {
        visit(child, Some(node), out);
    }
}

/// A paragraph holding only images yields image blocks; any other paragraph,
/// including an empty one, yields a paragraph block.
/// Inner HTML of a text block, or empty when it holds only whitespace and `<br>`.
fn text_fragment(node: &Handle) -> String {
    let content = inner_html(node);
    let content = content.trim();
    if is_blank_fragment(content) {
        String::new()
    } else {
        content.to_string()
    }
}

fn visit_paragraph(node: &Handle, out: &mut Vec<ContentBlock>) {
    let content = inner_html(node);
    let content = content.trim();

    let mut images = Vec::new();
    collect_elements(node, "img", &mut images);
    if !images.is_empty() && text_content(node).trim().is_empty() {
        for img in &images {
            if let Some(block) = parse_image(img, Some(node)) {
                out.push(block);
            }
        }
        return;
    }

    if is_blank_fragment(content) {
        out.push(ContentBlock::paragraph(""));
    } else {
        out.push(ContentBlock::paragraph(content));
    }
}

// ---------------------------------------------------------------------------
// Media
// ---------------------------------------------------------------------------

/// Sources that only live in the browser session are never persisted.
fn is_persistable_src(src: &str) -> bool {
    let src = src.trim();
    !(src.is_empty() || src.starts_with("data:") || src.starts_with("blob:"))
}

/// Builds an image block from an `<img>` and its wrapping element.
///
/// Figures written by the serializer carry `data-align`/`data-size` and are
/// trusted as-is; other markup falls back to classes and inline styles.
fn parse_image(img: &Handle, context: Option<&Handle>) -> Option<ContentBlock> {
    let src = attr(img, "src").unwrap_or_default();
    if !is_persistable_src(&src) {
        log::warn!(
            "Skipping image with transient or empty source: {:.40}",
            src
        );
        return None;
    }

    let authored = context
        .map(|ctx| {
            has_class(ctx, IMAGE_CLASS)
                || attr(ctx, "data-align").is_some()
                || attr(ctx, "data-size").is_some()
        })
        .unwrap_or(false);

    let align = context
        .and_then(|ctx| attr(ctx, "data-align"))
        .and_then(|a| ImageAlign::parse(&a))
        .or_else(|| {
            if authored {
                None
            } else {
                infer_align(img, context)
            }
        });

    let size = context
        .and_then(|ctx| attr(ctx, "data-size"))
        .and_then(|s| ImageSize::parse(&s))
        .or_else(|| {
            if authored {
                None
            } else {
                infer_size(img, context)
            }
        });

    let caption = context
        .and_then(|ctx| find_element(ctx, "figcaption"))
        .map(|cap| text_content(&cap).trim().to_string())
        .filter(|cap| !cap.is_empty());

    Some(ContentBlock::image(
        src.trim(),
        ImageOptions {
            alt: attr(img, "alt").filter(|a| !a.trim().is_empty()),
            caption,
            align,
            size,
        },
    ))
}

fn infer_align(img: &Handle, context: Option<&Handle>) -> Option<ImageAlign> {
    let from_element = |node: &Handle| {
        attr(node, "class")
            .as_deref()
            .and_then(align_from_classes)
            .or_else(|| attr(node, "style").as_deref().and_then(align_from_style))
    };
    context.and_then(from_element).or_else(|| from_element(img))
}

fn infer_size(img: &Handle, context: Option<&Handle>) -> Option<ImageSize> {
    attr(img, "style")
        .as_deref()
        .and_then(size_from_style)
        .or_else(|| attr(img, "width").as_deref().and_then(size_from_length))
        .or_else(|| {
            context
                .and_then(|ctx| attr(ctx, "style"))
                .as_deref()
                .and_then(size_from_style)
        })
}

fn parse_gallery(node: &Handle) -> ContentBlock {
    let style = GalleryStyle::parse(&attr(node, "data-gallery-type").unwrap_or_default());
    let mut images = Vec::new();
    collect_gallery_images(node, &mut images);
    ContentBlock::gallery(style, images)
}

fn collect_gallery_images(node: &Handle, images: &mut Vec<GalleryImage>) {
    for child in node.children.borrow().iter() {
        match tag_name(child).as_deref() {
            Some("figure") => {
                let Some(img) = find_element(child, "img") else {
                    continue;
                };
                if let Some(mut image) = gallery_image(&img) {
                    image.caption = find_element(child, "figcaption")
                        .map(|cap| text_content(&cap).trim().to_string())
                        .filter(|cap| !cap.is_empty());
                    images.push(image);
                }
            }
            Some("img") => images.extend(gallery_image(child)),
            Some(_) => collect_gallery_images(child, images),
            None => {}
        }
    }
}

fn gallery_image(img: &Handle) -> Option<GalleryImage> {
    let src = attr(img, "src")?;
    if !is_persistable_src(&src) {
        return None;
    }
    Some(GalleryImage {
        url: src.trim().to_string(),
        alt: attr(img, "alt").filter(|a| !a.trim().is_empty()),
        caption: None,
    })
}

fn parse_video(node: &Handle) -> Option<ContentBlock> {
    let url = attr(node, "data-video")
        .filter(|v| !v.trim().is_empty())
        .or_else(|| attr(node, "src").filter(|v| !v.trim().is_empty()))
        .or_else(|| find_element(node, "source").and_then(|source| attr(&source, "src")))
        .unwrap_or_else(|| text_content(node));
    let url = url.trim();
    if url.is_empty() || !is_persistable_src(url) {
        return None;
    }
    Some(ContentBlock::video(url))
}

// ---------------------------------------------------------------------------
// Structured blocks
// ---------------------------------------------------------------------------

fn parse_callout(node: &Handle) -> ContentBlock {
    let kind = attr(node, "data-callout-type").or_else(|| {
        attr(node, "class").and_then(|classes| {
            classes
                .split_whitespace()
                .find_map(|c| c.strip_prefix("callout-").map(str::to_string))
        })
    });
    let content = inner_html(node);
    ContentBlock::callout(
        CalloutType::parse(kind.as_deref().unwrap_or_default()),
        content.trim(),
    )
}

fn parse_code(node: &Handle) -> ContentBlock {
    let code = find_element(node, "code");
    let language = attr(node, "data-language")
        .or_else(|| language_class(node))
        .or_else(|| code.as_ref().and_then(language_class));
    ContentBlock::code(language, text_content(node))
}

fn language_class(node: &Handle) -> Option<String> {
    attr(node, "class")?
        .split_whitespace()
        .find_map(|c| c.strip_prefix("language-").map(str::to_string))
}

fn parse_accordion(node: &Handle) -> ContentBlock {
    let mut details = Vec::new();
    collect_elements(node, "details", &mut details);

    let items = details
        .iter()
        .map(|item| {
            let id = attr(item, "data-item-id")
                .and_then(|id| AccordionItemId::parse(&id).ok())
                .unwrap_or_else(AccordionItemId::generate);
            let title = find_element(item, "summary")
                .map(|summary| text_content(&summary).trim().to_string())
                .unwrap_or_default();
            let body: String = item
                .children
                .borrow()
                .iter()
                .filter(|child| tag_name(child).as_deref() != Some("summary"))
                .map(|child| {
                    if has_class(child, "accordion-content") {
                        inner_html(child)
                    } else {
                        outer_html(child)
                    }
                })
                .collect();
            AccordionItem {
                id,
                title,
                content: body.trim().to_string(),
            }
        })
        .collect();

    ContentBlock::accordion(items)
}

// ---------------------------------------------------------------------------
// DOM helpers
// ---------------------------------------------------------------------------

fn tag_name(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.to_ascii_lowercase().to_string()),
        _ => None,
    }
}

fn attr(node: &Handle, name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|a| a.name.local.as_ref().eq_ignore_ascii_case(name))
            .map(|a| a.value.to_string()),
        _ => None,
    }
}

fn has_class(node: &Handle, class: &str) -> bool {
    attr(node, "class")
        .map(|classes| classes.split_whitespace().any(|c| c == class))
        .unwrap_or(false)
}

/// Depth-first search for the first descendant with the given tag.
fn find_element(node: &Handle, tag: &str) -> Option<Handle> {
    for child in node.children.borrow().iter() {
        if tag_name(child).as_deref() == Some(tag) {
            return Some(child.clone());
        }
        if let Some(found) = find_element(child, tag) {
            return Some(found);
        }
    }
    None
}

/// All descendants with the given tag, in document order.
fn collect_elements(node: &Handle, tag: &str, found: &mut Vec<Handle>) {
    for child in node.children.borrow().iter() {
        if tag_name(child).as_deref() == Some(tag) {
            found.push(child.clone());
        }
        collect_elements(child, tag, found);
    }
}

fn has_block_children(node: &Handle) -> bool {
    node.children.borrow().iter().any(|child| {
        tag_name(child)
            .map(|tag| BLOCK_TAGS.contains(&tag.as_str()))
            .unwrap_or(false)
            || attr(child, "data-video").is_some()
            || attr(child, "data-gallery-type").is_some()
    })
}

fn text_content(node: &Handle) -> String {
    let mut text = String::new();
    push_text(node, &mut text);
    text
}

fn push_text(node: &Handle, text: &mut String) {
    match &node.data {
        NodeData::Text { contents } => text.push_str(&contents.borrow()),
        NodeData::Element { .. } if tag_name(node).as_deref() == Some("br") => text.push('\n'),
        _ => {
            for child in node.children.borrow().iter() {
                push_text(child, text);
            }
        }
    }
}

fn inner_html(node: &Handle) -> String {
    serialize_node(node, TraversalScope::ChildrenOnly(None))
}

fn outer_html(node: &Handle) -> String {
    serialize_node(node, TraversalScope::IncludeNode)
}

fn serialize_node(node: &Handle, traversal_scope: TraversalScope) -> String {
    let mut output = Vec::new();
    let opts = SerializeOpts {
        traversal_scope,
        ..Default::default()
    };
    let serializable = SerializableHandle::from(node.clone());
    if let Err(e) = serialize(&mut output, &serializable, opts) {
        log::warn!("Failed to serialize HTML fragment: {}", e);
        return String::new();
    }
    String::from_utf8_lossy(&output).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::serialize_blocks;
    use crate::model::*;
    use pretty_assertions::assert_eq;

    fn kinds(blocks: &[ContentBlock]) -> Vec<BlockType> {
        blocks.iter().map(|b| b.kind).collect()
    }

    #[test]
    fn documents_without_content_yield_nothing() {
        assert!(parse_html("").is_empty());
        assert!(parse_html("<p></p>").is_empty());
        assert!(parse_html("<p><br></p>").is_empty());
        assert!(parse_html("<p><br></p><p> </p>").is_empty());
    }

    #[test]
    fn empty_paragraphs_between_content_are_kept() {
        let blocks = parse_html("<p>a</p><p><br></p><p>b</p>");
        assert_eq!(kinds(&blocks), vec![BlockType::Paragraph; 3]);
        assert_eq!(blocks[1].content, "");
    }

    #[test]
    fn data_uri_and_blob_images_are_rejected() {
        assert!(parse_html(r#"<img src="data:image/png;base64,xxx">"#).is_empty());
        assert!(parse_html(r#"<img src="blob:https://site/123">"#).is_empty());
        assert!(parse_html(r#"<img src="">"#).is_empty());
    }

    #[test]
    fn headings_clamp_levels() {
        let blocks = parse_html("<h1>A</h1><h3>B</h3><h5>C</h5>");
        let levels: Vec<u8> = blocks.iter().map(ContentBlock::heading_level).collect();
        assert_eq!(levels, vec![1, 3, 3]);
    }

    #[test]
    fn lists_keep_non_empty_items() {
        let blocks = parse_html("<ol><li>one</li><li> </li><li><b>two</b></li></ol>");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].content, "one\ntwo");
        assert_eq!(blocks[0].list_type(), ListType::Number);
    }

    #[test]
    fn escaped_list_text_stays_text_across_round_trips() {
        let html = "<ul><li>&lt;img src=x onerror=alert(1)&gt;</li><li>a &lt;b&gt; c</li></ul>";
        let first = parse_html(html);
        assert_eq!(
            first[0].content,
            "&lt;img src=x onerror=alert(1)&gt;\na &lt;b&gt; c"
        );

        let reserialized = serialize_blocks(&first);
        assert!(!reserialized.contains("<img"));
        let second = parse_html(&reserialized);
        assert_eq!(kinds(&second), vec![BlockType::List]);
        assert_eq!(second[0].content, first[0].content);
        assert_eq!(serialize_blocks(&second), reserialized);
    }

    #[test]
    fn empty_headings_and_quotes_are_kept() {
        let original = vec![
            ContentBlock::heading(2, ""),
            ContentBlock::paragraph("body"),
            ContentBlock::quote(""),
        ];
        let parsed = parse_html(&serialize_blocks(&original));
        assert_eq!(kinds(&parsed), kinds(&original));
        assert_eq!(parsed[0].content, "");
        assert_eq!(parsed[2].content, "");

        assert!(parse_html("<h2></h2><blockquote><br></blockquote><p></p>").is_empty());
    }

    #[test]
    fn text_nodes_and_unknown_wrappers() {
        let blocks = parse_html("loose text<section><p>inner</p></section><span>inline</span>");
        assert_eq!(kinds(&blocks), vec![BlockType::Paragraph; 3]);
        assert_eq!(blocks[0].content, "loose text");
        assert_eq!(blocks[1].content, "inner");
        assert_eq!(blocks[2].content, "inline");
    }

    #[test]
    fn text_round_trip_preserves_types_and_text() {
        let original = vec![
            ContentBlock::heading(2, "Title"),
            ContentBlock::paragraph("Some <em>styled</em> text"),
            ContentBlock::list(ListType::Bullet, &["a", "b"]),
            ContentBlock::quote("Said <strong>well</strong>"),
            ContentBlock::paragraph(""),
            ContentBlock::paragraph("end"),
        ];
        let parsed = parse_html(&serialize_blocks(&original));
        assert_eq!(kinds(&parsed), kinds(&original));
        for (a, b) in original.iter().zip(&parsed) {
            assert_eq!(
                crate::html::strip_tags(&a.content),
                crate::html::strip_tags(&b.content)
            );
        }
        assert_eq!(parsed[3].content, "Said <strong>well</strong>");
    }

    #[test]
    fn gallery_round_trip_keeps_order_and_captions() {
        let images = vec![
            GalleryImage::new("https://cdn.test/1.jpg").with_caption("First & best"),
            GalleryImage::new("https://cdn.test/2.jpg").with_alt("second"),
            GalleryImage::new("https://cdn.test/3.jpg").with_caption("Third"),
        ];
        let html = serialize_blocks(&[ContentBlock::gallery(GalleryStyle::Carousel, images.clone())]);
        assert!(html.contains(r#"data-gallery-type="carousel""#));

        let parsed = parse_html(&html);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].kind, BlockType::Gallery);
        assert_eq!(parsed[0].gallery_style(), GalleryStyle::Carousel);
        assert_eq!(parsed[0].gallery_images(), images.as_slice());
    }

    #[test]
    fn image_round_trip_uses_data_attributes() {
        let original = ContentBlock::image(
            "https://cdn.test/a.webp",
            ImageOptions {
                alt: Some("A".into()),
                caption: Some("Caption".into()),
                align: Some(ImageAlign::Right),
                size: Some(ImageSize::Large),
            },
        );
        let parsed = parse_html(&serialize_blocks(&[original.clone()]));
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].content, original.content);
        assert_eq!(parsed[0].metadata, original.metadata);

        let plain = ContentBlock::image("https://cdn.test/b.webp", ImageOptions::default());
        let parsed = parse_html(&serialize_blocks(&[plain]));
        assert_eq!(parsed[0].align(), None);
        assert_eq!(parsed[0].size(), None);
    }

    #[test]
    fn foreign_images_infer_from_classes_and_styles() {
        let blocks = parse_html(
            r#"<p class="ql-align-center"><img src="https://x.test/a.png" style="width: 500px"></p>
               <div style="text-align: right"><img src="https://x.test/b.png" width="1600"></div>"#,
        );
        assert_eq!(kinds(&blocks), vec![BlockType::Image, BlockType::Image]);
        assert_eq!(blocks[0].align(), Some(ImageAlign::Center));
        assert_eq!(blocks[0].size(), Some(ImageSize::Medium));
        assert_eq!(blocks[1].align(), Some(ImageAlign::Right));
        assert_eq!(blocks[1].size(), Some(ImageSize::Full));
    }

    #[test]
    fn video_from_placeholder_and_iframe() {
        let blocks = parse_html(
            r#"<div data-video="https://youtu.be/dQw4w9WgXcQ"></div><iframe class="ql-video" src="https://player.vimeo.com/video/1"></iframe>"#,
        );
        assert_eq!(kinds(&blocks), vec![BlockType::Video, BlockType::Video]);
        assert_eq!(blocks[0].content, "https://youtu.be/dQw4w9WgXcQ");
        assert_eq!(blocks[1].content, "https://player.vimeo.com/video/1");
    }

    #[test]
    fn structured_blocks_round_trip() {
        let original = vec![
            ContentBlock::callout(CalloutType::Success, "<strong>Done</strong>"),
            ContentBlock::code(Some("rust".into()), "fn main() {\n    a < b;\n}"),
            ContentBlock::divider(),
            ContentBlock::spacer(SpacerHeight::Large),
            ContentBlock::accordion(vec![
                AccordionItem::new("One", "<p>first</p>"),
                AccordionItem::new("Two & more", "<p>second</p>"),
            ]),
            ContentBlock::video("https://vimeo.com/76979871"),
        ];
        let parsed = parse_html(&serialize_blocks(&original));
        assert_eq!(kinds(&parsed), kinds(&original));
        assert_eq!(parsed[0].callout_type(), CalloutType::Success);
        assert_eq!(parsed[0].content, "<strong>Done</strong>");
        assert_eq!(parsed[1].content, original[1].content);
        assert_eq!(parsed[1].language(), Some("rust"));
        assert_eq!(parsed[3].spacer_height(), SpacerHeight::Large);
        assert_eq!(parsed[4].accordion_items(), original[4].accordion_items());
        assert_eq!(parsed[5].content, "https://vimeo.com/76979871");
    }
}
