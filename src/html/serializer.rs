//! Block → HTML serialization.
//!
//! Each block maps independently to a fragment and the fragments are
//! concatenated with no separator. Text-like content is already HTML and is
//! emitted verbatim; URLs, alt text and captions are escaped.

use super::embed::resolve_embed;
use super::style::{figure_style, gallery_layout, image_size_style, IMAGE_CLASS};
use super::{escape_attr, escape_text};
use crate::constants::CHARS_PER_BLOCK_ESTIMATE;
use crate::model::{BlockType, ContentBlock, GalleryImage, ListType};
use std::fmt::Write;

/// How video blocks are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VideoMode {
    /// `<div data-video>` placeholder, as stored for editing
    Placeholder,
    /// Resolved `<iframe>`/`<video>` for display
    Embed,
}

/// Serializes blocks to the HTML the editing surface loads.
pub fn serialize_blocks(blocks: &[ContentBlock]) -> String {
    render(blocks, VideoMode::Placeholder)
}

/// Serializes blocks for display, resolving video URLs to embeds.
pub fn render_for_display(blocks: &[ContentBlock]) -> String {
    render(blocks, VideoMode::Embed)
}

fn render(blocks: &[ContentBlock], videos: VideoMode) -> String {
    let mut output = String::with_capacity(blocks.len() * CHARS_PER_BLOCK_ESTIMATE);
    for block in blocks {
        render_block(&mut output, block, videos);
    }
    log::debug!("Serialized {} blocks to {} bytes", blocks.len(), output.len());
    output
}

fn render_block(out: &mut String, block: &ContentBlock, videos: VideoMode) {
    // Writing into a String cannot fail.
    let _ = match block.kind {
        BlockType::Heading => {
            let level = block.heading_level();
            write!(out, "<h{level}>{}</h{level}>", block.content)
        }
        BlockType::Paragraph | BlockType::Unknown => write_paragraph(out, &block.content),
        BlockType::List => write_list(out, block),
        BlockType::Quote => write!(out, "<blockquote>{}</blockquote>", block.content),
        BlockType::Image => write_image(out, block),
        BlockType::Gallery => write_gallery(out, block),
        BlockType::Video => match videos {
            VideoMode::Placeholder => write!(
                out,
                r#"<div class="ql-video" data-video="{}"></div>"#,
                escape_attr(&block.content)
            ),
            VideoMode::Embed => out.write_str(&resolve_embed(&block.content).to_html()),
        },
        BlockType::Callout => {
            let kind = block.callout_type().as_str();
            write!(
                out,
                r#"<div class="ql-callout callout-{kind}" data-callout-type="{kind}">{}</div>"#,
                block.content
            )
        }
        BlockType::Code => write_code(out, block),
        BlockType::Divider => out.write_str("<hr>"),
        BlockType::Spacer => {
            let height = block.spacer_height();
            write!(
                out,
                r#"<div class="ql-spacer" data-spacer-height="{}" style="height: {};"></div>"#,
                height.as_str(),
                height.css_height()
            )
        }
        BlockType::Accordion => write_accordion(out, block),
    };
}

fn write_paragraph(out: &mut String, content: &str) -> std::fmt::Result {
    if content.is_empty() {
        // keeps an empty line visible in the editing surface
        out.write_str("<p><br></p>")
    } else {
        write!(out, "<p>{}</p>", content)
    }
}

fn write_list(out: &mut String, block: &ContentBlock) -> std::fmt::Result {
    let tag = match block.list_type() {
        ListType::Number => "ol",
        ListType::Bullet => "ul",
    };
    write!(out, "<{tag}>")?;
    for line in block.content.lines().map(str::trim).filter(|l| !l.is_empty()) {
        write!(out, "<li>{}</li>", line)?;
    }
    write!(out, "</{tag}>")
}

fn write_image(out: &mut String, block: &ContentBlock) -> std::fmt::Result {
    let align = block.align();
    let size = block.size();
    let (align_class, figure_css) = figure_style(align);

    out.write_str("<figure class=\"")?;
    out.write_str(IMAGE_CLASS)?;
    if let Some(class) = align_class {
        write!(out, " {}", class)?;
    }
    out.write_char('"')?;
    if let Some(align) = align {
        write!(out, r#" data-align="{}""#, align.as_str())?;
    }
    if let Some(size) = size {
        write!(out, r#" data-size="{}""#, size.as_str())?;
    }
    write!(
        out,
        r#" style="{}"><img src="{}" alt="{}" style="{}">"#,
        figure_css,
        escape_attr(&block.content),
        escape_attr(block.alt().unwrap_or_default()),
        image_size_style(size)
    )?;
    if let Some(caption) = block.caption() {
        write!(out, "<figcaption>{}</figcaption>", escape_text(caption))?;
    }
    out.write_str("</figure>")
}

fn write_gallery(out: &mut String, block: &ContentBlock) -> std::fmt::Result {
    let style = block.gallery_style();
    write!(
        out,
        r#"<div class="ql-gallery" data-gallery-type="{}" style="{}">"#,
        style.as_str(),
        gallery_layout(style)
    )?;
    for image in block.gallery_images() {
        write_gallery_image(out, image)?;
    }
    out.write_str("</div>")
}

fn write_gallery_image(out: &mut String, image: &GalleryImage) -> std::fmt::Result {
    write!(
        out,
        r#"<figure><img src="{}" alt="{}">"#,
        escape_attr(&image.url),
        escape_attr(image.alt.as_deref().unwrap_or_default())
    )?;
    if let Some(caption) = image.caption.as_deref().filter(|c| !c.trim().is_empty()) {
        write!(out, "<figcaption>{}</figcaption>", escape_text(caption))?;
    }
    out.write_str("</figure>")
}

fn write_code(out: &mut String, block: &ContentBlock) -> std::fmt::Result {
    match block.language() {
        Some(language) => write!(
            out,
            r#"<pre class="ql-code language-{lang}" data-language="{lang}"><code>{}</code></pre>"#,
            escape_text(&block.content),
            lang = escape_attr(language)
        ),
        None => write!(
            out,
            r#"<pre class="ql-code"><code>{}</code></pre>"#,
            escape_text(&block.content)
        ),
    }
}

fn write_accordion(out: &mut String, block: &ContentBlock) -> std::fmt::Result {
    out.write_str(r#"<div class="ql-accordion" data-accordion="true">"#)?;
    for item in block.accordion_items() {
        write!(
            out,
            r#"<details data-item-id="{}"><summary>{}</summary><div class="accordion-content">{}</div></details>"#,
            escape_attr(item.id.as_str()),
            escape_text(&item.title),
            item.content
        )?;
    }
    out.write_str("</div>")
}
