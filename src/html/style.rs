//! Inline style vocabulary shared by the serializer and the parser.
//!
//! Without a layout engine only inline `style` attributes, classes and the
//! `width` attribute can be inspected; computed styles are out of reach.

use crate::constants::{IMAGE_LARGE_BELOW_PX, IMAGE_MEDIUM_BELOW_PX, IMAGE_SMALL_BELOW_PX};
use crate::model::{GalleryStyle, ImageAlign, ImageSize};

/// Class marking figures written by this crate's serializer.
pub const IMAGE_CLASS: &str = "ql-image";

/// Alignment class and wrapper style of an image figure.
///
/// `left`/`right` float and cap the figure at half the column, `center`
/// centers a block, `full` or no alignment stretch across the column.
pub fn figure_style(align: Option<ImageAlign>) -> (Option<String>, &'static str) {
    let class = align.map(|a| format!("ql-align-{}", a.as_str()));
    let style = match align {
        Some(ImageAlign::Left) => "float: left; max-width: 50%; margin: 0 1.5rem 1rem 0;",
        Some(ImageAlign::Right) => "float: right; max-width: 50%; margin: 0 0 1rem 1.5rem;",
        Some(ImageAlign::Center) => "display: block; margin: 1rem auto; text-align: center;",
        Some(ImageAlign::Full) | None => "width: 100%; margin: 1rem 0;",
    };
    (class, style)
}

/// Inline style of the `<img>` for a size.
pub fn image_size_style(size: Option<ImageSize>) -> &'static str {
    match size {
        Some(ImageSize::Small) => "max-width: 300px; width: 100%; height: auto;",
        Some(ImageSize::Medium) => "max-width: 600px; width: 100%; height: auto;",
        Some(ImageSize::Large) => "max-width: 900px; width: 100%; height: auto;",
        Some(ImageSize::Full) => "width: 100%; height: auto;",
        None => "max-width: 100%; height: auto;",
    }
}

/// CSS layout of a gallery container.
pub fn gallery_layout(style: GalleryStyle) -> &'static str {
    match style {
        GalleryStyle::Masonry => {
            "display: grid; grid-template-columns: repeat(auto-fill, minmax(200px, 1fr)); gap: 1rem;"
        }
        GalleryStyle::Carousel => {
            "display: flex; overflow-x: auto; scroll-snap-type: x mandatory; gap: 1rem;"
        }
        GalleryStyle::Grid => {
            "display: grid; grid-template-columns: repeat(auto-fit, minmax(250px, 1fr)); gap: 1rem;"
        }
    }
}

/// Looks up one property in an inline `style` attribute.
pub fn style_property<'a>(style: &'a str, property: &str) -> Option<&'a str> {
    style.split(';').find_map(|declaration| {
        let (name, value) = declaration.split_once(':')?;
        if name.trim().eq_ignore_ascii_case(property) {
            Some(value.trim().trim_end_matches("!important").trim())
        } else {
            None
        }
    })
}

/// Alignment named by a `ql-align-*` class.
pub fn align_from_classes(classes: &str) -> Option<ImageAlign> {
    classes
        .split_whitespace()
        .find_map(|class| class.strip_prefix("ql-align-"))
        .and_then(ImageAlign::parse)
}

/// Alignment implied by inline `text-align` or `float`.
pub fn align_from_style(style: &str) -> Option<ImageAlign> {
    if let Some(align) = style_property(style, "text-align").and_then(ImageAlign::parse) {
        return Some(align);
    }
    match style_property(style, "float") {
        Some(v) if v.eq_ignore_ascii_case("left") => Some(ImageAlign::Left),
        Some(v) if v.eq_ignore_ascii_case("right") => Some(ImageAlign::Right),
        _ => {
            let centered = style_property(style, "margin")
                .map(|m| m.contains("auto"))
                .unwrap_or(false)
                && style_property(style, "display") == Some("block");
            centered.then_some(ImageAlign::Center)
        }
    }
}

/// Size bucket from `max-width`, then `width`, in an inline style.
pub fn size_from_style(style: &str) -> Option<ImageSize> {
    style_property(style, "max-width")
        .and_then(size_from_length)
        .or_else(|| style_property(style, "width").and_then(size_from_length))
}

/// Buckets a CSS length: pixel values by threshold, `100%` as full.
pub fn size_from_length(length: &str) -> Option<ImageSize> {
    let length = length.trim();
    if let Some(percent) = length.strip_suffix('%') {
        let percent: f32 = percent.trim().parse().ok()?;
        return (percent >= 100.0).then_some(ImageSize::Full);
    }
    let px: f32 = length
        .strip_suffix("px")
        .unwrap_or(length)
        .trim()
        .parse()
        .ok()?;
    Some(bucket_width(px.round() as u32))
}

/// small (<400px), medium (<800px), large (<1200px), otherwise full.
pub fn bucket_width(px: u32) -> ImageSize {
    if px < IMAGE_SMALL_BELOW_PX {
        ImageSize::Small
    } else if px < IMAGE_MEDIUM_BELOW_PX {
        ImageSize::Medium
    } else if px < IMAGE_LARGE_BELOW_PX {
        ImageSize::Large
    } else {
        ImageSize::Full
    }
}
