//! Type-specific block attributes.
//!
//! Stored documents keep these in one optional bag per block, with camelCase
//! keys. Each field only has meaning for the block type that uses it.

use crate::types::AccordionItemId;
use serde::{Deserialize, Serialize};

/// Optional bag of type-specific attributes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockMetadata {
    /// heading: 1–3
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
    /// list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_type: Option<ListType>,
    /// image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<ImageAlign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<ImageSize>,
    /// gallery
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gallery_style: Option<GalleryStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<GalleryImage>>,
    /// callout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callout_type: Option<CalloutType>,
    /// spacer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<SpacerHeight>,
    /// accordion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accordion_items: Option<Vec<AccordionItem>>,
    /// code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl BlockMetadata {
    /// True when no attribute is set, so the bag can be omitted.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListType {
    #[default]
    Bullet,
    Number,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageAlign {
    Left,
    Center,
    Right,
    Full,
}

impl ImageAlign {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::Full => "full",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "left" => Some(Self::Left),
            "center" | "centre" => Some(Self::Center),
            "right" => Some(Self::Right),
            "full" | "justify" => Some(Self::Full),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSize {
    Small,
    Medium,
    Large,
    Full,
}

impl ImageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
            Self::Full => "full",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "small" => Some(Self::Small),
            "medium" => Some(Self::Medium),
            "large" => Some(Self::Large),
            "full" => Some(Self::Full),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GalleryStyle {
    #[default]
    Grid,
    Carousel,
    Masonry,
}

impl GalleryStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Grid => "grid",
            Self::Carousel => "carousel",
            Self::Masonry => "masonry",
        }
    }

    /// Unknown values fall back to the grid layout.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "carousel" => Self::Carousel,
            "masonry" => Self::Masonry,
            _ => Self::Grid,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalloutType {
    #[default]
    Info,
    Warning,
    Success,
    Error,
}

impl CalloutType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "warning" => Self::Warning,
            "success" => Self::Success,
            "error" => Self::Error,
            _ => Self::Info,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpacerHeight {
    Small,
    #[default]
    Medium,
    Large,
}

impl SpacerHeight {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "small" => Self::Small,
            "large" => Self::Large,
            _ => Self::Medium,
        }
    }

    /// CSS height of the rendered gap.
    pub fn css_height(&self) -> &'static str {
        match self {
            Self::Small => "1.5rem",
            Self::Medium => "3rem",
            Self::Large => "6rem",
        }
    }
}

/// One picture of a gallery block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryImage {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

impl GalleryImage {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            alt: None,
            caption: None,
        }
    }

    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = Some(alt.into());
        self
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }
}

/// One collapsible section of an accordion block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccordionItem {
    #[serde(default = "AccordionItemId::generate")]
    pub id: AccordionItemId,
    pub title: String,
    /// HTML fragment shown when expanded
    #[serde(default)]
    pub content: String,
}

impl AccordionItem {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: AccordionItemId::generate(),
            title: title.into(),
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_uses_camel_case_and_skips_unset_fields() {
        let meta = BlockMetadata {
            list_type: Some(ListType::Number),
            gallery_style: Some(GalleryStyle::Carousel),
            ..Default::default()
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"listType": "number", "galleryStyle": "carousel"})
        );
        assert!(BlockMetadata::default().is_empty());
    }

    #[test]
    fn lenient_parsers_fall_back() {
        assert_eq!(GalleryStyle::parse("slideshow"), GalleryStyle::Grid);
        assert_eq!(CalloutType::parse("WARNING"), CalloutType::Warning);
        assert_eq!(SpacerHeight::parse(""), SpacerHeight::Medium);
        assert_eq!(ImageAlign::parse("justify"), Some(ImageAlign::Full));
        assert_eq!(ImageSize::parse("huge"), None);
    }

    #[test]
    fn accordion_items_get_ids_when_missing() {
        let item: AccordionItem =
            serde_json::from_str(r#"{"title": "Q", "content": "<p>A</p>"}"#).unwrap();
        assert!(!item.id.as_str().is_empty());
    }
}
