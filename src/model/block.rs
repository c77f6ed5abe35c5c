use super::metadata::*;
use crate::types::BlockId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminant of a [`ContentBlock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    Paragraph,
    Heading,
    Image,
    Gallery,
    Quote,
    Callout,
    Video,
    List,
    Divider,
    Spacer,
    Accordion,
    Code,
    /// A type written by some other tool; rendered as a paragraph.
    #[serde(other)]
    Unknown,
}

impl BlockType {
    /// Every type an editor can insert.
    pub const ALL: [BlockType; 12] = [
        BlockType::Paragraph,
        BlockType::Heading,
        BlockType::Image,
        BlockType::Gallery,
        BlockType::Quote,
        BlockType::Callout,
        BlockType::Video,
        BlockType::List,
        BlockType::Divider,
        BlockType::Spacer,
        BlockType::Accordion,
        BlockType::Code,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Paragraph => "paragraph",
            Self::Heading => "heading",
            Self::Image => "image",
            Self::Gallery => "gallery",
            Self::Quote => "quote",
            Self::Callout => "callout",
            Self::Video => "video",
            Self::List => "list",
            Self::Divider => "divider",
            Self::Spacer => "spacer",
            Self::Accordion => "accordion",
            Self::Code => "code",
            Self::Unknown => "unknown",
        }
    }

    /// Types whose `content` is an HTML fragment.
    pub fn is_text(&self) -> bool {
        matches!(
            self,
            Self::Paragraph | Self::Heading | Self::Quote | Self::Callout | Self::List
        )
    }

    /// Types whose payload lives in metadata and whose `content` is empty.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            Self::Gallery | Self::Spacer | Self::Divider | Self::Accordion
        )
    }

    /// Types inserted through a dialog because they carry media or structure.
    pub fn needs_dialog(&self) -> bool {
        matches!(
            self,
            Self::Image | Self::Gallery | Self::Video | Self::Code | Self::Accordion | Self::Callout
        )
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of rich content. A document is an ordered `Vec<ContentBlock>`;
/// position in that vector is the only ordering signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(default = "BlockId::generate")]
    pub id: BlockId,
    #[serde(rename = "type")]
    pub kind: BlockType,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BlockMetadata>,
}

/// Options collected by the image insertion dialog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageOptions {
    pub alt: Option<String>,
    pub caption: Option<String>,
    pub align: Option<ImageAlign>,
    pub size: Option<ImageSize>,
}

impl ContentBlock {
    /// Creates a block with a fresh id.
    pub fn new(kind: BlockType, content: impl Into<String>) -> Self {
        Self {
            id: BlockId::generate(),
            kind,
            content: content.into(),
            metadata: None,
        }
    }

    /// Attaches metadata, dropping an empty bag.
    pub fn with_metadata(mut self, metadata: BlockMetadata) -> Self {
        self.metadata = if metadata.is_empty() {
            None
        } else {
            Some(metadata)
        };
        self
    }

    pub fn paragraph(html: impl Into<String>) -> Self {
        Self::new(BlockType::Paragraph, html)
    }

    pub fn heading(level: u8, html: impl Into<String>) -> Self {
        Self::new(BlockType::Heading, html).with_metadata(BlockMetadata {
            level: Some(level.clamp(1, 3)),
            ..Default::default()
        })
    }

    /// A list with one entry per item; items are stored newline separated.
    pub fn list<S: AsRef<str>>(list_type: ListType, items: &[S]) -> Self {
        let content = items
            .iter()
            .map(|item| item.as_ref().trim())
            .filter(|item| !item.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        Self::new(BlockType::List, content).with_metadata(BlockMetadata {
            list_type: Some(list_type),
            ..Default::default()
        })
    }

    pub fn quote(html: impl Into<String>) -> Self {
        Self::new(BlockType::Quote, html)
    }

    pub fn image(url: impl Into<String>, options: ImageOptions) -> Self {
        Self::new(BlockType::Image, url).with_metadata(BlockMetadata {
            alt: options.alt,
            caption: options.caption,
            align: options.align,
            size: options.size,
            ..Default::default()
        })
    }

    pub fn gallery(style: GalleryStyle, images: Vec<GalleryImage>) -> Self {
        Self::new(BlockType::Gallery, "").with_metadata(BlockMetadata {
            gallery_style: Some(style),
            images: Some(images),
            ..Default::default()
        })
    }

    pub fn video(url: impl Into<String>) -> Self {
        Self::new(BlockType::Video, url)
    }

    pub fn callout(callout_type: CalloutType, html: impl Into<String>) -> Self {
        Self::new(BlockType::Callout, html).with_metadata(BlockMetadata {
            callout_type: Some(callout_type),
            ..Default::default()
        })
    }

    /// `source` is the raw code text, not HTML.
    pub fn code(language: Option<String>, source: impl Into<String>) -> Self {
        Self::new(BlockType::Code, source).with_metadata(BlockMetadata {
            language: language.filter(|l| !l.trim().is_empty()),
            ..Default::default()
        })
    }

    pub fn divider() -> Self {
        Self::new(BlockType::Divider, "")
    }

    pub fn spacer(height: SpacerHeight) -> Self {
        Self::new(BlockType::Spacer, "").with_metadata(BlockMetadata {
            height: Some(height),
            ..Default::default()
        })
    }

    pub fn accordion(items: Vec<AccordionItem>) -> Self {
        Self::new(BlockType::Accordion, "").with_metadata(BlockMetadata {
            accordion_items: Some(items),
            ..Default::default()
        })
    }

    // --- metadata accessors with the defaults the renderers use ---

    fn meta(&self) -> Option<&BlockMetadata> {
        self.metadata.as_ref()
    }

    pub fn heading_level(&self) -> u8 {
        self.meta().and_then(|m| m.level).unwrap_or(2).clamp(1, 3)
    }

    pub fn list_type(&self) -> ListType {
        self.meta().and_then(|m| m.list_type).unwrap_or_default()
    }

    pub fn alt(&self) -> Option<&str> {
        self.meta().and_then(|m| m.alt.as_deref())
    }

    pub fn caption(&self) -> Option<&str> {
        self.meta()
            .and_then(|m| m.caption.as_deref())
            .filter(|c| !c.trim().is_empty())
    }

    pub fn align(&self) -> Option<ImageAlign> {
        self.meta().and_then(|m| m.align)
    }

    pub fn size(&self) -> Option<ImageSize> {
        self.meta().and_then(|m| m.size)
    }

    pub fn gallery_style(&self) -> GalleryStyle {
        self.meta().and_then(|m| m.gallery_style).unwrap_or_default()
    }

    pub fn gallery_images(&self) -> &[GalleryImage] {
        self.meta()
            .and_then(|m| m.images.as_deref())
            .unwrap_or_default()
    }

    pub fn callout_type(&self) -> CalloutType {
        self.meta().and_then(|m| m.callout_type).unwrap_or_default()
    }

    pub fn spacer_height(&self) -> SpacerHeight {
        self.meta().and_then(|m| m.height).unwrap_or_default()
    }

    pub fn accordion_items(&self) -> &[AccordionItem] {
        self.meta()
            .and_then(|m| m.accordion_items.as_deref())
            .unwrap_or_default()
    }

    pub fn language(&self) -> Option<&str> {
        self.meta().and_then(|m| m.language.as_deref())
    }

    /// Mutable metadata, creating an empty bag on first use.
    pub fn metadata_mut(&mut self) -> &mut BlockMetadata {
        self.metadata.get_or_insert_with(BlockMetadata::default)
    }

    /// Image URLs this block references (image, gallery).
    pub fn image_urls(&self) -> Vec<&str> {
        match self.kind {
            BlockType::Image if !self.content.is_empty() => vec![self.content.as_str()],
            BlockType::Gallery => self
                .gallery_images()
                .iter()
                .map(|image| image.url.as_str())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// True for a paragraph with no visible content.
    pub fn is_empty_paragraph(&self) -> bool {
        self.kind == BlockType::Paragraph && crate::html::is_blank_fragment(&self.content)
    }

    /// True for a paragraph, heading or quote with no visible content.
    pub fn is_blank_text(&self) -> bool {
        matches!(
            self.kind,
            BlockType::Paragraph | BlockType::Heading | BlockType::Quote
        ) && crate::html::is_blank_fragment(&self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn serializes_to_the_stored_shape() {
        let mut block = ContentBlock::heading(2, "Hi");
        block.id = BlockId::parse("b1").unwrap();
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "b1",
                "type": "heading",
                "content": "Hi",
                "metadata": {"level": 2}
            })
        );
    }

    #[test]
    fn unknown_types_deserialize_instead_of_failing() {
        let block: ContentBlock =
            serde_json::from_str(r#"{"id": "x", "type": "table", "content": "<p>t</p>"}"#)
                .unwrap();
        assert_eq!(block.kind, BlockType::Unknown);
        assert!(block.metadata.is_none());
    }

    #[test]
    fn missing_id_is_generated() {
        let block: ContentBlock =
            serde_json::from_str(r#"{"type": "divider", "content": ""}"#).unwrap();
        assert_eq!(block.kind, BlockType::Divider);
        assert_eq!(block.id.as_str().len(), 32);
    }

    #[test]
    fn constructors_clamp_and_clean() {
        assert_eq!(ContentBlock::heading(6, "x").heading_level(), 3);
        assert_eq!(ContentBlock::heading(0, "x").heading_level(), 1);
        let list = ContentBlock::list(ListType::Number, &["one", "  ", " two "]);
        assert_eq!(list.content, "one\ntwo");
        assert_eq!(list.list_type(), ListType::Number);
        assert_eq!(ContentBlock::code(Some(" ".into()), "x").language(), None);
        assert!(ContentBlock::divider().metadata.is_none());
    }

    #[test]
    fn accessors_default_sensibly() {
        let bare = ContentBlock::new(BlockType::Heading, "x");
        assert_eq!(bare.heading_level(), 2);
        assert_eq!(bare.list_type(), ListType::Bullet);
        assert_eq!(bare.gallery_style(), GalleryStyle::Grid);
        assert!(bare.gallery_images().is_empty());
    }

    #[test]
    fn image_urls_cover_images_and_galleries() {
        let gallery = ContentBlock::gallery(
            GalleryStyle::Grid,
            vec![GalleryImage::new("a.jpg"), GalleryImage::new("b.jpg")],
        );
        assert_eq!(gallery.image_urls(), vec!["a.jpg", "b.jpg"]);
        let image = ContentBlock::image("c.jpg", ImageOptions::default());
        assert_eq!(image.image_urls(), vec!["c.jpg"]);
        assert!(ContentBlock::paragraph("<img src=\"d.jpg\">")
            .image_urls()
            .is_empty());
    }
}
