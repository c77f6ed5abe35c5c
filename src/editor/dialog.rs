//! Insertion dialogs for blocks that carry media or structure.

use crate::error::AppError;
use crate::html::{resolve_embed, VideoEmbed};
use crate::model::{
    AccordionItem, BlockType, CalloutType, ContentBlock, GalleryImage, GalleryStyle, ImageOptions,
};

/// What the user filled in.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockDialog {
    Image {
        url: String,
        options: ImageOptions,
    },
    Gallery {
        style: GalleryStyle,
        images: Vec<GalleryImage>,
    },
    Video {
        url: String,
    },
    Code {
        language: Option<String>,
        source: String,
    },
    Accordion {
        items: Vec<AccordionItem>,
    },
    Callout {
        kind: CalloutType,
        content: String,
    },
}

impl BlockDialog {
    pub fn kind(&self) -> BlockType {
        match self {
            Self::Image { .. } => BlockType::Image,
            Self::Gallery { .. } => BlockType::Gallery,
            Self::Video { .. } => BlockType::Video,
            Self::Code { .. } => BlockType::Code,
            Self::Accordion { .. } => BlockType::Accordion,
            Self::Callout { .. } => BlockType::Callout,
        }
    }

    /// Validates the input and builds the block.
    pub fn into_block(self) -> Result<ContentBlock, AppError> {
        match self {
            Self::Image { url, options } => {
                let url = persistable_url(&url, "image")?;
                Ok(ContentBlock::image(url, options))
            }
            Self::Gallery { style, images } => {
                let images: Vec<GalleryImage> = images
                    .into_iter()
                    .filter(|image| !image.url.trim().is_empty())
                    .collect();
                if images.is_empty() {
                    return Err(AppError::Editor("a gallery needs at least one image".into()));
                }
                for image in &images {
                    persistable_url(&image.url, "gallery image")?;
                }
                Ok(ContentBlock::gallery(style, images))
            }
            Self::Video { url } => {
                let url = persistable_url(&url, "video")?;
                if let VideoEmbed::File { .. } = resolve_embed(url) {
                    if !(url.starts_with("http://") || url.starts_with("https://")) {
                        return Err(AppError::Editor(format!(
                            "video URL must be YouTube, Vimeo or an http(s) file: {}",
                            url
                        )));
                    }
                }
                Ok(ContentBlock::video(url))
            }
            Self::Code { language, source } => {
                if source.trim().is_empty() {
                    return Err(AppError::Editor("code block is empty".into()));
                }
                let language = language
                    .map(|l| l.trim().to_ascii_lowercase())
                    .filter(|l| !l.is_empty());
                Ok(ContentBlock::code(language, source))
            }
            Self::Accordion { items } => {
                let items: Vec<AccordionItem> = items
                    .into_iter()
                    .filter(|item| !item.title.trim().is_empty())
                    .collect();
                if items.is_empty() {
                    return Err(AppError::Editor("an accordion needs a titled item".into()));
                }
                Ok(ContentBlock::accordion(items))
            }
            Self::Callout { kind, content } => {
                if crate::html::is_blank_fragment(&content) {
                    return Err(AppError::Editor("callout text is empty".into()));
                }
                Ok(ContentBlock::callout(kind, content.trim()))
            }
        }
    }
}

fn persistable_url<'a>(url: &'a str, what: &str) -> Result<&'a str, AppError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(AppError::Editor(format!("{} URL is empty", what)));
    }
    if url.starts_with("data:") || url.starts_with("blob:") {
        return Err(AppError::Editor(format!(
            "{} must be uploaded before it is inserted",
            what
        )));
    }
    Ok(url)
}
