//! Toolbar presets: which blocks and inline formats an editing surface offers.

use crate::model::BlockType;
use std::fmt;
use std::str::FromStr;

/// Inline formats applied inside text blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InlineFormat {
    Bold,
    Italic,
    Underline,
    Strike,
    Link,
    InlineCode,
}

/// The editing surfaces of the admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ToolbarPreset {
    #[default]
    Article,
    News,
    Portfolio,
    Project,
    Simple,
}

impl ToolbarPreset {
    pub const ALL: [ToolbarPreset; 5] = [
        Self::Article,
        Self::News,
        Self::Portfolio,
        Self::Project,
        Self::Simple,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::News => "news",
            Self::Portfolio => "portfolio",
            Self::Project => "project",
            Self::Simple => "simple",
        }
    }
}

impl fmt::Display for ToolbarPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolbarPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "unknown toolbar '{}', expected one of: article, news, portfolio, project, simple",
                    s
                )
            })
    }
}

const TEXT_BLOCKS: &[BlockType] = &[
    BlockType::Paragraph,
    BlockType::Heading,
    BlockType::List,
    BlockType::Quote,
];

const NEWS_BLOCKS: &[BlockType] = &[
    BlockType::Paragraph,
    BlockType::Heading,
    BlockType::List,
    BlockType::Quote,
    BlockType::Image,
    BlockType::Gallery,
    BlockType::Video,
    BlockType::Divider,
];

const PORTFOLIO_BLOCKS: &[BlockType] = &[
    BlockType::Paragraph,
    BlockType::Heading,
    BlockType::List,
    BlockType::Quote,
    BlockType::Image,
    BlockType::Gallery,
    BlockType::Video,
    BlockType::Divider,
    BlockType::Spacer,
];

const PROJECT_BLOCKS: &[BlockType] = &[
    BlockType::Paragraph,
    BlockType::Heading,
    BlockType::List,
    BlockType::Quote,
    BlockType::Image,
    BlockType::Gallery,
    BlockType::Video,
    BlockType::Callout,
    BlockType::Divider,
    BlockType::Spacer,
    BlockType::Accordion,
];

const ALL_FORMATS: &[InlineFormat] = &[
    InlineFormat::Bold,
    InlineFormat::Italic,
    InlineFormat::Underline,
    InlineFormat::Strike,
    InlineFormat::Link,
    InlineFormat::InlineCode,
];

const BASIC_FORMATS: &[InlineFormat] = &[
    InlineFormat::Bold,
    InlineFormat::Italic,
    InlineFormat::Link,
];

/// What one editing surface offers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolbar {
    name: String,
    blocks: Vec<BlockType>,
    formats: Vec<InlineFormat>,
}

impl Toolbar {
    pub fn preset(preset: ToolbarPreset) -> Self {
        let (blocks, formats): (&[BlockType], &[InlineFormat]) = match preset {
            ToolbarPreset::Article => (&BlockType::ALL, ALL_FORMATS),
            ToolbarPreset::News => (NEWS_BLOCKS, ALL_FORMATS),
            ToolbarPreset::Portfolio => (PORTFOLIO_BLOCKS, BASIC_FORMATS),
            ToolbarPreset::Project => (PROJECT_BLOCKS, ALL_FORMATS),
            ToolbarPreset::Simple => (TEXT_BLOCKS, BASIC_FORMATS),
        };
        Self {
            name: preset.as_str().to_string(),
            blocks: blocks.to_vec(),
            formats: formats.to_vec(),
        }
    }

    /// A toolbar with an explicit block set. Paragraphs are always offered.
    pub fn custom(
        name: impl Into<String>,
        blocks: impl IntoIterator<Item = BlockType>,
        formats: impl IntoIterator<Item = InlineFormat>,
    ) -> Self {
        let mut set = vec![BlockType::Paragraph];
        for kind in blocks {
            if kind != BlockType::Unknown && !set.contains(&kind) {
                set.push(kind);
            }
        }
        Self {
            name: name.into(),
            blocks: set,
            formats: formats.into_iter().collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn blocks(&self) -> &[BlockType] {
        &self.blocks
    }

    pub fn formats(&self) -> &[InlineFormat] {
        &self.formats
    }

    pub fn allows(&self, kind: BlockType) -> bool {
        self.blocks.contains(&kind)
    }

    pub fn allows_format(&self, format: InlineFormat) -> bool {
        self.formats.contains(&format)
    }

    /// Block types that open an insertion dialog in this toolbar.
    pub fn dialog_blocks(&self) -> impl Iterator<Item = BlockType> + '_ {
        self.blocks.iter().copied().filter(BlockType::needs_dialog)
    }
}

impl Default for Toolbar {
    fn default() -> Self {
        Self::preset(ToolbarPreset::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_preset_offers_text_blocks() {
        for preset in ToolbarPreset::ALL {
            let toolbar = Toolbar::preset(preset);
            for kind in TEXT_BLOCKS {
                assert!(toolbar.allows(*kind), "{} lacks {}", preset, kind);
            }
            assert!(!toolbar.allows(BlockType::Unknown));
        }
    }

    #[test]
    fn presets_differ_in_media() {
        assert!(Toolbar::preset(ToolbarPreset::Article).allows(BlockType::Code));
        assert!(!Toolbar::preset(ToolbarPreset::News).allows(BlockType::Accordion));
        assert!(Toolbar::preset(ToolbarPreset::Project).allows(BlockType::Accordion));
        assert_eq!(Toolbar::preset(ToolbarPreset::Simple).dialog_blocks().count(), 0);
        assert!(!Toolbar::preset(ToolbarPreset::Portfolio).allows_format(InlineFormat::Strike));
    }

    #[test]
    fn presets_parse_from_names() {
        assert_eq!("News".parse::<ToolbarPreset>(), Ok(ToolbarPreset::News));
        assert!("blog".parse::<ToolbarPreset>().is_err());
    }

    #[test]
    fn custom_toolbars_always_have_paragraphs() {
        let toolbar = Toolbar::custom("captions", [BlockType::Quote, BlockType::Unknown], []);
        assert_eq!(toolbar.blocks(), &[BlockType::Paragraph, BlockType::Quote]);
    }
}
