// src/analytics/mod.rs
//! Content measurement for block documents: plain text, word counts, read
//! time and per-type breakdowns.

use crate::constants::WORDS_PER_MINUTE;
use crate::html::strip_tags;
use crate::model::{BlockType, ContentBlock};
use indexmap::IndexMap;

/// Quick statistics for user-facing progress messages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentSummary {
    pub blocks: usize,
    pub words: usize,
    pub images: usize,
    pub read_time_minutes: u32,
}

/// Detailed content breakdown for diagnostics and logging.
///
/// Types appear in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentMeasurement {
    pub summary: ContentSummary,
    pub by_type: IndexMap<BlockType, usize>,
    pub empty_paragraphs: usize,
}

/// Measures basic statistics for a document.
pub fn measure_content(blocks: &[ContentBlock]) -> ContentSummary {
    let words = word_count(blocks);
    ContentSummary {
        blocks: blocks.len(),
        words,
        images: blocks.iter().map(|b| b.image_urls().len()).sum(),
        read_time_minutes: minutes_for_words(words),
    }
}

/// Measures detailed metrics for a document.
pub fn measure_content_detailed(blocks: &[ContentBlock]) -> ContentMeasurement {
    let mut by_type = IndexMap::new();
    for block in blocks {
        *by_type.entry(block.kind).or_insert(0) += 1;
    }
    ContentMeasurement {
        summary: measure_content(blocks),
        by_type,
        empty_paragraphs: blocks.iter().filter(|b| b.is_empty_paragraph()).count(),
    }
}

/// Readable text of one block. Media blocks contribute captions and alt text.
pub fn block_text(block: &ContentBlock) -> String {
    match block.kind {
        BlockType::Code => block.content.clone(),
        BlockType::Image => [block.alt(), block.caption()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" "),
        BlockType::Gallery => block
            .gallery_images()
            .iter()
            .filter_map(|image| image.caption.as_deref())
            .collect::<Vec<_>>()
            .join(" "),
        BlockType::Accordion => block
            .accordion_items()
            .iter()
            .map(|item| format!("{} {}", item.title, strip_tags(&item.content)))
            .collect::<Vec<_>>()
            .join(" "),
        BlockType::Video | BlockType::Divider | BlockType::Spacer => String::new(),
        _ => strip_tags(&block.content),
    }
}

/// Plain text of a whole document, one block per line.
pub fn plain_text(blocks: &[ContentBlock]) -> String {
    blocks
        .iter()
        .map(block_text)
        .filter(|text| !text.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn word_count(blocks: &[ContentBlock]) -> usize {
    blocks
        .iter()
        .map(|b| block_text(b).split_whitespace().count())
        .sum()
}

/// Minutes to read at a fixed pace, never less than one.
pub fn read_time_minutes(blocks: &[ContentBlock]) -> u32 {
    minutes_for_words(word_count(blocks))
}

fn minutes_for_words(words: usize) -> u32 {
    let minutes = words.div_ceil(WORDS_PER_MINUTE);
    u32::try_from(minutes).unwrap_or(u32::MAX).max(1)
}

/// First `max_chars` characters of the document text, cut at a word
/// boundary where possible.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.chars().count() <= max_chars {
        return text;
    }
    let cut: String = text.chars().take(max_chars).collect();
    match cut.rfind(' ') {
        Some(space) if space > max_chars / 2 => format!("{}…", cut[..space].trim_end()),
        _ => format!("{}…", cut.trim_end()),
    }
}
