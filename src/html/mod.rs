//! Block ↔ HTML conversion.
//!
//! The serializer is a pure function over `&[ContentBlock]`; the parser walks
//! an html5ever DOM. Alignment and size survive the round trip through
//! `data-*` attributes; inline styles and `ql-align-*` classes are only a
//! fallback for HTML written elsewhere.

pub mod embed;
pub mod parser;
pub mod serializer;
mod style;

pub use embed::{resolve_embed, VideoEmbed};
pub use parser::parse_html;
pub use serializer::{render_for_display, serialize_blocks};

use once_cell::sync::Lazy;
use regex::Regex;

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag regex"));

static MEDIA_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<\s*(img|iframe|video|hr|embed|object)\b").expect("valid media regex")
});

/// Escapes text for use between tags.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escapes text for use inside a double-quoted attribute.
pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Reverses the handful of entities the editor produces.
pub fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", "\u{a0}")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}

/// Removes tags from an HTML fragment and decodes common entities.
pub fn strip_tags(html: &str) -> String {
    decode_entities(&TAG.replace_all(html, " "))
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// True when a fragment has neither visible text nor embedded media.
///
/// `""`, `"<br>"` and `"&nbsp;"` are all blank.
pub fn is_blank_fragment(html: &str) -> bool {
    if MEDIA_TAG.is_match(html) {
        return false;
    }
    strip_tags(html)
        .chars()
        .all(|c| c.is_whitespace() || c == '\u{a0}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escaping() {
        assert_eq!(escape_text("a < b & c"), "a &lt; b &amp; c");
        assert_eq!(escape_attr(r#"say "hi""#), "say &quot;hi&quot;");
    }

    #[test]
    fn strip_tags_collapses_whitespace() {
        assert_eq!(
            strip_tags("<p>Hello <strong>big</strong>\n world</p><p>&amp; more</p>"),
            "Hello big world & more"
        );
    }

    #[test]
    fn blank_fragments() {
        assert!(is_blank_fragment(""));
        assert!(is_blank_fragment("<br>"));
        assert!(is_blank_fragment(" &nbsp; "));
        assert!(!is_blank_fragment("<img src=\"a.png\">"));
        assert!(!is_blank_fragment("x"));
    }
}
