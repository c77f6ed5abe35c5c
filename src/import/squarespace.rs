//! Squarespace (WordPress WXR flavoured RSS) export parsing.
//!
//! Only blog posts survive: pages, attachments and gallery items in the same
//! export are dropped.

use crate::analytics::excerpt;
use crate::constants::IMPORT_EXCERPT_CHARS;
use crate::error::AppError;
use crate::html::{decode_entities, strip_tags};
use crate::model::clean_tags;
use crate::types::slugify;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use indexmap::IndexSet;
use once_cell::sync::Lazy;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;

static BLOG_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/(blog|news|journal)/|/\d{4}/\d{1,2}/\d{1,2}/").expect("valid blog link regex")
});

static IMG_SRC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<img\b[^>]*?\bsrc\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid img regex")
});

/// A blog post read from an export.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedPost {
    pub title: String,
    pub slug: String,
    pub link: String,
    pub date: Option<NaiveDate>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    /// Post body as exported
    pub content: String,
    pub excerpt: String,
    /// Image URLs in `content`, first occurrence order
    pub images: Vec<String>,
}

#[derive(Debug, Default)]
struct RawItem {
    title: String,
    link: String,
    pub_date: String,
    post_date: String,
    post_type: Option<String>,
    post_name: String,
    content: String,
    description: String,
    excerpt: String,
    categories: Vec<(String, String)>,
}

impl RawItem {
    fn set(&mut self, field: &[u8], domain: Option<String>, text: String) {
        match field {
            b"title" => self.title = text,
            b"link" => self.link = text,
            b"pubDate" => self.pub_date = text,
            b"wp:post_date" => self.post_date = text,
            b"wp:post_type" => self.post_type = Some(text),
            b"wp:post_name" => self.post_name = text,
            b"content:encoded" => self.content = text,
            b"description" => self.description = text,
            b"excerpt:encoded" => self.excerpt = text,
            b"category" => self
                .categories
                .push((domain.unwrap_or_else(|| "category".to_string()), text)),
            _ => {}
        }
    }

    fn is_blog_post(&self) -> bool {
        match self.post_type.as_deref().map(str::trim) {
            Some(kind) if !kind.is_empty() => kind == "post",
            _ => is_blog_link(&self.link),
        }
    }

    fn into_post(self) -> ImportedPost {
        let title = decode_entities(self.title.trim());
        let title = if title.is_empty() {
            "Untitled post".to_string()
        } else {
            title
        };

        let content = if self.content.trim().is_empty() {
            self.description
        } else {
            self.content
        };

        let slug = Some(slugify(&self.post_name))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| slugify(&title));

        let summary = strip_tags(&self.excerpt);
        let summary = if summary.is_empty() {
            excerpt(&strip_tags(&content), IMPORT_EXCERPT_CHARS)
        } else {
            summary
        };

        let mut category = None;
        let mut tags = Vec::new();
        for (domain, name) in self.categories {
            if name.trim().is_empty() {
                continue;
            }
            let name = decode_entities(name.trim());
            if category.is_none() && domain == "category" {
                category = Some(name);
            } else {
                tags.push(name);
            }
        }

        ImportedPost {
            date: parse_post_date(&self.pub_date, &self.post_date),
            images: extract_images(&content),
            title,
            slug,
            link: self.link.trim().to_string(),
            category,
            tags: clean_tags(&tags),
            content,
            excerpt: summary,
        }
    }
}

/// Parses an export and returns its blog posts in file order.
///
/// Fails only when the file is not well-formed XML or has no `<channel>`.
pub fn parse_export(xml: &str) -> Result<Vec<ImportedPost>, AppError> {
    let mut reader = Reader::from_reader(xml.as_bytes());

    let mut saw_channel = false;
    let mut item: Option<RawItem> = None;
    let mut field: Option<(Vec<u8>, Option<String>)> = None;
    let mut text = String::new();
    let mut items = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = e.name().as_ref().to_vec();
                match name.as_slice() {
                    b"channel" => saw_channel = true,
                    b"item" => item = Some(RawItem::default()),
                    _ if item.is_some() && field.is_none() => {
                        let domain = if name == b"category" {
                            attribute(&e, b"domain")
                        } else {
                            None
                        };
                        field = Some((name, domain));
                        text.clear();
                    }
                    _ => {}
                }
            }
            Event::Text(e) if field.is_some() => match e.unescape() {
                Ok(decoded) => text.push_str(&decoded),
                Err(_) => text.push_str(&String::from_utf8_lossy(&e)),
            },
            Event::CData(e) if field.is_some() => {
                text.push_str(&String::from_utf8_lossy(&e));
            }
            Event::End(e) => {
                let name = e.name();
                if name.as_ref() == b"item" {
                    field = None;
                    items.extend(item.take());
                } else if field.as_ref().map(|(f, _)| f.as_slice()) == Some(name.as_ref()) {
                    if let (Some((field_name, domain)), Some(current)) = (field.take(), item.as_mut()) {
                        current.set(&field_name, domain, text.trim().to_string());
                    }
                    text.clear();
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_channel {
        return Err(AppError::ImportParse(
            "no <channel> element, this does not look like an RSS export".to_string(),
        ));
    }

    let total = items.len();
    let posts: Vec<ImportedPost> = items
        .into_iter()
        .filter(RawItem::is_blog_post)
        .map(RawItem::into_post)
        .collect();
    log::info!("Export has {} items, {} blog posts", total, posts.len());
    Ok(posts)
}

fn attribute(element: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

/// Whether a permalink looks like a blog post URL.
pub fn is_blog_link(link: &str) -> bool {
    BLOG_LINK.is_match(link)
}

/// `<img src>` URLs in `html`, deduplicated in order, `data:` URIs skipped.
pub fn extract_images(html: &str) -> Vec<String> {
    let urls: IndexSet<String> = IMG_SRC
        .captures_iter(html)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| decode_entities(m.as_str().trim()))
        .filter(|src| !src.is_empty() && !src.starts_with("data:"))
        .collect();
    urls.into_iter().collect()
}

/// `pubDate` as RFC 2822, else `wp:post_date` (`YYYY-MM-DD HH:MM:SS`).
fn parse_post_date(pub_date: &str, post_date: &str) -> Option<NaiveDate> {
    if let Ok(date) = DateTime::parse_from_rfc2822(pub_date.trim()) {
        return Some(date.date_naive());
    }
    let post_date = post_date.trim();
    if let Ok(datetime) = NaiveDateTime::parse_from_str(post_date, "%Y-%m-%d %H:%M:%S") {
        return Some(datetime.date());
    }
    NaiveDate::parse_from_str(post_date.get(..10)?, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const EXPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/"
     xmlns:excerpt="http://wordpress.org/export/1.2/excerpt/"
     xmlns:wp="http://wordpress.org/export/1.2/">
<channel>
  <title>Studio</title>
  <item>
    <title>About</title>
    <link>/about</link>
    <wp:post_type>page</wp:post_type>
    <content:encoded><![CDATA[<p>We make things.</p>]]></content:encoded>
  </item>
  <item>
    <title>Spring &amp; Summer</title>
    <link>https://studio.example/2023/5/1/spring-summer</link>
    <pubDate>Mon, 01 May 2023 09:30:00 +0000</pubDate>
    <category domain="category"><![CDATA[Exhibitions]]></category>
    <category domain="post_tag"><![CDATA[paint]]></category>
    <category domain="post_tag"><![CDATA[Paint]]></category>
    <content:encoded><![CDATA[<p>Opening night.</p><img src="https://img.example/a.jpg"><img src="data:image/png;base64,AAA"><p><img src='https://img.example/b.jpg'></p><img src="https://img.example/a.jpg">]]></content:encoded>
  </item>
  <item>
    <title>Journal entry</title>
    <link>/journal/entry</link>
    <wp:post_date>2022-11-30 18:00:00</wp:post_date>
    <wp:post_name>first-entry</wp:post_name>
    <description>&lt;p&gt;Plain description body.&lt;/p&gt;</description>
  </item>
</channel>
</rss>"#;

    #[test]
    fn keeps_only_blog_posts() {
        let posts = parse_export(EXPORT).unwrap();
        let titles: Vec<_> = posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Spring & Summer", "Journal entry"]);
    }

    #[test]
    fn extracts_fields() {
        let posts = parse_export(EXPORT).unwrap();
        let post = &posts[0];
        assert_eq!(post.slug, "spring-summer");
        assert_eq!(post.date, NaiveDate::from_ymd_opt(2023, 5, 1));
        assert_eq!(post.category.as_deref(), Some("Exhibitions"));
        assert_eq!(post.tags, vec!["paint".to_string()]);
        assert_eq!(
            post.images,
            vec!["https://img.example/a.jpg", "https://img.example/b.jpg"]
        );
        assert_eq!(post.excerpt, "Opening night.");

        let entry = &posts[1];
        assert_eq!(entry.slug, "first-entry");
        assert_eq!(entry.date, NaiveDate::from_ymd_opt(2022, 11, 30));
        assert_eq!(entry.content, "<p>Plain description body.</p>");
        assert_eq!(entry.excerpt, "Plain description body.");
    }

    #[test]
    fn blog_links() {
        assert!(is_blog_link("/2023/5/1/my-post"));
        assert!(is_blog_link("https://x.example/blog/hello"));
        assert!(is_blog_link("/news/launch"));
        assert!(!is_blog_link("/about"));
        assert!(!is_blog_link("/shop/2023"));
    }

    #[test]
    fn rejects_non_rss_documents() {
        assert!(matches!(
            parse_export("<html><body/></html>"),
            Err(AppError::ImportParse(_))
        ));
        assert!(parse_export("<rss><channel></item></channel></rss>").is_err());
    }
}
