//! Article and news records: the editor's form state and the payloads the
//! admin API accepts.

use super::ContentBlock;
use crate::analytics::read_time_minutes;
use crate::types::{FocalPoint, Slug, ValidationError};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which admin collection a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    #[default]
    Article,
    News,
}

impl RecordKind {
    /// Admin endpoint the record is posted to.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Article => "articles",
            Self::News => "news",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Article => f.write_str("article"),
            Self::News => f.write_str("news"),
        }
    }
}

/// Editor state of an article. Kept intact when a save fails.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticleForm {
    pub title: String,
    /// Empty means "derive from the title".
    pub slug: String,
    pub excerpt: String,
    pub content: Vec<ContentBlock>,
    pub category: Option<String>,
    pub cover_image: Option<String>,
    pub focal_point: FocalPoint,
    pub date: Option<NaiveDate>,
    pub tags: Vec<String>,
    pub published: bool,
}

/// Body of an article create/update request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticlePayload {
    pub title: String,
    pub slug: Slug,
    pub excerpt: String,
    pub content: Vec<ContentBlock>,
    pub category: Option<String>,
    pub cover_image: Option<String>,
    pub cover_image_focal_point: FocalPoint,
    /// `YYYY-MM-DD`
    pub date: String,
    pub read_time: u32,
    pub tags: Vec<String>,
    pub published: bool,
    /// RFC 3339
    pub updated_at: String,
}

/// Body of a news create/update request. News keeps HTML content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsPayload {
    pub title: String,
    pub slug: Slug,
    pub excerpt: String,
    pub content: String,
    pub category: Option<String>,
    pub cover_image: Option<String>,
    pub date: String,
    pub tags: Vec<String>,
    pub published: bool,
}

impl ArticleForm {
    /// Checks the fields a save requires: title, a usable slug and at least
    /// one block with content.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyField("title"));
        }
        self.resolved_slug()?;
        if self
            .content
            .iter()
            .all(|block| block.is_empty_paragraph() || is_blank_block(block))
        {
            return Err(ValidationError::EmptyField("content"));
        }
        Ok(())
    }

    /// The explicit slug when set, otherwise one derived from the title.
    pub fn resolved_slug(&self) -> Result<Slug, ValidationError> {
        let slug = self.slug.trim();
        if slug.is_empty() {
            Slug::from_title(&self.title)
        } else {
            Slug::new(slug)
        }
    }

    /// Builds the persistence payload, stamped with `now`.
    pub fn to_payload(&self, now: DateTime<Utc>) -> Result<ArticlePayload, ValidationError> {
        self.validate()?;
        Ok(ArticlePayload {
            title: self.title.trim().to_string(),
            slug: self.resolved_slug()?,
            excerpt: self.excerpt.trim().to_string(),
            content: self.content.clone(),
            category: non_blank(&self.category),
            cover_image: non_blank(&self.cover_image),
            cover_image_focal_point: self.focal_point,
            date: self
                .date
                .unwrap_or_else(|| now.date_naive())
                .format("%Y-%m-%d")
                .to_string(),
            read_time: read_time_minutes(&self.content),
            tags: clean_tags(&self.tags),
            published: self.published,
            updated_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        })
    }
}

fn is_blank_block(block: &ContentBlock) -> bool {
    block.kind.is_text() && crate::html::is_blank_fragment(&block.content)
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Trims, drops blanks and removes case-insensitive duplicates, keeping the
/// first spelling.
pub fn clean_tags(tags: &[String]) -> Vec<String> {
    let mut seen = indexmap::IndexSet::new();
    tags.iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty() && seen.insert(t.to_lowercase()))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 12, 30, 0).unwrap()
    }

    fn form() -> ArticleForm {
        ArticleForm {
            title: "Spring Show".into(),
            content: vec![ContentBlock::paragraph("Opening <b>Friday</b>")],
            tags: vec!["Art".into(), " art ".into(), "".into(), "Prints".into()],
            ..Default::default()
        }
    }

    #[test]
    fn payload_derives_slug_date_and_read_time() {
        let payload = form().to_payload(now()).unwrap();
        assert_eq!(payload.slug.as_str(), "spring-show");
        assert_eq!(payload.date, "2024-03-09");
        assert_eq!(payload.read_time, 1);
        assert_eq!(payload.tags, vec!["Art".to_string(), "Prints".to_string()]);
        assert_eq!(payload.updated_at, "2024-03-09T12:30:00.000Z");
        assert_eq!(payload.cover_image_focal_point, FocalPoint::default());
    }

    #[test]
    fn payload_serializes_with_snake_case_fields() {
        let json = serde_json::to_value(form().to_payload(now()).unwrap()).unwrap();
        for key in [
            "title",
            "slug",
            "excerpt",
            "content",
            "category",
            "cover_image",
            "cover_image_focal_point",
            "date",
            "read_time",
            "tags",
            "published",
            "updated_at",
        ] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(json["content"][0]["type"], "paragraph");
    }

    #[test]
    fn validation_reports_missing_fields() {
        let mut f = form();
        f.title = "  ".into();
        assert_eq!(f.validate(), Err(ValidationError::EmptyField("title")));

        let mut f = form();
        f.content = vec![ContentBlock::paragraph("<br>")];
        assert_eq!(f.validate(), Err(ValidationError::EmptyField("content")));

        let mut f = form();
        f.slug = "Bad Slug".into();
        assert!(matches!(
            f.validate(),
            Err(ValidationError::InvalidSlug { .. })
        ));
    }

    #[test]
    fn record_kinds_map_to_endpoints() {
        assert_eq!(RecordKind::Article.endpoint(), "articles");
        assert_eq!(RecordKind::News.endpoint(), "news");
    }
}
