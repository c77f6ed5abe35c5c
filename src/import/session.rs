//! Review and sequential import of parsed posts.

use super::ImportedPost;
use crate::api::{AdminApi, ImageFetcher};
use crate::constants::STATUS_ERROR_PREVIEW_CHARS;
use crate::error::{truncate_message, AppError};
use crate::html::{escape_attr, parse_html};
use crate::model::{ArticleForm, NewsPayload, RecordKind};
use crate::types::{RecordId, Slug};
use crate::upload::{content_type_for_name, ImageUploader, UploadFile};
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum RowStatus {
    Pending,
    Processing,
    Success(RecordId),
    /// Shortened for display
    Error(String),
}

impl fmt::Display for RowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Processing => write!(f, "processing"),
            Self::Success(_) => write!(f, "success"),
            Self::Error(_) => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportRow {
    pub post: ImportedPost,
    pub selected: bool,
    pub status: RowStatus,
}

/// Parsed posts awaiting review. Every post starts selected.
#[derive(Debug, Clone)]
pub struct ImportSession {
    rows: Vec<ImportRow>,
    target: RecordKind,
}

impl ImportSession {
    pub fn new(posts: Vec<ImportedPost>, target: RecordKind) -> Self {
        let rows = posts
            .into_iter()
            .map(|post| ImportRow {
                post,
                selected: true,
                status: RowStatus::Pending,
            })
            .collect();
        Self { rows, target }
    }

    pub fn rows(&self) -> &[ImportRow] {
        &self.rows
    }

    pub fn target(&self) -> RecordKind {
        self.target
    }

    pub fn select(&mut self, index: usize) {
        if let Some(row) = self.rows.get_mut(index) {
            row.selected = true;
        }
    }

    pub fn deselect(&mut self, index: usize) {
        if let Some(row) = self.rows.get_mut(index) {
            row.selected = false;
        }
    }

    pub fn toggle(&mut self, index: usize) {
        if let Some(row) = self.rows.get_mut(index) {
            row.selected = !row.selected;
        }
    }

    pub fn set_all(&mut self, selected: bool) {
        for row in &mut self.rows {
            row.selected = selected;
        }
    }

    pub fn selected_count(&self) -> usize {
        self.rows.iter().filter(|r| r.selected).count()
    }
}

/// Counts from one import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} imported, {} failed, {} skipped",
            self.imported, self.failed, self.skipped
        )
    }
}

/// Moves selected posts into the admin as drafts, one at a time.
pub struct Importer {
    fetcher: Arc<dyn ImageFetcher>,
    uploader: Arc<dyn ImageUploader>,
    admin: Arc<dyn AdminApi>,
    folder: String,
}

impl Importer {
    pub fn new(
        fetcher: Arc<dyn ImageFetcher>,
        uploader: Arc<dyn ImageUploader>,
        admin: Arc<dyn AdminApi>,
        folder: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            uploader,
            admin,
            folder: folder.into(),
        }
    }

    /// Imports every selected row. A failing post is marked and the run
    /// continues with the next one.
    pub async fn run(&self, session: &mut ImportSession, now: DateTime<Utc>) -> ImportSummary {
        let mut summary = ImportSummary::default();
        let target = session.target;

        for row in &mut session.rows {
            if !row.selected {
                summary.skipped += 1;
                continue;
            }

            row.status = RowStatus::Processing;
            match self.import_post(&row.post, target, now).await {
                Ok(id) => {
                    summary.imported += 1;
                    row.status = RowStatus::Success(id);
                }
                Err(e) => {
                    log::error!("Import of '{}' failed: {}", row.post.title, e);
                    summary.failed += 1;
                    row.status = RowStatus::Error(truncate_message(
                        &e.to_string(),
                        STATUS_ERROR_PREVIEW_CHARS,
                    ));
                }
            }
        }

        log::info!("Import finished: {}", summary);
        summary
    }

    /// Re-hosts the post's images and creates an unpublished record.
    pub async fn import_post(
        &self,
        post: &ImportedPost,
        target: RecordKind,
        now: DateTime<Utc>,
    ) -> Result<RecordId, AppError> {
        let mut html = post.content.clone();
        let mut cover_image = None;

        for url in &post.images {
            match self.rehost(url).await {
                Ok(new_url) => {
                    html = replace_url(&html, url, &new_url);
                    cover_image.get_or_insert(new_url);
                }
                Err(e) => log::warn!("Keeping original image {}: {}", url, e),
            }
        }

        let payload = match target {
            RecordKind::Article => {
                let form = ArticleForm {
                    title: post.title.clone(),
                    slug: post.slug.clone(),
                    excerpt: post.excerpt.clone(),
                    content: parse_html(&html),
                    category: post.category.clone(),
                    cover_image,
                    date: post.date,
                    tags: post.tags.clone(),
                    published: false,
                    ..ArticleForm::default()
                };
                serde_json::to_value(form.to_payload(now)?)?
            }
            RecordKind::News => {
                let slug = Slug::new(post.slug.as_str()).or_else(|_| Slug::from_title(&post.title))?;
                serde_json::to_value(NewsPayload {
                    title: post.title.clone(),
                    slug,
                    excerpt: post.excerpt.clone(),
                    content: html,
                    category: post.category.clone(),
                    cover_image,
                    date: post
                        .date
                        .unwrap_or_else(|| now.date_naive())
                        .format("%Y-%m-%d")
                        .to_string(),
                    tags: post.tags.clone(),
                    published: false,
                })?
            }
        };

        self.admin.create_record(target, &payload).await
    }

    async fn rehost(&self, url: &str) -> Result<String, AppError> {
        let fetched = self.fetcher.fetch_image(url).await?;
        let name = file_name_from_url(url);
        let content_type = fetched
            .content_type
            .filter(|ct| ct.starts_with("image/"))
            .unwrap_or_else(|| content_type_for_name(&name).to_string());
        let file = UploadFile::new(name, content_type, fetched.bytes);
        self.uploader.upload(&file, &self.folder).await
    }
}

/// Replaces `old` in both its raw and attribute-escaped spellings.
fn replace_url(html: &str, old: &str, new: &str) -> String {
    let replaced = html.replace(old, new);
    let escaped = escape_attr(old);
    if escaped == old {
        replaced
    } else {
        replaced.replace(&escaped, &escape_attr(new))
    }
}

fn file_name_from_url(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "image".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{FetchedImage, NewsRecord, Suggestion, SuggestionKind, SuggestionRequest};
    use crate::error::ServiceErrorCode;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    struct Fetcher;

    #[async_trait::async_trait]
    impl ImageFetcher for Fetcher {
        async fn fetch_image(&self, url: &str) -> Result<FetchedImage, AppError> {
            if url.contains("gone") {
                return Err(AppError::Storage {
                    code: ServiceErrorCode::NotFound,
                    message: "404".into(),
                });
            }
            Ok(FetchedImage {
                bytes: b"<svg/>".to_vec(),
                content_type: Some("image/svg+xml".into()),
            })
        }
    }

    struct Uploader;

    #[async_trait::async_trait]
    impl ImageUploader for Uploader {
        async fn upload(&self, file: &UploadFile, folder: &str) -> Result<String, AppError> {
            Ok(format!("https://cdn.test/{}/{}", folder, file.name))
        }
    }

    #[derive(Default)]
    struct Admin {
        created: Mutex<Vec<(RecordKind, Value)>>,
    }

    #[async_trait::async_trait]
    impl AdminApi for Admin {
        async fn list_news(&self) -> Result<Vec<NewsRecord>, AppError> {
            Ok(Vec::new())
        }

        async fn create_record(&self, kind: RecordKind, payload: &Value) -> Result<RecordId, AppError> {
            if payload["title"] == "Broken" {
                return Err(AppError::AdminService {
                    code: ServiceErrorCode::ValidationFailed,
                    message: "slug already exists for another record in this collection".into(),
                    endpoint: kind.endpoint().into(),
                });
            }
            let mut created = self.created.lock();
            created.push((kind, payload.clone()));
            RecordId::parse(&format!("rec-{}", created.len())).map_err(Into::into)
        }

        async fn update_record(&self, _: RecordKind, _: &RecordId, _: &Value) -> Result<(), AppError> {
            Ok(())
        }

        async fn delete_news(&self, _: &RecordId) -> Result<(), AppError> {
            Ok(())
        }

        async fn suggest(&self, _: SuggestionKind, _: &SuggestionRequest) -> Result<Suggestion, AppError> {
            Ok(Suggestion::Tags(Vec::new()))
        }
    }

    fn post(title: &str, content: &str, images: &[&str]) -> ImportedPost {
        ImportedPost {
            title: title.into(),
            slug: crate::types::slugify(title),
            link: format!("/blog/{}", crate::types::slugify(title)),
            date: chrono::NaiveDate::from_ymd_opt(2023, 5, 1),
            category: Some("Studio".into()),
            tags: vec!["paint".into()],
            content: content.into(),
            excerpt: "Excerpt".into(),
            images: images.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn now() -> DateTime<Utc> {
        use chrono::TimeZone;
        Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
    }

    fn importer(admin: Arc<Admin>) -> Importer {
        Importer::new(Arc::new(Fetcher), Arc::new(Uploader), admin, "news")
    }

    #[test]
    fn selection_controls() {
        let mut session = ImportSession::new(
            vec![post("A", "<p>a</p>", &[]), post("B", "<p>b</p>", &[])],
            RecordKind::News,
        );
        assert_eq!(session.selected_count(), 2);
        session.deselect(0);
        session.toggle(1);
        assert_eq!(session.selected_count(), 0);
        session.select(0);
        session.toggle(7);
        assert_eq!(session.selected_count(), 1);
        session.set_all(true);
        assert_eq!(session.selected_count(), 2);
    }

    #[tokio::test]
    async fn news_import_rewrites_images_and_keeps_unreachable_ones() {
        let admin = Arc::new(Admin::default());
        let content = r#"<p>Hi</p><img src="https://old.example/a.svg"><img src="https://old.example/gone.jpg"><img src="https://old.example/a.svg">"#;
        let mut session = ImportSession::new(
            vec![post(
                "Hello",
                content,
                &["https://old.example/a.svg", "https://old.example/gone.jpg"],
            )],
            RecordKind::News,
        );

        let summary = importer(admin.clone()).run(&mut session, now()).await;

        assert_eq!(summary, ImportSummary { imported: 1, failed: 0, skipped: 0 });
        assert_eq!(session.rows()[0].status.to_string(), "success");
        let created = admin.created.lock();
        let (kind, payload) = &created[0];
        assert_eq!(*kind, RecordKind::News);
        assert_eq!(
            payload["content"],
            r#"<p>Hi</p><img src="https://cdn.test/news/a.svg"><img src="https://old.example/gone.jpg"><img src="https://cdn.test/news/a.svg">"#
        );
        assert_eq!(payload["published"], false);
        assert_eq!(payload["date"], "2023-05-01");
        assert_eq!(payload["cover_image"], "https://cdn.test/news/a.svg");
    }

    #[tokio::test]
    async fn unreachable_first_image_is_not_the_cover() {
        let admin = Arc::new(Admin::default());
        let content = r#"<img src="https://old.example/gone.jpg"><img src="https://old.example/ok.svg">"#;
        let mut session = ImportSession::new(
            vec![post(
                "Covers",
                content,
                &["https://old.example/gone.jpg", "https://old.example/ok.svg"],
            )],
            RecordKind::News,
        );

        importer(admin.clone()).run(&mut session, now()).await;

        let created = admin.created.lock();
        assert_eq!(created[0].1["cover_image"], "https://cdn.test/news/ok.svg");
    }

    #[tokio::test]
    async fn post_without_reachable_images_has_no_cover() {
        let admin = Arc::new(Admin::default());
        let mut session = ImportSession::new(
            vec![post(
                "Lost",
                r#"<img src="https://old.example/gone.jpg">"#,
                &["https://old.example/gone.jpg"],
            )],
            RecordKind::News,
        );

        importer(admin.clone()).run(&mut session, now()).await;

        let created = admin.created.lock();
        assert_eq!(created[0].1["cover_image"], Value::Null);
    }

    #[tokio::test]
    async fn article_import_sends_blocks() {
        let admin = Arc::new(Admin::default());
        let mut session = ImportSession::new(
            vec![post("Essay", "<h2>Intro</h2><p>Body text</p>", &[])],
            RecordKind::Article,
        );

        importer(admin.clone()).run(&mut session, now()).await;

        let created = admin.created.lock();
        let (kind, payload) = &created[0];
        assert_eq!(*kind, RecordKind::Article);
        let blocks = payload["content"].as_array().unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0]["type"], "heading");
        assert_eq!(blocks[1]["content"], "Body text");
        assert_eq!(payload["slug"], "essay");
        assert_eq!(payload["published"], false);
    }

    #[tokio::test]
    async fn failures_are_recorded_and_the_run_continues() {
        let admin = Arc::new(Admin::default());
        let mut session = ImportSession::new(
            vec![
                post("Broken", "<p>x</p>", &[]),
                post("Skipped", "<p>y</p>", &[]),
                post("Fine", "<p>z</p>", &[]),
            ],
            RecordKind::News,
        );
        session.deselect(1);

        let summary = importer(admin.clone()).run(&mut session, now()).await;

        assert_eq!(summary.to_string(), "1 imported, 1 failed, 1 skipped");
        match &session.rows()[0].status {
            RowStatus::Error(message) => {
                assert!(message.chars().count() <= STATUS_ERROR_PREVIEW_CHARS);
                assert!(message.ends_with('…'));
            }
            other => panic!("unexpected status: {other:?}"),
        }
        assert_eq!(session.rows()[1].status, RowStatus::Pending);
        assert_eq!(
            session.rows()[2].status,
            RowStatus::Success(RecordId::parse("rec-1").unwrap())
        );
    }

    #[test]
    fn url_replacement_covers_escaped_ampersands() {
        let html = r#"<img src="https://x.test/i.jpg?a=1&amp;b=2">"#;
        assert_eq!(
            replace_url(html, "https://x.test/i.jpg?a=1&b=2", "https://cdn.test/i.webp"),
            r#"<img src="https://cdn.test/i.webp">"#
        );
        assert_eq!(file_name_from_url("https://x.test/a/b/photo.png?w=2"), "photo.png");
        assert_eq!(file_name_from_url("not a url"), "image");
    }
}
