// src/api/mod.rs
//! Remote services the admin talks to: the admin functions, object storage,
//! and arbitrary image hosts during import.
//!
//! Business logic depends on the traits here, never on HTTP details, so
//! uploads and imports can be exercised against in-memory fakes.

pub mod client;
pub mod fetcher;
pub mod responses;
pub mod storage;

pub use client::AdminHttpClient;
pub use fetcher::HttpImageFetcher;
pub use responses::NewsRecord;
pub use storage::StorageHttpClient;

use crate::error::AppError;
use crate::model::RecordKind;
use crate::types::RecordId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An object body on its way to storage.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectUpload {
    /// Object key inside the bucket, e.g. `uploads/1700000000000-1a2b3c4d.webp`
    pub key: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Direct upload to object storage.
#[async_trait::async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Stores the object and returns its public URL.
    async fn put_object(&self, object: &ObjectUpload) -> Result<String, AppError>;
}

/// The admin `upload` endpoint, used when direct storage fails.
#[async_trait::async_trait]
pub trait UploadFallback: Send + Sync {
    /// Uploads through the admin functions and returns the public URL.
    async fn upload_via_admin(&self, object: &ObjectUpload, folder: &str)
        -> Result<String, AppError>;
}

/// Record and suggestion endpoints of the admin functions.
#[async_trait::async_trait]
pub trait AdminApi: Send + Sync {
    async fn list_news(&self) -> Result<Vec<NewsRecord>, AppError>;

    /// Creates a record and returns the id the backend assigned.
    async fn create_record(&self, kind: RecordKind, payload: &Value)
        -> Result<RecordId, AppError>;

    async fn update_record(
        &self,
        kind: RecordKind,
        id: &RecordId,
        payload: &Value,
    ) -> Result<(), AppError>;

    async fn delete_news(&self, id: &RecordId) -> Result<(), AppError>;

    async fn suggest(
        &self,
        kind: SuggestionKind,
        request: &SuggestionRequest,
    ) -> Result<Suggestion, AppError>;
}

/// Downloaded image bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    /// From the response `Content-Type`, when the host sent one.
    pub content_type: Option<String>,
}

/// Fetches images referenced by imported content.
#[async_trait::async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch_image(&self, url: &str) -> Result<FetchedImage, AppError>;
}

/// The SEO suggestion endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionKind {
    Tags,
    Description,
    ReadTime,
}

impl SuggestionKind {
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Tags => "seo/tags",
            Self::Description => "seo/description",
            Self::ReadTime => "seo/read-time",
        }
    }
}

/// Body of every suggestion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionRequest {
    pub title: String,
    pub excerpt: String,
    /// Plain text of the document
    pub content: String,
}

/// A suggestion returned by the admin functions.
#[derive(Debug, Clone, PartialEq)]
pub enum Suggestion {
    Tags(Vec<String>),
    Description(String),
    ReadTime(u32),
}

impl Suggestion {
    /// Reads `{success, <field>}` for the given endpoint.
    pub fn from_response(kind: SuggestionKind, body: &Value) -> Result<Self, AppError> {
        if body.get("success").and_then(Value::as_bool) == Some(false) {
            let message = body
                .get("error")
                .or_else(|| body.get("message"))
                .and_then(Value::as_str)
                .unwrap_or("suggestion failed");
            return Err(AppError::AdminService {
                code: crate::error::ServiceErrorCode::ValidationFailed,
                message: message.to_string(),
                endpoint: kind.endpoint().to_string(),
            });
        }

        let missing = |field: &str| {
            AppError::MalformedResponse(format!(
                "{} response has no '{}' field",
                kind.endpoint(),
                field
            ))
        };

        match kind {
            SuggestionKind::Tags => {
                let tags = body
                    .get("tags")
                    .and_then(Value::as_array)
                    .ok_or_else(|| missing("tags"))?;
                Ok(Self::Tags(
                    tags.iter()
                        .filter_map(Value::as_str)
                        .map(|t| t.trim().to_string())
                        .filter(|t| !t.is_empty())
                        .collect(),
                ))
            }
            SuggestionKind::Description => body
                .get("description")
                .and_then(Value::as_str)
                .map(|d| Self::Description(d.trim().to_string()))
                .ok_or_else(|| missing("description")),
            SuggestionKind::ReadTime => body
                .get("readTime")
                .or_else(|| body.get("read_time"))
                .and_then(|v| v.as_u64().or_else(|| v.as_str()?.trim().parse().ok()))
                .map(|minutes| Self::ReadTime(u32::try_from(minutes).unwrap_or(u32::MAX).max(1)))
                .ok_or_else(|| missing("readTime")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn suggestions_read_their_field() {
        assert_eq!(
            Suggestion::from_response(
                SuggestionKind::Tags,
                &json!({"success": true, "tags": ["art", " ", "news"]})
            )
            .unwrap(),
            Suggestion::Tags(vec!["art".into(), "news".into()])
        );
        assert_eq!(
            Suggestion::from_response(SuggestionKind::ReadTime, &json!({"success": true, "readTime": "4"}))
                .unwrap(),
            Suggestion::ReadTime(4)
        );
        assert!(Suggestion::from_response(
            SuggestionKind::Description,
            &json!({"success": false, "error": "quota"})
        )
        .is_err());
    }
}
