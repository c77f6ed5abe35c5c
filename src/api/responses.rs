// src/api/responses.rs
//! Response bodies of the admin functions.
//!
//! The admin functions are loosely typed: ids come back as strings or
//! numbers, created records are sometimes wrapped in `data`, and errors use
//! either `error` or `message`. These types absorb those variations so the
//! rest of the crate sees one shape.

use crate::error::AppError;
use crate::types::RecordId;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Error body: `{"error": "..."}` or `{"message": "..."}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.error
            .or(self.message)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
    }
}

/// Body of a successful upload.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub url: String,
}

/// A news record as listed by the admin API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsRecord {
    #[serde(deserialize_with = "record_id")]
    pub id: RecordId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub published: bool,
}

/// Accepts a JSON string or number as a record id.
fn record_id<'de, D>(deserializer: D) -> Result<RecordId, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    id_from_value(&value).ok_or_else(|| serde::de::Error::custom("record id is missing"))
}

fn id_from_value(value: &Value) -> Option<RecordId> {
    match value {
        Value::String(s) => RecordId::parse(s).ok(),
        Value::Number(n) => RecordId::parse(&n.to_string()).ok(),
        _ => None,
    }
}

/// Extracts the id of a created record from `{id}`, `{data: {id}}` or
/// `{data: [{id}]}`.
pub fn created_record_id(body: &str) -> Result<RecordId, AppError> {
    let value: Value = serde_json::from_str(body)?;
    let candidates = [
        value.get("id"),
        value.get("data").and_then(|d| d.get("id")),
        value
            .get("data")
            .and_then(|d| d.get(0))
            .and_then(|d| d.get("id")),
    ];
    let id = candidates.into_iter().flatten().find_map(id_from_value);
    id.ok_or_else(|| {
        AppError::MalformedResponse(format!(
            "created record has no id: {}",
            crate::error::truncate_message(body, crate::constants::ERROR_BODY_PREVIEW_LENGTH)
        ))
    })
}

/// Extracts the news list from a bare array or `{data: [...]}`.
pub fn news_list(body: &str) -> Result<Vec<NewsRecord>, AppError> {
    let value: Value = serde_json::from_str(body)?;
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(AppError::MalformedResponse(
                    "news list is neither an array nor {data: [...]}".into(),
                ))
            }
        },
        _ => {
            return Err(AppError::MalformedResponse(
                "news list is not a JSON array".into(),
            ))
        }
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<NewsRecord>(item) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("Skipping unreadable news record: {}", e);
                None
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn ids_come_in_several_shapes() {
        assert_eq!(created_record_id(r#"{"id": 12}"#).unwrap().as_str(), "12");
        assert_eq!(
            created_record_id(r#"{"data": {"id": "abc"}}"#).unwrap().as_str(),
            "abc"
        );
        assert_eq!(
            created_record_id(r#"{"data": [{"id": "x1"}]}"#).unwrap().as_str(),
            "x1"
        );
        assert!(created_record_id(r#"{"ok": true}"#).is_err());
    }

    #[test]
    fn news_lists_skip_bad_rows() {
        let records =
            news_list(r#"{"data": [{"id": 1, "title": "A", "published": true}, {"title": "no id"}]}"#)
                .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id.as_str(), "1");
        assert!(records[0].published);
    }

    #[test]
    fn error_bodies_prefer_error_over_message() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"error": "bad token", "message": "other"}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("bad token"));
        let empty: ErrorBody = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.into_message(), None);
    }
}
