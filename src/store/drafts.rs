// src/store/drafts.rs
//! File-backed autosave drafts.
//!
//! Each draft is one JSON file holding `{data, savedAt}` under a key of the
//! form `article-draft-{id|new}`. Reads are best-effort: a missing or corrupt
//! file is reported as "no draft" so a broken draft never blocks editing.

use crate::constants::DRAFT_KEY_PREFIX;
use crate::error::AppError;
use crate::types::RecordId;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A saved snapshot and when it was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft<T> {
    pub data: T,
    pub saved_at: DateTime<Utc>,
}

/// Storage key for the draft of a record, or of a record not yet saved.
pub fn draft_key(record: Option<&RecordId>) -> String {
    match record {
        Some(id) => format!("{}{}", DRAFT_KEY_PREFIX, id),
        None => format!("{}new", DRAFT_KEY_PREFIX),
    }
}

/// Directory of draft files.
#[derive(Debug, Clone)]
pub struct DraftStore {
    dir: PathBuf,
}

impl DraftStore {
    /// Opens (and creates if needed) a draft directory.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    /// `$XDG_STATE_HOME/folio/drafts`, falling back to `~/.local/state`.
    pub fn default_dir() -> PathBuf {
        std::env::var("XDG_STATE_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
                PathBuf::from(home).join(".local").join("state")
            })
            .join("folio")
            .join("drafts")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes a snapshot, replacing any previous draft under `key`.
    pub async fn save<T: Serialize>(
        &self,
        key: &str,
        data: &T,
        saved_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let entry = Draft { data, saved_at };
        let json = serde_json::to_vec_pretty(&entry)?;
        let path = self.key_to_path(key);
        // write-then-rename so a crash never leaves half a draft behind
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &path).await?;
        log::debug!("Saved draft {}", key);
        Ok(())
    }

    /// Loads the draft under `key`, if one exists and is readable.
    pub async fn load<T: DeserializeOwned>(&self, key: &str) -> Option<Draft<T>> {
        let path = self.key_to_path(key);
        let content = tokio::fs::read_to_string(&path).await.ok()?;
        match serde_json::from_str(&content) {
            Ok(draft) => Some(draft),
            Err(e) => {
                log::warn!("Ignoring unreadable draft {}: {}", key, e);
                None
            }
        }
    }

    /// Deletes the draft under `key`. Deleting a missing draft is not an error.
    pub async fn remove(&self, key: &str) -> Result<(), AppError> {
        match tokio::fs::remove_file(self.key_to_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn key_to_path(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", file))
    }
}
