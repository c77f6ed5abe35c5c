//! Debounced draft autosave.
//!
//! Every change reschedules a single timer: a pending save is aborted and a
//! new one started, so only the last snapshot within the debounce window is
//! written.

use crate::constants::AUTOSAVE_DEBOUNCE;
use crate::store::{draft_key, Draft, DraftStore};
use crate::types::RecordId;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

pub struct Autosaver {
    store: Arc<DraftStore>,
    key: String,
    debounce: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
    last_saved: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl Autosaver {
    /// Autosaver for an existing record, or for a new one when `record` is `None`.
    pub fn new(store: Arc<DraftStore>, record: Option<&RecordId>) -> Self {
        Self {
            store,
            key: draft_key(record),
            debounce: AUTOSAVE_DEBOUNCE,
            pending: Mutex::new(None),
            last_saved: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// When the last snapshot was written by this autosaver.
    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        *self.last_saved.lock()
    }

    /// Schedules `snapshot` to be written after the debounce window,
    /// superseding any save still waiting. Must be called inside a tokio runtime.
    pub fn schedule<T>(&self, snapshot: T)
    where
        T: Serialize + Send + Sync + 'static,
    {
        let store = Arc::clone(&self.store);
        let key = self.key.clone();
        let debounce = self.debounce;
        let last_saved = Arc::clone(&self.last_saved);

        let handle = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            let now = Utc::now();
            match store.save(&key, &snapshot, now).await {
                Ok(()) => *last_saved.lock() = Some(now),
                Err(e) => log::warn!("Autosave of {} failed: {}", key, e),
            }
        });

        if let Some(previous) = self.pending.lock().replace(handle) {
            previous.abort();
        }
    }

    /// Drops a save that has not fired yet.
    pub fn cancel(&self) {
        if let Some(handle) = self.pending.lock().take() {
            handle.abort();
        }
    }

    /// Waits for the pending save, if any, to complete.
    pub async fn flush(&self) {
        let handle = self.pending.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    log::warn!("Autosave task for {} failed: {}", self.key, e);
                }
            }
        }
    }

    /// The stored draft, for an offer to restore it.
    pub async fn restore<T: DeserializeOwned>(&self) -> Option<Draft<T>> {
        self.store.load(&self.key).await
    }

    /// Deletes the stored draft after a successful save.
    pub async fn discard(&self) -> crate::error::Result<()> {
        self.cancel();
        self.store.remove(&self.key).await
    }
}

impl Drop for Autosaver {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    async fn autosaver(dir: &tempfile::TempDir) -> Autosaver {
        let store = Arc::new(DraftStore::open(dir.path()).await.unwrap());
        Autosaver::new(store, None).with_debounce(Duration::from_millis(40))
    }

    #[tokio::test]
    async fn only_the_last_edit_in_the_window_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let saver = autosaver(&dir).await;

        saver.schedule("first".to_string());
        saver.schedule("second".to_string());
        saver.schedule("third".to_string());
        saver.flush().await;

        let draft: Draft<String> = saver.restore().await.unwrap();
        assert_eq!(draft.data, "third");
        assert!(saver.last_saved().is_some());
        assert_eq!(saver.key(), "article-draft-new");
    }

    #[tokio::test]
    async fn cancelled_saves_never_land() {
        let dir = tempfile::tempdir().unwrap();
        let saver = autosaver(&dir).await;
        saver.schedule(1u32);
        saver.cancel();
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(saver.restore::<u32>().await.is_none());
    }

    #[tokio::test]
    async fn discard_removes_the_draft() {
        let dir = tempfile::tempdir().unwrap();
        let saver = autosaver(&dir).await;
        saver.schedule(vec![1, 2, 3]);
        saver.flush().await;
        saver.discard().await.unwrap();
        assert!(saver.restore::<Vec<i32>>().await.is_none());
    }
}
