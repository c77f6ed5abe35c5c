//! Bounded-concurrency bulk upload with per-file status.

use super::{ImageUploader, UploadFile};
use crate::constants::BULK_UPLOAD_CONCURRENCY;
use futures::future::join_all;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStatus {
    Pending,
    Uploading,
    Success(String),
    Error(String),
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Uploading => write!(f, "uploading"),
            Self::Success(_) => write!(f, "success"),
            Self::Error(_) => write!(f, "error"),
        }
    }
}

/// Outcome of one bulk run, in input order.
#[derive(Debug, Clone)]
pub struct BulkReport {
    pub files: Vec<UploadFile>,
    pub statuses: Vec<UploadStatus>,
}

impl BulkReport {
    pub fn total(&self) -> usize {
        self.statuses.len()
    }

    pub fn success_count(&self) -> usize {
        self.statuses
            .iter()
            .filter(|s| matches!(s, UploadStatus::Success(_)))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.statuses
            .iter()
            .filter(|s| matches!(s, UploadStatus::Error(_)))
            .count()
    }

    /// URLs of the successful uploads, in input order.
    pub fn urls(&self) -> Vec<&str> {
        self.statuses
            .iter()
            .filter_map(|s| match s {
                UploadStatus::Success(url) => Some(url.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Files to offer for retry.
    pub fn failed_files(&self) -> Vec<&UploadFile> {
        self.files
            .iter()
            .zip(&self.statuses)
            .filter(|(_, s)| matches!(s, UploadStatus::Error(_)))
            .map(|(f, _)| f)
            .collect()
    }

    /// `"3/5"`
    pub fn summary(&self) -> String {
        format!("{}/{}", self.success_count(), self.total())
    }
}

/// Runs batches of uploads. Each `upload_all` call tracks its own statuses,
/// so overlapping batches on one uploader never overwrite each other;
/// [`BulkUploader::statuses`] shows the batch started last.
pub struct BulkUploader {
    uploader: Arc<dyn ImageUploader>,
    concurrency: usize,
    current: Mutex<Arc<Mutex<Vec<UploadStatus>>>>,
}

impl BulkUploader {
    pub fn new(uploader: Arc<dyn ImageUploader>) -> Self {
        Self {
            uploader,
            concurrency: BULK_UPLOAD_CONCURRENCY,
            current: Mutex::new(Arc::new(Mutex::new(Vec::new()))),
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Current per-file statuses of the running (or last) batch.
    pub fn statuses(&self) -> Vec<UploadStatus> {
        let batch = Arc::clone(&self.current.lock());
        let statuses = batch.lock().clone();
        statuses
    }

    /// Uploads every file with at most `concurrency` in flight. Individual
    /// failures are recorded and never abort the batch.
    pub async fn upload_all(&self, files: Vec<UploadFile>, folder: &str) -> BulkReport {
        let batch = Arc::new(Mutex::new(vec![UploadStatus::Pending; files.len()]));
        *self.current.lock() = Arc::clone(&batch);
        let next = AtomicUsize::new(0);
        let workers = self.concurrency.min(files.len());

        log::info!("Uploading {} files with {} workers", files.len(), workers);
        join_all((0..workers).map(|_| self.run_worker(&files, folder, &next, &batch))).await;

        let statuses = batch.lock().clone();
        BulkReport { files, statuses }
    }

    async fn run_worker(
        &self,
        files: &[UploadFile],
        folder: &str,
        next: &AtomicUsize,
        batch: &Mutex<Vec<UploadStatus>>,
    ) {
        loop {
            let index = next.fetch_add(1, Ordering::SeqCst);
            let Some(file) = files.get(index) else {
                break;
            };

            set_status(batch, index, UploadStatus::Uploading);
            let status = match self.uploader.upload(file, folder).await {
                Ok(url) => UploadStatus::Success(url),
                Err(e) => {
                    log::warn!("Upload of {} failed: {}", file.name, e);
                    UploadStatus::Error(e.to_string())
                }
            };
            set_status(batch, index, status);
        }
    }
}

fn set_status(batch: &Mutex<Vec<UploadStatus>>, index: usize, status: UploadStatus) {
    if let Some(slot) = batch.lock().get_mut(index) {
        *slot = status;
    }
}
