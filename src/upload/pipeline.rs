//! Single-file upload: validate, optimize, then direct storage with the admin
//! endpoint as fallback. Both legs retry with the upload backoff policy.

use super::optimize::{optimize_image, OptimizeOptions};
use super::{new_object_key, UploadFile};
use crate::api::{ObjectStorage, ObjectUpload, UploadFallback};
use crate::error::AppError;
use crate::error_recovery::retry_upload;
use parking_lot::Mutex;
use std::sync::Arc;

/// Turns a file into a public URL.
///
/// # Laws
///
/// - Invalid files fail before any network call.
/// - A returned URL is never empty.
#[async_trait::async_trait]
pub trait ImageUploader: Send + Sync {
    async fn upload(&self, file: &UploadFile, folder: &str) -> Result<String, AppError>;
}

/// Direct-then-fallback uploader.
#[derive(Clone)]
pub struct UploadPipeline {
    storage: Option<Arc<dyn ObjectStorage>>,
    fallback: Arc<dyn UploadFallback>,
    optimize: Option<OptimizeOptions>,
}

impl UploadPipeline {
    /// Without `storage` every upload goes through the fallback.
    pub fn new(storage: Option<Arc<dyn ObjectStorage>>, fallback: Arc<dyn UploadFallback>) -> Self {
        Self {
            storage,
            fallback,
            optimize: Some(OptimizeOptions::default()),
        }
    }

    pub fn with_optimization(mut self, options: Option<OptimizeOptions>) -> Self {
        self.optimize = options;
        self
    }

    async fn prepare(&self, file: &UploadFile) -> Result<UploadFile, AppError> {
        let Some(options) = self.optimize else {
            return Ok(file.clone());
        };
        let file = file.clone();
        tokio::task::spawn_blocking(move || optimize_image(file, options))
            .await
            .map_err(|e| AppError::InternalError {
                message: "image optimization task failed".to_string(),
                source: Some(Box::new(e)),
            })
    }
}

#[async_trait::async_trait]
impl ImageUploader for UploadPipeline {
    async fn upload(&self, file: &UploadFile, folder: &str) -> Result<String, AppError> {
        file.validate()?;
        let prepared = self.prepare(file).await?;

        let object = ObjectUpload {
            key: new_object_key(folder, &prepared),
            file_name: prepared.name.clone(),
            content_type: prepared.content_type.clone(),
            bytes: prepared.bytes,
        };

        let direct = match &self.storage {
            Some(storage) => match retry_upload(|| storage.put_object(&object)).await {
                Ok(url) => {
                    log::info!("Uploaded {} to {}", file.name, url);
                    return Ok(url);
                }
                Err(e) => {
                    log::warn!("Direct upload of {} failed, using admin fallback: {}", file.name, e);
                    e.to_string()
                }
            },
            None => "storage is not configured".to_string(),
        };

        match retry_upload(|| self.fallback.upload_via_admin(&object, folder)).await {
            Ok(url) => {
                log::info!("Uploaded {} via admin to {}", file.name, url);
                Ok(url)
            }
            Err(e) => Err(AppError::UploadFailed {
                direct,
                fallback: e.to_string(),
            }),
        }
    }
}

/// An upload surface that remembers the last failure for a retry button.
pub struct UploadSession {
    uploader: Arc<dyn ImageUploader>,
    folder: String,
    last_failed: Mutex<Option<(UploadFile, String)>>,
}

impl UploadSession {
    pub fn new(uploader: Arc<dyn ImageUploader>, folder: impl Into<String>) -> Self {
        Self {
            uploader,
            folder: folder.into(),
            last_failed: Mutex::new(None),
        }
    }

    pub async fn upload(&self, file: UploadFile) -> Result<String, AppError> {
        match self.uploader.upload(&file, &self.folder).await {
            Ok(url) => {
                *self.last_failed.lock() = None;
                Ok(url)
            }
            Err(e) => {
                *self.last_failed.lock() = Some((file, e.to_string()));
                Err(e)
            }
        }
    }

    /// Message of the last failed upload, if it has not been retried away.
    pub fn last_error(&self) -> Option<String> {
        self.last_failed.lock().as_ref().map(|(_, msg)| msg.clone())
    }

    /// Uploads the last failed file again. `None` when nothing failed.
    pub async fn retry_last(&self) -> Option<Result<String, AppError>> {
        let (file, _) = self.last_failed.lock().take()?;
        Some(self.upload(file).await)
    }

    pub fn clear_error(&self) {
        *self.last_failed.lock() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceErrorCode;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FlakyStorage {
        failures_left: AtomicU32,
        calls: AtomicU32,
    }

    impl FlakyStorage {
        fn failing(times: u32) -> Arc<Self> {
            Arc::new(Self {
                failures_left: AtomicU32::new(times),
                calls: AtomicU32::new(0),
            })
        }
    }

    #[async_trait::async_trait]
    impl ObjectStorage for FlakyStorage {
        async fn put_object(&self, object: &ObjectUpload) -> Result<String, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let left = self.failures_left.load(Ordering::SeqCst);
            if left > 0 {
                self.failures_left.store(left - 1, Ordering::SeqCst);
                return Err(AppError::Storage {
                    code: ServiceErrorCode::ServiceUnavailable,
                    message: "bucket offline".into(),
                });
            }
            Ok(format!("https://cdn.test/{}", object.key))
        }
    }

    struct Fallback {
        fail: bool,
        calls: AtomicU32,
    }

    #[async_trait::async_trait]
    impl UploadFallback for Fallback {
        async fn upload_via_admin(
            &self,
            object: &ObjectUpload,
            folder: &str,
        ) -> Result<String, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AppError::AdminService {
                    code: ServiceErrorCode::Unauthorized,
                    message: "bad token".into(),
                    endpoint: "upload".into(),
                });
            }
            Ok(format!("https://admin.test/{}/{}", folder, object.file_name))
        }
    }

    fn fallback(fail: bool) -> Arc<Fallback> {
        Arc::new(Fallback {
            fail,
            calls: AtomicU32::new(0),
        })
    }

    fn svg() -> UploadFile {
        UploadFile::new("logo.svg", "image/svg+xml", b"<svg/>".to_vec())
    }

    #[tokio::test(start_paused = true)]
    async fn direct_upload_retries_before_succeeding() {
        let storage = FlakyStorage::failing(2);
        let admin = fallback(false);
        let pipeline = UploadPipeline::new(Some(storage.clone()), admin.clone());

        let url = pipeline.upload(&svg(), "news").await.unwrap();

        assert!(url.starts_with("https://cdn.test/news/"));
        assert!(url.ends_with(".svg"));
        assert_eq!(storage.calls.load(Ordering::SeqCst), 3);
        assert_eq!(admin.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn falls_back_after_direct_attempts_are_exhausted() {
        let storage = FlakyStorage::failing(10);
        let admin = fallback(false);
        let pipeline = UploadPipeline::new(Some(storage.clone()), admin.clone());

        let url = pipeline.upload(&svg(), "uploads").await.unwrap();

        assert_eq!(url, "https://admin.test/uploads/logo.svg");
        assert_eq!(storage.calls.load(Ordering::SeqCst), 3);
        assert_eq!(admin.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn reports_both_failures() {
        let pipeline = UploadPipeline::new(Some(FlakyStorage::failing(10)), fallback(true));
        let err = pipeline.upload(&svg(), "uploads").await.unwrap_err();
        match err {
            AppError::UploadFailed { direct, fallback } => {
                assert!(direct.contains("bucket offline"));
                assert!(fallback.contains("bad token"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    struct RejectingStorage {
        calls: AtomicU32,
    }

    #[async_trait::async_trait]
    impl ObjectStorage for RejectingStorage {
        async fn put_object(&self, _: &ObjectUpload) -> Result<String, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(AppError::Storage {
                code: ServiceErrorCode::Unauthorized,
                message: "invalid key".into(),
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn permanent_storage_errors_go_straight_to_fallback() {
        let storage = Arc::new(RejectingStorage {
            calls: AtomicU32::new(0),
        });
        let admin = fallback(false);
        let pipeline = UploadPipeline::new(Some(storage.clone()), admin.clone());

        let url = pipeline.upload(&svg(), "uploads").await.unwrap();

        assert_eq!(url, "https://admin.test/uploads/logo.svg");
        assert_eq!(storage.calls.load(Ordering::SeqCst), 1);
        assert_eq!(admin.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalid_files_never_reach_the_network() {
        let storage = FlakyStorage::failing(0);
        let admin = fallback(false);
        let pipeline = UploadPipeline::new(Some(storage.clone()), admin.clone());
        let pdf = UploadFile::new("a.pdf", "application/pdf", vec![1, 2, 3]);

        assert!(matches!(
            pipeline.upload(&pdf, "uploads").await,
            Err(AppError::ValidationError(_))
        ));
        assert_eq!(storage.calls.load(Ordering::SeqCst), 0);
        assert_eq!(admin.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn session_keeps_the_last_failure_for_retry() {
        let storage = FlakyStorage::failing(6);
        let pipeline = UploadPipeline::new(Some(storage), fallback(true));
        let session = UploadSession::new(Arc::new(pipeline), "uploads");

        assert!(session.upload(svg()).await.is_err());
        assert!(session.last_error().unwrap().contains("bad token"));

        // storage fails three more times, then recovers on the second retry
        assert!(session.retry_last().await.unwrap().is_err());
        let url = session.retry_last().await.unwrap().unwrap();
        assert!(url.starts_with("https://cdn.test/uploads/"));
        assert_eq!(session.last_error(), None);
        assert!(session.retry_last().await.is_none());
    }
}
