// tests/bulk_upload.rs
//! Bulk uploads through the real pipeline: retries, fallback and partial
//! success with in-memory services.

use async_trait::async_trait;
use folio::api::{ObjectStorage, ObjectUpload, UploadFallback};
use folio::upload::UploadStatus;
use folio::{AppError, BulkUploader, ServiceErrorCode, UploadFile, UploadPipeline};
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Storage that rejects every object whose name starts with `offline`.
#[derive(Default)]
struct PartialStorage {
    attempts: AtomicUsize,
}

#[async_trait]
impl ObjectStorage for PartialStorage {
    async fn put_object(&self, object: &ObjectUpload) -> Result<String, AppError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if object.file_name.starts_with("offline") {
            return Err(AppError::Storage {
                code: ServiceErrorCode::ServiceUnavailable,
                message: "bucket unavailable".into(),
            });
        }
        Ok(format!("https://cdn.test/{}", object.key))
    }
}

/// Admin fallback that accepts everything except `offline-broken*`.
struct Fallback;

#[async_trait]
impl UploadFallback for Fallback {
    async fn upload_via_admin(&self, object: &ObjectUpload, folder: &str) -> Result<String, AppError> {
        if object.file_name.starts_with("offline-broken") {
            return Err(AppError::AdminService {
                code: ServiceErrorCode::PayloadTooLarge,
                message: "file rejected".into(),
                endpoint: "upload".into(),
            });
        }
        Ok(format!("https://admin.test/{}/{}", folder, object.file_name))
    }
}

fn png(name: &str) -> UploadFile {
    UploadFile::new(name, "image/png", vec![0x89, b'P', b'N', b'G'])
}

#[tokio::test(start_paused = true)]
async fn mixed_batch_reports_partial_success() {
    let storage = Arc::new(PartialStorage::default());
    let pipeline = UploadPipeline::new(Some(storage.clone()), Arc::new(Fallback)).with_optimization(None);
    let bulk = BulkUploader::new(Arc::new(pipeline));

    let files = vec![
        png("one.png"),
        png("offline-two.png"),
        png("three.png"),
        png("offline-broken.png"),
        UploadFile::new("notes.txt", "text/plain", b"hello".to_vec()),
    ];
    let report = bulk.upload_all(files, "gallery").await;

    assert_eq!(report.summary(), "3/5");
    assert_eq!(report.success_count() + report.failed_count(), 5);
    assert!(matches!(&report.statuses[0], UploadStatus::Success(url) if url.starts_with("https://cdn.test/gallery/")));
    assert_eq!(
        report.statuses[1],
        UploadStatus::Success("https://admin.test/gallery/offline-two.png".into())
    );
    match &report.statuses[3] {
        UploadStatus::Error(message) => {
            assert!(message.contains("bucket unavailable"));
            assert!(message.contains("file rejected"));
        }
        other => panic!("unexpected status {other:?}"),
    }
    assert!(matches!(&report.statuses[4], UploadStatus::Error(m) if m.contains("not an image")));

    let failed: Vec<_> = report.failed_files().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(failed, vec!["offline-broken.png", "notes.txt"]);

    // two successes on the first try, three direct attempts for each offline file
    assert_eq!(storage.attempts.load(Ordering::SeqCst), 2 + 3 + 3);
}
