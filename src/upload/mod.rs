// src/upload/mod.rs
//! Image uploads: validation, WebP optimization, direct storage with admin
//! fallback, and bounded bulk uploads.

mod bulk;
mod file;
mod optimize;
mod pipeline;

pub use bulk::{BulkReport, BulkUploader, UploadStatus};
pub use file::{content_type_for_name, new_object_key, object_key, UploadFile};
pub use optimize::{optimize_image, OptimizeOptions};
pub use pipeline::{ImageUploader, UploadPipeline, UploadSession};
