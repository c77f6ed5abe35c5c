//! Files queued for upload, and the checks made before any network call.

use crate::constants::MAX_UPLOAD_BYTES;
use crate::error::AppError;
use crate::types::ValidationError;
use std::path::Path;
use uuid::Uuid;

/// An in-memory file on its way to storage.
#[derive(Clone, PartialEq)]
pub struct UploadFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadFile")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

impl UploadFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Reads a file from disk, inferring its type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        let content_type = content_type_for_name(&name);
        Ok(Self::new(name, content_type, bytes))
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn mime(&self) -> Option<mime::Mime> {
        self.content_type.parse().ok()
    }

    /// Rejects non-images and files over the upload limit.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let is_image = self
            .mime()
            .map(|m| m.type_() == mime::IMAGE)
            .unwrap_or(false);
        if !is_image {
            return Err(ValidationError::UnsupportedFileType {
                name: self.name.clone(),
                mime: self.content_type.clone(),
            });
        }
        if self.size() > MAX_UPLOAD_BYTES {
            return Err(ValidationError::FileTooLarge {
                name: self.name.clone(),
                size: self.size(),
                max: MAX_UPLOAD_BYTES,
            });
        }
        Ok(())
    }

    /// File extension for the object key, from the content type first.
    pub fn extension(&self) -> String {
        if let Some(ext) = self.mime().and_then(|m| extension_for_mime(&m)) {
            return ext.to_string();
        }
        Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_else(|| "bin".to_string())
    }

    pub fn is_svg(&self) -> bool {
        self.mime()
            .map(|m| m.type_() == mime::IMAGE && m.subtype() == mime::SVG)
            .unwrap_or(false)
    }

    pub fn is_gif(&self) -> bool {
        self.mime()
            .map(|m| m.type_() == mime::IMAGE && m.subtype() == mime::GIF)
            .unwrap_or(false)
    }
}

/// Content type implied by a file name's extension.
pub fn content_type_for_name(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "ico" => "image/x-icon",
        _ => "application/octet-stream",
    }
}

fn extension_for_mime(mime: &mime::Mime) -> Option<&'static str> {
    if mime.type_() != mime::IMAGE {
        return None;
    }
    match mime.subtype().as_str() {
        "jpeg" | "jpg" => Some("jpg"),
        "png" => Some("png"),
        "gif" => Some("gif"),
        "webp" => Some("webp"),
        "svg" => Some("svg"),
        "avif" => Some("avif"),
        "bmp" => Some("bmp"),
        "tiff" => Some("tiff"),
        _ => None,
    }
}

/// `{folder}/{unix_ms}-{uuid8}.{ext}`
pub fn object_key(folder: &str, extension: &str, unix_ms: i64, unique: &str) -> String {
    let folder = folder.trim_matches('/');
    if folder.is_empty() {
        format!("{}-{}.{}", unix_ms, unique, extension)
    } else {
        format!("{}/{}-{}.{}", folder, unix_ms, unique, extension)
    }
}

/// A fresh object key for `file` under `folder`.
pub fn new_object_key(folder: &str, file: &UploadFile) -> String {
    let unique = Uuid::new_v4().as_simple().to_string();
    object_key(
        folder,
        &file.extension(),
        chrono::Utc::now().timestamp_millis(),
        &unique[..8],
    )
}
