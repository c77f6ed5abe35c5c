// src/lib.rs
//! folio library: the content layer of the site admin.
//!
//! # Public API
//!
//! The library exposes types organized by concern:
//! - **Error handling** — `AppError`, `ValidationError`, `ServiceErrorCode`
//! - **Configuration** — `AdminConfig`, `CommandLineInput`
//! - **Domain model** — `ContentBlock`, `BlockType`, `BlockMetadata`, `ArticleForm`
//! - **HTML conversion** — `serialize_blocks`, `render_for_display`, `parse_html`
//! - **Editor** — `Editor`, `BlockEditor`, `Toolbar`, `SyncMachine`, `Autosaver`
//! - **Uploads** — `UploadPipeline`, `BulkUploader`, `UploadFile`
//! - **Import** — `parse_export`, `ImportSession`, `Importer`
//! - **Remote services** — `AdminHttpClient`, `StorageHttpClient`

pub mod analytics;
pub mod api;
pub mod config;
pub mod constants;
pub mod editor;
pub mod error;
pub mod error_recovery;
pub mod html;
pub mod import;
pub mod model;
pub mod output;
pub mod store;
pub mod types;
pub mod upload;

// --- Error Handling ---
pub use crate::error::{AppError, Result, ServiceErrorCode};
pub use crate::types::ValidationError;

// --- Configuration ---
pub use crate::config::{AdminConfig, CommandLineInput, StorageConfig};

// --- Domain Model ---
pub use crate::model::{
    normalize_content, AccordionItem, ArticleForm, ArticlePayload, BlockMetadata, BlockType,
    CalloutType, ContentBlock, GalleryImage, GalleryStyle, ImageAlign, ImageOptions, ImageSize,
    ListType, NewsPayload, RecordKind, SpacerHeight,
};

// --- Domain Types ---
pub use crate::types::{BlockId, FocalPoint, RecordId, Slug, ValidatedUrl};

// --- HTML ---
pub use crate::html::{parse_html, render_for_display, serialize_blocks};

// --- Editor ---
pub use crate::editor::{Autosaver, BlockEditor, Editor, SyncMachine, SyncState, Toolbar, ToolbarPreset};

// --- Uploads ---
pub use crate::upload::{BulkReport, BulkUploader, ImageUploader, UploadFile, UploadPipeline, UploadSession};

// --- Import ---
pub use crate::import::{parse_export, ImportSession, ImportSummary, ImportedPost, Importer};

// --- Remote services ---
pub use crate::api::{AdminApi, AdminHttpClient, ObjectStorage, StorageHttpClient, UploadFallback};

// --- Local state ---
pub use crate::store::{DraftStore, PrefetchCache};
