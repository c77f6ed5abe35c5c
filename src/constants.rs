// src/constants.rs
//! Domain constants that define the operational boundaries of the system.
//!
//! Each constant is named for the domain concept it constrains, not its
//! technical role. Reading them in order tells how uploads are gated,
//! retried and fanned out, how the editor persists drafts, and how the
//! HTML parser buckets image sizes.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Upload boundaries
// ---------------------------------------------------------------------------

/// Largest image accepted for upload, checked before any network call.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Widest image kept after client-side optimization; wider images are
/// downscaled preserving aspect ratio.
pub const OPTIMIZED_MAX_WIDTH: u32 = 1920;

/// WebP quality used when re-encoding uploads (0–100).
pub const OPTIMIZED_WEBP_QUALITY: f32 = 80.0;

/// Attempts per upload route (direct storage, then server fallback).
pub const UPLOAD_MAX_ATTEMPTS: u32 = 3;

/// First backoff delay; doubles after every failed attempt.
pub const UPLOAD_RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

/// Ceiling for a single backoff delay.
pub const UPLOAD_RETRY_MAX_DELAY: Duration = Duration::from_secs(30);

/// Concurrent uploads in a bulk gallery upload.
pub const BULK_UPLOAD_CONCURRENCY: usize = 3;

/// Storage folder used when the caller does not name one.
pub const DEFAULT_UPLOAD_FOLDER: &str = "uploads";

// ---------------------------------------------------------------------------
// Editor & local state
// ---------------------------------------------------------------------------

/// Quiet period after the last edit before a draft is written.
pub const AUTOSAVE_DEBOUNCE: Duration = Duration::from_millis(800);

/// Prefix of the draft key; followed by the article id or `new`.
pub const DRAFT_KEY_PREFIX: &str = "article-draft-";

/// Prefix of the project prefetch cache key; followed by the slug.
pub const PROJECT_CACHE_KEY_PREFIX: &str = "project-cache-";

/// Time budget for a project prefetch request.
pub const PREFETCH_TIMEOUT: Duration = Duration::from_secs(4);

/// Project details kept in the in-memory prefetch cache.
pub const PREFETCH_CACHE_CAPACITY: usize = 32;

/// Reading speed used for the read-time estimate.
pub const WORDS_PER_MINUTE: usize = 200;

// ---------------------------------------------------------------------------
// HTML heuristics
// ---------------------------------------------------------------------------

/// Widths below this many pixels are a `small` image.
pub const IMAGE_SMALL_BELOW_PX: u32 = 400;

/// Widths below this many pixels are a `medium` image.
pub const IMAGE_MEDIUM_BELOW_PX: u32 = 800;

/// Widths below this many pixels are a `large` image; anything wider is `full`.
pub const IMAGE_LARGE_BELOW_PX: u32 = 1200;

/// Estimated characters per block, used to pre-allocate output strings.
///
/// This is a performance hint, not a constraint.
pub const CHARS_PER_BLOCK_ESTIMATE: usize = 256;

// ---------------------------------------------------------------------------
// Import & error display
// ---------------------------------------------------------------------------

/// Characters of plain text used when an imported post has no excerpt.
pub const IMPORT_EXCERPT_CHARS: usize = 160;

/// Maximum characters of an error shown in an import status row.
pub const STATUS_ERROR_PREVIEW_CHARS: usize = 80;

/// Maximum characters shown when previewing error response bodies.
pub const ERROR_BODY_PREVIEW_LENGTH: usize = 200;

// ---------------------------------------------------------------------------
// Admin & storage services
// ---------------------------------------------------------------------------

/// Upper bound on one admin or storage request, including the body upload.
pub const SERVICE_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Cache lifetime requested for uploaded objects.
pub const STORAGE_CACHE_CONTROL_SECS: u32 = 3600;
