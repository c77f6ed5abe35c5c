// src/error.rs
//! Application error types with structured error handling.
//!
//! Error types form the vocabulary for failure modes in the system.
//! Each variant says what went wrong and where, so callers at the
//! component boundary can turn them into user-facing messages.

use std::fmt;
use thiserror::Error;

/// Admin/storage service failures as a typed vocabulary.
///
/// The admin functions and the storage service both answer with plain HTTP
/// status codes and a short JSON body, so the classification is status based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceErrorCode {
    /// Missing or rejected bearer key / admin token
    Unauthorized,
    /// Token is valid but lacks permission for this resource
    Forbidden,
    /// The requested record or object does not exist
    NotFound,
    /// Object already exists (storage upsert disabled)
    Conflict,
    /// Upload body exceeds the service limit
    PayloadTooLarge,
    /// Request rejected by server-side validation
    ValidationFailed,
    /// Rate limit exceeded, back off and retry
    RateLimited,
    /// Service-side failure
    InternalError,
    /// Service is temporarily unavailable
    ServiceUnavailable,
    /// Any other status code
    HttpStatus(u16),
}

impl ServiceErrorCode {
    /// Classifies an HTTP status code.
    pub fn from_http_status(status: u16) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            409 => Self::Conflict,
            413 => Self::PayloadTooLarge,
            400 | 422 => Self::ValidationFailed,
            429 => Self::RateLimited,
            500 => Self::InternalError,
            502..=504 => Self::ServiceUnavailable,
            other => Self::HttpStatus(other),
        }
    }

    /// Whether this error is transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited | Self::ServiceUnavailable | Self::InternalError
        )
    }
}

impl fmt::Display for ServiceErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::Forbidden => write!(f, "forbidden"),
            Self::NotFound => write!(f, "not_found"),
            Self::Conflict => write!(f, "conflict"),
            Self::PayloadTooLarge => write!(f, "payload_too_large"),
            Self::ValidationFailed => write!(f, "validation_error"),
            Self::RateLimited => write!(f, "rate_limited"),
            Self::InternalError => write!(f, "internal_server_error"),
            Self::ServiceUnavailable => write!(f, "service_unavailable"),
            Self::HttpStatus(code) => write!(f, "http_{}", code),
        }
    }
}

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    #[error("Network failure: {0}")]
    NetworkFailure(#[from] reqwest::Error),

    #[error("Admin API returned an error ({code}): {message}")]
    AdminService {
        code: ServiceErrorCode,
        message: String,
        endpoint: String,
    },

    #[error("Storage upload failed ({code}): {message}")]
    Storage {
        code: ServiceErrorCode,
        message: String,
    },

    #[error("Upload failed: direct upload ({direct}); fallback ({fallback})")]
    UploadFailed { direct: String, fallback: String },

    #[error("Image processing failed: {0}")]
    ImageProcessing(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Import file could not be read: {0}")]
    ImportParse(String),

    #[error("Editor rejected the operation: {0}")]
    Editor(String),

    #[error("Request to {endpoint} timed out after {seconds}s")]
    Timeout { endpoint: String, seconds: u64 },

    #[error("Filesystem IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {message}")]
    InternalError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error(transparent)]
    ValidationError(#[from] crate::types::ValidationError),
}

impl AppError {
    /// Whether retrying the same request might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::NetworkFailure(_) | AppError::Timeout { .. } => true,
            AppError::AdminService { code, .. } | AppError::Storage { code, .. } => {
                code.is_retryable()
            }
            _ => false,
        }
    }
}

// Allow converting from anyhow::Error, preserving the message
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalError {
            message: err.to_string(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::MalformedResponse(err.to_string())
    }
}

impl From<quick_xml::Error> for AppError {
    fn from(err: quick_xml::Error) -> Self {
        AppError::ImportParse(err.to_string())
    }
}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        AppError::ImageProcessing(err.to_string())
    }
}

/// Shortens an error message for a table cell or status line.
///
/// Cuts on a character boundary and appends an ellipsis when shortened.
pub fn truncate_message(message: &str, max_chars: usize) -> String {
    if message.chars().count() <= max_chars {
        return message.to_string();
    }
    let cut: String = message.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", cut.trim_end())
}

/// Result type alias for convenience
pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_classify() {
        assert_eq!(
            ServiceErrorCode::from_http_status(401),
            ServiceErrorCode::Unauthorized
        );
        assert_eq!(
            ServiceErrorCode::from_http_status(503),
            ServiceErrorCode::ServiceUnavailable
        );
        assert_eq!(
            ServiceErrorCode::from_http_status(418),
            ServiceErrorCode::HttpStatus(418)
        );
        assert!(ServiceErrorCode::RateLimited.is_retryable());
        assert!(!ServiceErrorCode::NotFound.is_retryable());
    }

    #[test]
    fn admin_error_is_retryable_only_when_transient() {
        let transient = AppError::AdminService {
            code: ServiceErrorCode::InternalError,
            message: "boom".into(),
            endpoint: "news".into(),
        };
        let permanent = AppError::AdminService {
            code: ServiceErrorCode::ValidationFailed,
            message: "title required".into(),
            endpoint: "news".into(),
        };
        assert!(transient.is_retryable());
        assert!(!permanent.is_retryable());
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_message("short", 10), "short");
        let long = "é".repeat(20);
        let cut = truncate_message(&long, 5);
        assert_eq!(cut.chars().count(), 5);
        assert!(cut.ends_with('…'));
    }
}
