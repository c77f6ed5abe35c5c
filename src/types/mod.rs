use thiserror::Error;

mod domain_types;
mod ids;

pub use domain_types::*;
pub use ids::*;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    #[error("Invalid URL: {url} - {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Empty required field: {0}")]
    EmptyField(&'static str),

    #[error("Invalid API key format: {reason}")]
    InvalidApiKey { reason: String },

    #[error("Invalid admin token: {reason}")]
    InvalidAdminToken { reason: String },

    #[error("Invalid slug: {slug} - {reason}")]
    InvalidSlug { slug: String, reason: String },

    #[error("Focal point out of range: ({x}, {y}), expected 0..=100")]
    FocalPointOutOfRange { x: f32, y: f32 },

    #[error("{name} is not an image (type {mime})")]
    UnsupportedFileType { name: String, mime: String },

    #[error("{name} is too large: {size} bytes, maximum {max}")]
    FileTooLarge { name: String, size: usize, max: usize },
}
