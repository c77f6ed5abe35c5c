// src/import/mod.rs
//! Squarespace export import: parse, review, then move posts into the admin
//! as unpublished drafts with their images re-hosted.

mod session;
mod squarespace;

pub use session::{ImportRow, ImportSession, ImportSummary, Importer, RowStatus};
pub use squarespace::{extract_images, is_blog_link, parse_export, ImportedPost};
