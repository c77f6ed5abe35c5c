//! Local state kept between edits: autosave drafts on disk and an in-memory
//! prefetch cache.

mod drafts;
mod prefetch;

pub use drafts::{draft_key, Draft, DraftStore};
pub use prefetch::{project_cache_key, PrefetchCache};
