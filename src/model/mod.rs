//! Content model: blocks, their type-specific metadata, and the records
//! assembled from them for persistence.

mod article;
mod block;
mod metadata;
mod normalize;

pub use article::*;
pub use block::*;
pub use metadata::*;
pub use normalize::*;
