// src/output/mod.rs
//! Where CLI results go: planned as data, then delivered in one place.

mod types;
mod writer;

pub use types::{Delivered, DeliveryTarget, OutputPlan, OutputReport};
pub use writer::deliver;
