//! Diesel models for the lookalike tables.

mod item_metadata;
mod vector_record;

pub use item_metadata::ItemMetadataRow;
pub use vector_record::{NewVectorRecord, ScoredVectorRecord};
