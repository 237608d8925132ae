//! Data model shared across the lookalike crates.

mod distance;
mod metadata;
mod record;
mod vector;

pub use distance::{DistanceResult, RankedResult};
pub use metadata::{ItemMetadata, SearchHit};
pub use record::{ItemId, VectorRecord};
pub use vector::{DEFAULT_DIMENSIONS, EmbeddingDimensions, EmbeddingVector, Modality};
