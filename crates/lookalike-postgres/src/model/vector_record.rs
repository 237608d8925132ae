//! Vector record model for PostgreSQL database operations.

use diesel::prelude::*;
use lookalike_core::types::{DistanceResult, ItemId, VectorRecord};
use pgvector::Vector;

use crate::schema::vector_records;

/// Data for creating a new vector record.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = vector_records)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewVectorRecord {
    /// Item id shared with the metadata store.
    pub id: ItemId,
    /// Image embedding (required).
    pub image_embedding: Vector,
    /// Text embedding.
    pub text_embedding: Option<Vector>,
}

impl From<VectorRecord> for NewVectorRecord {
    fn from(record: VectorRecord) -> Self {
        Self {
            id: record.id,
            image_embedding: Vector::from(record.image_embedding.into_inner()),
            text_embedding: record
                .text_embedding
                .map(|embedding| Vector::from(embedding.into_inner())),
        }
    }
}

/// A record id with its cosine distance to a query vector.
#[derive(Debug, Clone, Copy, PartialEq, Queryable)]
pub struct ScoredVectorRecord {
    /// Item id.
    pub id: ItemId,
    /// Cosine distance in `[0, 2]`.
    pub distance: f64,
}

impl From<ScoredVectorRecord> for DistanceResult {
    fn from(row: ScoredVectorRecord) -> Self {
        DistanceResult::new(row.id, row.distance)
    }
}
