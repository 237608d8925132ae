//! Results of nearest-neighbor queries.

use serde::{Deserialize, Serialize};

use super::ItemId;

/// A record id paired with its cosine distance to the query.
///
/// Produced transiently by the vector store; never persisted. Zero means the
/// same direction, larger values mean less similar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceResult {
    /// Record identifier.
    pub id: ItemId,
    /// Cosine distance to the query vector.
    pub distance: f64,
}

impl DistanceResult {
    /// Creates a new distance result.
    pub fn new(id: ItemId, distance: f64) -> Self {
        Self { id, distance }
    }

    /// Returns `1 - distance`.
    #[inline]
    pub fn similarity(&self) -> f64 {
        1.0 - self.distance
    }
}

/// A ranked item with its similarity to the query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    /// Record identifier.
    pub id: ItemId,
    /// Similarity score, `1 - distance`.
    pub similarity: f64,
}

impl RankedResult {
    /// Creates a new ranked result.
    pub fn new(id: ItemId, similarity: f64) -> Self {
        Self { id, similarity }
    }
}

impl From<DistanceResult> for RankedResult {
    fn from(result: DistanceResult) -> Self {
        Self::new(result.id, result.similarity())
    }
}
