//! Nearest-neighbor query parameters.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::types::{DistanceResult, EmbeddingVector, Modality};

/// Inclusive distance bounds; either side may be open.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DistanceRange {
    /// Lower bound (inclusive).
    pub min: Option<f64>,
    /// Upper bound (inclusive).
    pub max: Option<f64>,
}

impl DistanceRange {
    /// A range with no bounds.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// A range `[min, +inf)`.
    pub fn at_least(min: f64) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    /// A range `[min, max]`.
    pub fn between(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Returns true if `distance` lies within the bounds.
    #[inline]
    pub fn contains(&self, distance: f64) -> bool {
        self.min.is_none_or(|min| distance >= min) && self.max.is_none_or(|max| distance <= max)
    }
}

/// Result ordering by distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Closest first.
    #[default]
    Ascending,
    /// Farthest first.
    Descending,
}

impl SortOrder {
    /// Compares two results according to this order.
    pub fn compare(&self, a: &DistanceResult, b: &DistanceResult) -> Ordering {
        match self {
            Self::Ascending => a.distance.total_cmp(&b.distance),
            Self::Descending => b.distance.total_cmp(&a.distance),
        }
    }
}

/// A nearest-by-distance query against one embedding column.
#[derive(Debug, Clone, PartialEq)]
pub struct NearestQuery {
    /// Query embedding.
    pub vector: EmbeddingVector,
    /// Which embedding column to compare against.
    pub modality: Modality,
    /// Distance bounds applied before ordering.
    pub range: DistanceRange,
    /// Maximum number of rows; `None` returns every matching row.
    pub limit: Option<usize>,
    /// Ordering of the returned rows.
    pub order: SortOrder,
}

impl NearestQuery {
    /// Creates an unbounded, ascending query.
    pub fn new(vector: EmbeddingVector, modality: Modality) -> Self {
        Self {
            vector,
            modality,
            range: DistanceRange::unbounded(),
            limit: None,
            order: SortOrder::Ascending,
        }
    }

    /// Sets the distance range.
    pub fn with_range(mut self, range: DistanceRange) -> Self {
        self.range = range;
        self
    }

    /// Limits the number of returned rows.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the ordering.
    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }
}
