//! Near-exact duplicate detection.

use lookalike_core::Result;
use lookalike_core::store::{DistanceRange, NearestQuery, SortOrder, VectorStore};
use lookalike_core::types::{DistanceResult, EmbeddingVector, Modality};

/// Largest cosine distance at which two embeddings count as the same item.
///
/// Equivalent to a similarity of at least 0.98.
pub const DUPLICATE_DISTANCE_THRESHOLD: f64 = 0.02;

/// Looks for a stored record within [`DUPLICATE_DISTANCE_THRESHOLD`] of a query.
#[derive(Debug, Clone)]
pub struct DuplicateDetector {
    store: VectorStore,
}

impl DuplicateDetector {
    /// Creates a duplicate detector over `store`.
    pub fn new(store: VectorStore) -> Self {
        Self { store }
    }

    /// Returns the closest record within the duplicate threshold, if any.
    pub async fn is_duplicate(
        &self,
        query: &EmbeddingVector,
        modality: Modality,
    ) -> Result<Option<DistanceResult>> {
        let query = NearestQuery::new(query.clone(), modality)
            .with_range(DistanceRange::between(0.0, DUPLICATE_DISTANCE_THRESHOLD))
            .with_order(SortOrder::Ascending)
            .with_limit(1);

        let rows = self.store.nearest(&query).await?;
        Ok(rows.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use lookalike_core::types::{EmbeddingDimensions, VectorRecord};

    use super::*;
    use crate::memory::MemoryVectorStore;

    async fn detector(rows: &[(i64, [f32; 2])]) -> DuplicateDetector {
        let memory = MemoryVectorStore::new(EmbeddingDimensions::uniform(2));
        for (id, values) in rows {
            memory
                .insert_record(VectorRecord::new(*id, EmbeddingVector::new(values.to_vec())))
                .await
                .unwrap();
        }
        DuplicateDetector::new(VectorStore::new(memory))
    }

    #[tokio::test]
    async fn test_returns_closest_duplicate() {
        let detector = detector(&[(1, [1.0, 0.15]), (2, [1.0, 0.05]), (3, [0.0, 1.0])]).await;

        let found = detector
            .is_duplicate(&EmbeddingVector::new(vec![1.0, 0.0]), Modality::Image)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(found.id, 2);
        assert!(found.distance <= DUPLICATE_DISTANCE_THRESHOLD);
    }

    #[tokio::test]
    async fn test_exact_match_is_duplicate() {
        let detector = detector(&[(9, [0.3, 0.4])]).await;

        let found = detector
            .is_duplicate(&EmbeddingVector::new(vec![0.6, 0.8]), Modality::Image)
            .await
            .unwrap();

        assert_eq!(found.map(|d| d.id), Some(9));
    }

    #[tokio::test]
    async fn test_no_duplicate_is_none() {
        let populated = detector(&[(1, [1.0, 0.3]), (2, [0.0, 1.0])]).await;

        let found = populated
            .is_duplicate(&EmbeddingVector::new(vec![1.0, 0.0]), Modality::Image)
            .await
            .unwrap();
        assert!(found.is_none());

        let empty = detector(&[]).await;
        assert!(
            empty
                .is_duplicate(&EmbeddingVector::new(vec![1.0, 0.0]), Modality::Image)
                .await
                .unwrap()
                .is_none()
        );
    }
}
