//! Nearest-neighbor queries for similar but distinct items.

use lookalike_core::Result;
use lookalike_core::store::{DistanceRange, NearestQuery, SortOrder, VectorStore};
use lookalike_core::types::{DistanceResult, EmbeddingVector, Modality};

use crate::DUPLICATE_DISTANCE_THRESHOLD;

/// Default number of candidates returned by [`SimilarityEngine::find_candidates`].
pub const CANDIDATE_LIMIT: usize = 5;

/// Issues "similar but not duplicate" queries against the vector store.
///
/// Every query starts at [`DUPLICATE_DISTANCE_THRESHOLD`], so records the
/// duplicate detector would flag never show up as candidates.
#[derive(Debug, Clone)]
pub struct SimilarityEngine {
    store: VectorStore,
}

impl SimilarityEngine {
    /// Creates a similarity engine over `store`.
    pub fn new(store: VectorStore) -> Self {
        Self { store }
    }

    /// Returns up to `limit` nearest non-duplicate records, closest first.
    pub async fn find_candidates(
        &self,
        query: &EmbeddingVector,
        modality: Modality,
        limit: usize,
    ) -> Result<Vec<DistanceResult>> {
        let query = Self::query(query, modality).with_limit(limit);
        self.store.nearest(&query).await
    }

    /// Returns every non-duplicate record, closest first.
    ///
    /// Unbounded on purpose: the band ranker needs the whole distribution.
    pub async fn find_all_candidates(
        &self,
        query: &EmbeddingVector,
        modality: Modality,
    ) -> Result<Vec<DistanceResult>> {
        self.store.nearest(&Self::query(query, modality)).await
    }

    fn query(vector: &EmbeddingVector, modality: Modality) -> NearestQuery {
        NearestQuery::new(vector.clone(), modality)
            .with_range(DistanceRange::at_least(DUPLICATE_DISTANCE_THRESHOLD))
            .with_order(SortOrder::Ascending)
    }
}

#[cfg(test)]
mod tests {
    use lookalike_core::types::{EmbeddingDimensions, VectorRecord};

    use super::*;
    use crate::memory::MemoryVectorStore;

    async fn engine() -> SimilarityEngine {
        let memory = MemoryVectorStore::new(EmbeddingDimensions::uniform(2));
        let rows = [
            (1, [1.0, 0.0]),
            (2, [1.0, 0.1]),
            (3, [1.0, 0.4]),
            (4, [0.7, 0.7]),
            (5, [0.0, 1.0]),
            (6, [-1.0, 0.2]),
            (7, [1.0, 0.6]),
        ];
        for (id, values) in rows {
            memory
                .insert_record(VectorRecord::new(id, EmbeddingVector::new(values.to_vec())))
                .await
                .unwrap();
        }
        SimilarityEngine::new(VectorStore::new(memory))
    }

    #[tokio::test]
    async fn test_candidates_exclude_duplicates() {
        let engine = engine().await;
        let query = EmbeddingVector::new(vec![1.0, 0.0]);

        let candidates = engine.find_candidates(&query, Modality::Image, 10).await.unwrap();

        assert!(!candidates.is_empty());
        assert!(candidates.iter().all(|c| c.distance >= DUPLICATE_DISTANCE_THRESHOLD));
        assert!(candidates.iter().all(|c| c.id != 1 && c.id != 2));
    }

    #[tokio::test]
    async fn test_candidates_are_limited_and_sorted() {
        let engine = engine().await;
        let query = EmbeddingVector::new(vec![1.0, 0.0]);

        let limited = engine
            .find_candidates(&query, Modality::Image, CANDIDATE_LIMIT)
            .await
            .unwrap();
        let all = engine.find_all_candidates(&query, Modality::Image).await.unwrap();

        assert_eq!(limited.len(), CANDIDATE_LIMIT);
        assert_eq!(all.len(), 5);
        assert_eq!(&all[..CANDIDATE_LIMIT], &limited[..]);
        assert!(all.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[tokio::test]
    async fn test_text_modality_skips_records_without_text() {
        let engine = engine().await;
        let query = EmbeddingVector::new(vec![1.0, 0.0]);

        let candidates = engine.find_all_candidates(&query, Modality::Text).await.unwrap();
        assert!(candidates.is_empty());
    }
}
