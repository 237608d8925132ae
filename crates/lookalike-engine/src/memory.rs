//! In-process collaborators.
//!
//! [`MemoryVectorStore`] computes exact cosine distances over every stored
//! record and [`MemoryMetadataStore`] keeps item metadata in a map. Both are
//! cheap to clone and share their state, so a test can keep a handle after
//! moving a clone into a [`VectorStore`](lookalike_core::VectorStore).

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use lookalike_core::store::NearestQuery;
use lookalike_core::types::{
    DistanceResult, EmbeddingDimensions, ItemId, ItemMetadata, VectorRecord,
};
use lookalike_core::{Error, MetadataProvider, Result, ServiceHealth, VectorStoreProvider};
use tokio::sync::RwLock;

/// Tracing target for the in-memory collaborators.
pub const TRACING_TARGET: &str = "lookalike_engine::memory";

/// Cosine distance `1 - cos(a, b)`, computed in `f64` and clamped to `[0, 2]`.
///
/// Returns `None` when the lengths differ or either vector has zero norm.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.len() != b.len() {
        return None;
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0_f64, 0.0_f64, 0.0_f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denominator = norm_a.sqrt() * norm_b.sqrt();
    if denominator == 0.0 {
        return None;
    }

    Some((1.0 - dot / denominator).clamp(0.0, 2.0))
}

/// Exact in-memory vector record store.
#[derive(Debug, Clone)]
pub struct MemoryVectorStore {
    records: Arc<RwLock<BTreeMap<ItemId, VectorRecord>>>,
    dimensions: EmbeddingDimensions,
}

impl MemoryVectorStore {
    /// Creates an empty store accepting embeddings of the given widths.
    pub fn new(dimensions: EmbeddingDimensions) -> Self {
        Self {
            records: Arc::default(),
            dimensions,
        }
    }

    /// Inserts a record, rejecting wrong widths and existing ids.
    pub async fn insert_record(&self, record: VectorRecord) -> Result<()> {
        record.validate(&self.dimensions)?;

        let mut records = self.records.write().await;
        if records.contains_key(&record.id) {
            return Err(Error::conflict().with_message(format!(
                "vector record {} already exists",
                record.id
            )));
        }

        tracing::trace!(target: TRACING_TARGET, id = record.id, "Stored vector record");
        records.insert(record.id, record);
        Ok(())
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns true if no records are stored.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Returns true if a record with `id` is stored.
    pub async fn contains(&self, id: ItemId) -> bool {
        self.records.read().await.contains_key(&id)
    }
}

#[async_trait::async_trait]
impl VectorStoreProvider for MemoryVectorStore {
    async fn insert(&self, record: VectorRecord) -> Result<()> {
        self.insert_record(record).await
    }

    async fn delete(&self, id: ItemId) -> Result<()> {
        self.records.write().await.remove(&id);
        Ok(())
    }

    async fn nearest(&self, query: &NearestQuery) -> Result<Vec<DistanceResult>> {
        self.dimensions.check(&query.vector, query.modality)?;

        let records = self.records.read().await;
        let mut rows: Vec<DistanceResult> = records
            .values()
            .filter_map(|record| {
                let embedding = record.embedding(query.modality)?;
                let distance = cosine_distance(&query.vector, embedding)?;
                Some(DistanceResult::new(record.id, distance))
            })
            .filter(|row| query.range.contains(row.distance))
            .collect();
        drop(records);

        rows.sort_by(|a, b| query.order.compare(a, b));
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        Ok(rows)
    }

    async fn health_check(&self) -> Result<ServiceHealth> {
        let records = self.len().await;
        Ok(ServiceHealth::healthy().with_metric("records", records.into()))
    }
}

/// In-memory metadata lookup.
#[derive(Debug, Clone, Default)]
pub struct MemoryMetadataStore {
    items: Arc<RwLock<HashMap<ItemId, ItemMetadata>>>,
}

impl MemoryMetadataStore {
    /// Creates an empty metadata store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces metadata for an item.
    pub async fn upsert(&self, metadata: ItemMetadata) {
        self.items.write().await.insert(metadata.id, metadata);
    }

    /// Removes metadata for an item.
    pub async fn remove(&self, id: ItemId) -> Option<ItemMetadata> {
        self.items.write().await.remove(&id)
    }
}

#[async_trait::async_trait]
impl MetadataProvider for MemoryMetadataStore {
    async fn get_by_ids(&self, ids: &[ItemId]) -> Result<Vec<ItemMetadata>> {
        let items = self.items.read().await;
        Ok(ids.iter().filter_map(|id| items.get(id).cloned()).collect())
    }

    async fn health_check(&self) -> Result<ServiceHealth> {
        let items = self.items.read().await.len();
        Ok(ServiceHealth::healthy().with_metric("items", items.into()))
    }
}

#[cfg(test)]
mod tests {
    use lookalike_core::ErrorKind;
    use lookalike_core::store::{DistanceRange, SortOrder};
    use lookalike_core::types::{EmbeddingVector, Modality};

    use super::*;

    fn vector(values: &[f32]) -> EmbeddingVector {
        EmbeddingVector::new(values.to_vec())
    }

    #[test]
    fn test_cosine_distance() {
        assert_eq!(cosine_distance(&[1.0, 0.0], &[2.0, 0.0]), Some(0.0));
        assert_eq!(cosine_distance(&[1.0, 0.0], &[0.0, 3.0]), Some(1.0));
        assert_eq!(cosine_distance(&[1.0, 0.0], &[-1.0, 0.0]), Some(2.0));
        assert_eq!(cosine_distance(&[1.0, 0.0], &[0.0, 0.0]), None);
        assert_eq!(cosine_distance(&[1.0], &[1.0, 0.0]), None);
    }

    #[tokio::test]
    async fn test_insert_rejects_conflict_and_bad_width() {
        let store = MemoryVectorStore::new(EmbeddingDimensions::uniform(2));
        store.insert(VectorRecord::new(1, vector(&[1.0, 0.0]))).await.unwrap();

        let conflict = store
            .insert(VectorRecord::new(1, vector(&[0.0, 1.0])))
            .await
            .unwrap_err();
        assert_eq!(conflict.kind(), ErrorKind::Conflict);

        let invalid = store
            .insert(VectorRecord::new(2, vector(&[1.0, 0.0, 0.0])))
            .await
            .unwrap_err();
        assert_eq!(invalid.kind(), ErrorKind::Validation);

        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemoryVectorStore::new(EmbeddingDimensions::uniform(2));
        store.insert(VectorRecord::new(1, vector(&[1.0, 0.0]))).await.unwrap();

        store.delete(1).await.unwrap();
        store.delete(1).await.unwrap();
        store.delete(42).await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_nearest_applies_range_order_and_limit() {
        let store = MemoryVectorStore::new(EmbeddingDimensions::uniform(2));
        for (id, values) in [(1, [1.0, 0.0]), (2, [1.0, 1.0]), (3, [0.0, 1.0]), (4, [-1.0, 0.0])] {
            store.insert(VectorRecord::new(id, vector(&values))).await.unwrap();
        }

        let query = NearestQuery::new(vector(&[1.0, 0.0]), Modality::Image)
            .with_range(DistanceRange::between(0.1, 1.5))
            .with_order(SortOrder::Descending);
        let rows = store.nearest(&query).await.unwrap();
        let ids: Vec<_> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 2]);

        let limited = store.nearest(&query.with_limit(1)).await.unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].id, 3);
    }

    #[tokio::test]
    async fn test_metadata_lookup_skips_unknown_ids() {
        let metadata = MemoryMetadataStore::new();
        metadata.upsert(ItemMetadata::new(1, "a.jpg")).await;
        metadata.upsert(ItemMetadata::new(2, "b.jpg")).await;

        let rows = metadata.get_by_ids(&[2, 5]).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].path, "b.jpg");

        assert!(metadata.remove(2).await.is_some());
        assert!(metadata.get_by_ids(&[2]).await.unwrap().is_empty());
    }
}
