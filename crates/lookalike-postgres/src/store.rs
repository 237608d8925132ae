//! pgvector-backed implementations of the lookalike storage contracts.

use std::time::Instant;

use lookalike_core::store::NearestQuery;
use lookalike_core::types::{
    DistanceResult, EmbeddingDimensions, ItemId, ItemMetadata, VectorRecord,
};
use lookalike_core::{MetadataProvider, Result, ServiceHealth, VectorStoreProvider};

use crate::model::NewVectorRecord;
use crate::query::{ItemMetadataRepository, VectorRecordRepository};
use crate::{PgClient, PgError, TRACING_TARGET_QUERY};

/// Vector record store over the `vector_records` table.
///
/// Distances are computed by pgvector's `<=>` (cosine distance) operator.
/// Embedding widths are checked here, since the column type does not fix them.
#[derive(Debug, Clone)]
pub struct PgVectorStore {
    client: PgClient,
    dimensions: EmbeddingDimensions,
}

impl PgVectorStore {
    /// Creates a store that accepts embeddings of the given widths.
    pub fn new(client: PgClient, dimensions: EmbeddingDimensions) -> Self {
        Self { client, dimensions }
    }

    /// Returns the underlying client.
    pub fn client(&self) -> &PgClient {
        &self.client
    }
}

#[async_trait::async_trait]
impl VectorStoreProvider for PgVectorStore {
    async fn insert(&self, record: VectorRecord) -> Result<()> {
        record.validate(&self.dimensions)?;

        let id = record.id;
        let mut conn = self.client.get_connection().await?;
        conn.create_vector_record(NewVectorRecord::from(record))
            .await
            .map_err(|error| {
                if error.is_unique_violation() {
                    tracing::debug!(target: TRACING_TARGET_QUERY, id, "Vector record already exists");
                }
                lookalike_core::Error::from(error)
            })?;

        tracing::debug!(target: TRACING_TARGET_QUERY, id, "Inserted vector record");
        Ok(())
    }

    async fn delete(&self, id: ItemId) -> Result<()> {
        let mut conn = self.client.get_connection().await?;
        let affected = conn.delete_vector_record(id).await?;

        tracing::debug!(target: TRACING_TARGET_QUERY, id, affected, "Deleted vector record");
        Ok(())
    }

    async fn nearest(&self, query: &NearestQuery) -> Result<Vec<DistanceResult>> {
        self.dimensions.check(&query.vector, query.modality)?;

        let started_at = Instant::now();
        let mut conn = self.client.get_connection().await?;
        let rows = conn.find_nearest_records(query).await?;

        tracing::trace!(
            target: TRACING_TARGET_QUERY,
            modality = %query.modality,
            rows = rows.len(),
            elapsed_ms = started_at.elapsed().as_millis(),
            "Loaded nearest vector records"
        );

        Ok(rows.into_iter().map(DistanceResult::from).collect())
    }

    async fn health_check(&self) -> Result<ServiceHealth> {
        pool_health(&self.client).await
    }
}

/// Metadata lookup over the application-owned `item_metadata` table.
#[derive(Debug, Clone)]
pub struct PgMetadataStore {
    client: PgClient,
}

impl PgMetadataStore {
    /// Creates a metadata lookup over `client`.
    pub fn new(client: PgClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl MetadataProvider for PgMetadataStore {
    async fn get_by_ids(&self, ids: &[ItemId]) -> Result<Vec<ItemMetadata>> {
        let mut conn = self.client.get_connection().await?;
        let rows = conn.find_item_metadata(ids).await?;
        Ok(rows.into_iter().map(ItemMetadata::from).collect())
    }

    async fn health_check(&self) -> Result<ServiceHealth> {
        pool_health(&self.client).await
    }
}

/// Pings the database and reports pool pressure.
async fn pool_health(client: &PgClient) -> Result<ServiceHealth> {
    let status = client.pool_status();
    let health = match client.ping().await {
        Ok(()) if status.is_under_pressure() => {
            ServiceHealth::degraded("connection pool is under pressure")
        }
        Ok(()) => ServiceHealth::healthy(),
        Err(error @ PgError::Config(_)) => return Err(error.into()),
        Err(error) => ServiceHealth::unhealthy(error.to_string()),
    };

    Ok(health
        .with_metric("pool_size", status.size.into())
        .with_metric("pool_available", status.available.into())
        .with_metric("pool_waiting", status.waiting.into()))
}
