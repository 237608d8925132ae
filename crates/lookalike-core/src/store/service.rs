//! Vector store service with observability.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::{NearestQuery, TRACING_TARGET, VectorStoreProvider};
use crate::deadline::{DEFAULT_TIMEOUT, bounded};
use crate::types::{DistanceResult, ItemId, VectorRecord};
use crate::{Error, Result, ServiceHealth};

/// Vector store wrapper with observability.
///
/// Wraps any [`VectorStoreProvider`], bounds every call with a timeout and
/// rejects malformed rows before they reach the ranking code. The inner
/// provider is wrapped in `Arc` for cheap cloning.
#[derive(Clone)]
pub struct VectorStore {
    inner: Arc<dyn VectorStoreProvider>,
    timeout: Option<Duration>,
}

impl fmt::Debug for VectorStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VectorStore")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl VectorStore {
    /// Creates a new vector store from a provider with the default timeout.
    pub fn new<P>(provider: P) -> Self
    where
        P: VectorStoreProvider + 'static,
    {
        Self {
            inner: Arc::new(provider),
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }

    /// Sets the per-call timeout; `None` disables it.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Inserts a new record.
    pub async fn insert(&self, record: VectorRecord) -> Result<()> {
        let started_at = Instant::now();
        let id = record.id;

        tracing::debug!(
            target: TRACING_TARGET,
            id,
            has_text_embedding = record.text_embedding.is_some(),
            "Inserting vector record"
        );

        let result = bounded(self.timeout, "vector store insert", self.inner.insert(record)).await;
        let elapsed = started_at.elapsed();

        match &result {
            Ok(()) => tracing::debug!(
                target: TRACING_TARGET,
                id,
                elapsed_ms = elapsed.as_millis(),
                "Vector record inserted"
            ),
            Err(error) => tracing::error!(
                target: TRACING_TARGET,
                id,
                error = %error,
                elapsed_ms = elapsed.as_millis(),
                "Vector record insert failed"
            ),
        }

        result
    }

    /// Deletes a record. Missing ids are ignored.
    pub async fn delete(&self, id: ItemId) -> Result<()> {
        let started_at = Instant::now();

        tracing::debug!(target: TRACING_TARGET, id, "Deleting vector record");

        let result = bounded(self.timeout, "vector store delete", self.inner.delete(id)).await;
        let elapsed = started_at.elapsed();

        match &result {
            Ok(()) => tracing::debug!(
                target: TRACING_TARGET,
                id,
                elapsed_ms = elapsed.as_millis(),
                "Vector record deleted"
            ),
            Err(error) => tracing::error!(
                target: TRACING_TARGET,
                id,
                error = %error,
                elapsed_ms = elapsed.as_millis(),
                "Vector record delete failed"
            ),
        }

        result
    }

    /// Runs a nearest-by-distance query.
    pub async fn nearest(&self, query: &NearestQuery) -> Result<Vec<DistanceResult>> {
        let started_at = Instant::now();

        tracing::debug!(
            target: TRACING_TARGET,
            modality = %query.modality,
            min_distance = ?query.range.min,
            max_distance = ?query.range.max,
            limit = ?query.limit,
            order = ?query.order,
            "Querying nearest records"
        );

        let result = bounded(self.timeout, "vector store query", self.inner.nearest(query))
            .await
            .and_then(|rows| Self::check_rows(query, rows));
        let elapsed = started_at.elapsed();

        match &result {
            Ok(rows) => tracing::debug!(
                target: TRACING_TARGET,
                modality = %query.modality,
                count = rows.len(),
                elapsed_ms = elapsed.as_millis(),
                "Nearest query completed"
            ),
            Err(error) => tracing::error!(
                target: TRACING_TARGET,
                modality = %query.modality,
                error = %error,
                elapsed_ms = elapsed.as_millis(),
                "Nearest query failed"
            ),
        }

        result
    }

    /// Performs a health check on the store.
    pub async fn health_check(&self) -> Result<ServiceHealth> {
        let started_at = Instant::now();
        let health = bounded(self.timeout, "vector store health check", self.inner.health_check())
            .await?;
        Ok(health.with_response_time(started_at.elapsed()))
    }

    /// Rejects rows a backend should never return.
    fn check_rows(query: &NearestQuery, rows: Vec<DistanceResult>) -> Result<Vec<DistanceResult>> {
        if let Some(row) = rows.iter().find(|row| !row.distance.is_finite()) {
            return Err(Error::dependency().with_message(format!(
                "vector store returned a non-finite distance for id {}",
                row.id
            )));
        }

        if let Some(limit) = query.limit
            && rows.len() > limit
        {
            return Err(Error::dependency().with_message(format!(
                "vector store returned {} rows for a limit of {limit}",
                rows.len()
            )));
        }

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::types::{EmbeddingVector, Modality};

    struct FixedProvider {
        rows: Vec<DistanceResult>,
        delay: Duration,
    }

    #[async_trait::async_trait]
    impl VectorStoreProvider for FixedProvider {
        async fn insert(&self, _record: VectorRecord) -> Result<()> {
            tokio::time::sleep(self.delay).await;
            Ok(())
        }

        async fn delete(&self, _id: ItemId) -> Result<()> {
            Ok(())
        }

        async fn nearest(&self, _query: &NearestQuery) -> Result<Vec<DistanceResult>> {
            tokio::time::sleep(self.delay).await;
            Ok(self.rows.clone())
        }

        async fn health_check(&self) -> Result<ServiceHealth> {
            Ok(ServiceHealth::healthy())
        }
    }

    fn query() -> NearestQuery {
        NearestQuery::new(EmbeddingVector::new(vec![1.0, 0.0]), Modality::Image)
    }

    #[tokio::test]
    async fn test_nearest_rejects_non_finite_distance() {
        let store = VectorStore::new(FixedProvider {
            rows: vec![DistanceResult::new(1, 0.1), DistanceResult::new(2, f64::NAN)],
            delay: Duration::ZERO,
        });

        let error = store.nearest(&query()).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Dependency);
    }

    #[tokio::test]
    async fn test_nearest_rejects_rows_beyond_limit() {
        let store = VectorStore::new(FixedProvider {
            rows: vec![DistanceResult::new(1, 0.1), DistanceResult::new(2, 0.2)],
            delay: Duration::ZERO,
        });

        assert!(store.nearest(&query().with_limit(1)).await.is_err());
        assert_eq!(store.nearest(&query()).await.unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_store_times_out() {
        let store = VectorStore::new(FixedProvider {
            rows: Vec::new(),
            delay: Duration::from_secs(60),
        })
        .with_timeout(Some(Duration::from_millis(100)));

        let error = store.nearest(&query()).await.unwrap_err();
        assert!(error.is_dependency());
    }

    #[tokio::test]
    async fn test_health_check_records_response_time() {
        let store = VectorStore::new(FixedProvider {
            rows: Vec::new(),
            delay: Duration::ZERO,
        });

        let health = store.health_check().await.unwrap();
        assert!(health.is_healthy());
        assert!(health.response.is_some());
    }
}
