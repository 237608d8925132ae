//! Metadata store service with observability.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::{MetadataProvider, TRACING_TARGET};
use crate::deadline::{DEFAULT_TIMEOUT, bounded};
use crate::types::{ItemId, ItemMetadata};
use crate::{Error, Result, ServiceHealth};

/// Metadata lookup wrapper with observability.
#[derive(Clone)]
pub struct MetadataStore {
    inner: Arc<dyn MetadataProvider>,
    timeout: Option<Duration>,
}

impl fmt::Debug for MetadataStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataStore")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl MetadataStore {
    /// Creates a new metadata store from a provider with the default timeout.
    pub fn new<P>(provider: P) -> Self
    where
        P: MetadataProvider + 'static,
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

    /// Looks up metadata for `ids`.
    ///
    /// The result preserves the order of `ids`. Ids without metadata are
    /// dropped, duplicate ids yield one entry each time they appear.
    pub async fn get_by_ids(&self, ids: &[ItemId]) -> Result<Vec<ItemMetadata>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let started_at = Instant::now();

        tracing::debug!(
            target: TRACING_TARGET,
            requested = ids.len(),
            "Looking up item metadata"
        );

        let result = bounded(self.timeout, "metadata lookup", self.inner.get_by_ids(ids))
            .await
            .map(|rows| Self::in_request_order(ids, rows));
        let elapsed = started_at.elapsed();

        match &result {
            Ok(rows) => tracing::debug!(
                target: TRACING_TARGET,
                requested = ids.len(),
                found = rows.len(),
                elapsed_ms = elapsed.as_millis(),
                "Metadata lookup completed"
            ),
            Err(error) => tracing::error!(
                target: TRACING_TARGET,
                requested = ids.len(),
                error = %error,
                elapsed_ms = elapsed.as_millis(),
                "Metadata lookup failed"
            ),
        }

        result
    }

    /// Looks up metadata for a single id.
    pub async fn get_by_id(&self, id: ItemId) -> Result<ItemMetadata> {
        self.get_by_ids(&[id])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::not_found().with_message(format!("no metadata for item {id}")))
    }

    /// Performs a health check on the metadata backend.
    pub async fn health_check(&self) -> Result<ServiceHealth> {
        let started_at = Instant::now();
        let health =
            bounded(self.timeout, "metadata health check", self.inner.health_check()).await?;
        Ok(health.with_response_time(started_at.elapsed()))
    }

    fn in_request_order(ids: &[ItemId], rows: Vec<ItemMetadata>) -> Vec<ItemMetadata> {
        let by_id: HashMap<ItemId, ItemMetadata> =
            rows.into_iter().map(|row| (row.id, row)).collect();
        ids.iter().filter_map(|id| by_id.get(id).cloned()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    struct ReversedProvider(Vec<ItemMetadata>);

    #[async_trait::async_trait]
    impl MetadataProvider for ReversedProvider {
        async fn get_by_ids(&self, ids: &[ItemId]) -> Result<Vec<ItemMetadata>> {
            let mut rows: Vec<_> = self
                .0
                .iter()
                .filter(|row| ids.contains(&row.id))
                .cloned()
                .collect();
            rows.reverse();
            Ok(rows)
        }

        async fn health_check(&self) -> Result<ServiceHealth> {
            Ok(ServiceHealth::healthy())
        }
    }

    fn store() -> MetadataStore {
        MetadataStore::new(ReversedProvider(vec![
            ItemMetadata::new(1, "a.jpg"),
            ItemMetadata::new(2, "b.jpg"),
            ItemMetadata::new(3, "c.jpg"),
        ]))
    }

    #[tokio::test]
    async fn test_results_follow_request_order() {
        let rows = store().get_by_ids(&[3, 9, 1, 2]).await.unwrap();
        let ids: Vec<_> = rows.iter().map(|row| row.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[tokio::test]
    async fn test_missing_single_id_is_not_found() {
        let error = store().get_by_id(42).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::NotFound);
        assert_eq!(store().get_by_id(2).await.unwrap().path, "b.jpg");
    }

    #[tokio::test]
    async fn test_empty_lookup_skips_backend() {
        assert!(store().get_by_ids(&[]).await.unwrap().is_empty());
    }
}
