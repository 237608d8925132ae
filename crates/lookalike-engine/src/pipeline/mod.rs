//! Ingestion and query orchestration.
//!
//! [`Pipeline`] sequences the duplicate detector, the similarity engine and
//! the band ranker over injected collaborators:
//!
//! - **ingest**: validate, check for a duplicate, look up the nearest
//!   neighbour's tags, then insert;
//! - **search**: fetch every non-duplicate candidate, rank them into bands and
//!   resolve the ranked ids to metadata;
//! - **similar**: the five nearest non-duplicates, without banding;
//! - **delete**: remove the record from the vector store.
//!
//! Duplicate check and insert are not atomic. Two concurrent ingestions of
//! the same embedding can both pass the duplicate check and both insert
//! unless [`PipelineConfig::serialize_ingest`] is enabled.

mod config;
mod ingest;
mod lock;
mod search;

use std::fmt;

use futures::future;
use lookalike_core::types::ItemId;
use lookalike_core::{
    Error, MetadataStore, Result, ServiceHealth, ServiceStatus, VectorStore,
};
use serde::Serialize;

pub use config::{DEFAULT_TIMEOUT_MS, PipelineConfig};
pub use ingest::{IngestOutcome, IngestRequest};
pub use lock::{IngestGuard, IngestLock};
pub use search::{SearchRequest, SearchResults};

use crate::{DuplicateDetector, Embedder, SimilarityEngine};

/// Tracing target for pipeline operations.
pub const TRACING_TARGET: &str = "lookalike_engine::pipeline";

/// Ingestion/query orchestrator.
///
/// Cheap to clone: every collaborator is reference counted.
#[derive(Clone)]
pub struct Pipeline {
    store: VectorStore,
    metadata: MetadataStore,
    similarity: SimilarityEngine,
    duplicates: DuplicateDetector,
    embedder: Option<Embedder>,
    lock: Option<IngestLock>,
    config: PipelineConfig,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("embedder", &self.embedder.is_some())
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Creates a pipeline over the given collaborators.
    ///
    /// The configured timeout replaces the collaborators' own.
    pub fn new(store: VectorStore, metadata: MetadataStore, config: PipelineConfig) -> Result<Self> {
        config.validate()?;

        let store = store.with_timeout(config.timeout());
        let metadata = metadata.with_timeout(config.timeout());

        tracing::info!(
            target: TRACING_TARGET,
            image_dimensions = config.dimensions.image,
            text_dimensions = config.dimensions.text,
            timeout_ms = config.request_timeout_ms,
            serialize_ingest = config.serialize_ingest,
            "Pipeline created"
        );

        Ok(Self {
            similarity: SimilarityEngine::new(store.clone()),
            duplicates: DuplicateDetector::new(store.clone()),
            lock: config.serialize_ingest.then(IngestLock::new),
            embedder: None,
            store,
            metadata,
            config,
        })
    }

    /// Attaches an embedder for raw image and text inputs.
    ///
    /// The configured timeout replaces the embedder's own.
    pub fn with_embedder(mut self, embedder: Embedder) -> Self {
        self.embedder = Some(embedder.with_timeout(self.config.timeout()));
        self
    }

    /// Returns the pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Returns the attached embedder.
    pub fn embedder(&self) -> Result<&Embedder> {
        self.embedder.as_ref().ok_or_else(|| {
            Error::configuration().with_message("pipeline has no inference service attached")
        })
    }

    /// Deletes an item's vector record. Deleting a missing id succeeds.
    pub async fn delete(&self, id: ItemId) -> Result<()> {
        self.store.delete(id).await?;
        tracing::info!(target: TRACING_TARGET, id, "Item deleted");
        Ok(())
    }

    /// Checks every collaborator concurrently.
    pub async fn health(&self) -> PipelineHealth {
        let inference = async {
            match &self.embedder {
                Some(embedder) => Some(embedder.health_check().await),
                None => None,
            }
        };

        let (store, metadata, inference) = future::join3(
            self.store.health_check(),
            self.metadata.health_check(),
            inference,
        )
        .await;

        PipelineHealth {
            store: Self::health_or_unhealthy(store),
            metadata: Self::health_or_unhealthy(metadata),
            inference: inference.map(Self::health_or_unhealthy),
        }
    }

    fn health_or_unhealthy(result: Result<ServiceHealth>) -> ServiceHealth {
        result.unwrap_or_else(|error| ServiceHealth::unhealthy(error.to_string()))
    }
}

/// Health of every collaborator the pipeline talks to.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineHealth {
    /// Vector record store.
    pub store: ServiceHealth,
    /// Metadata lookup.
    pub metadata: ServiceHealth,
    /// Inference service, when an embedder is attached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inference: Option<ServiceHealth>,
}

impl PipelineHealth {
    /// The worst status among all collaborators.
    pub fn status(&self) -> ServiceStatus {
        [Some(&self.store), Some(&self.metadata), self.inference.as_ref()]
            .into_iter()
            .flatten()
            .map(|health| health.status)
            .max()
            .unwrap_or_default()
    }
}
