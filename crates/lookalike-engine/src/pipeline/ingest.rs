//! Ingestion path.

use std::future::Future;
use std::time::Instant;

use lookalike_core::types::{DistanceResult, EmbeddingVector, ItemId, Modality, VectorRecord};
use lookalike_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::{Pipeline, TRACING_TARGET};
use crate::CANDIDATE_LIMIT;

/// A new item to ingest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestRequest {
    /// Identifier shared with the metadata store.
    pub id: ItemId,
    /// Image embedding, used for duplicate detection and tag suggestion.
    pub image_embedding: EmbeddingVector,
    /// Caption embedding, stored for text-to-text search.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_embedding: Option<EmbeddingVector>,
}

impl IngestRequest {
    /// Creates a request with only an image embedding.
    pub fn new(id: ItemId, image_embedding: EmbeddingVector) -> Self {
        Self {
            id,
            image_embedding,
            text_embedding: None,
        }
    }

    /// Attaches a caption embedding.
    pub fn with_text_embedding(mut self, text_embedding: EmbeddingVector) -> Self {
        self.text_embedding = Some(text_embedding);
        self
    }

    fn into_record(self) -> VectorRecord {
        VectorRecord {
            id: self.id,
            image_embedding: self.image_embedding,
            text_embedding: self.text_embedding,
        }
    }
}

/// What happened to an ingested item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum IngestOutcome {
    /// A stored record is within the duplicate threshold; nothing was inserted.
    Duplicate {
        /// The closest stored record.
        existing: DistanceResult,
        /// Tags of the existing record, offered as suggestions.
        tags: Vec<String>,
    },
    /// The record was inserted.
    Inserted {
        /// Identifier of the new record.
        id: ItemId,
        /// Nearest non-duplicate neighbour at insertion time.
        nearest: Option<DistanceResult>,
        /// Tags of the nearest neighbour.
        suggested_tags: Vec<String>,
    },
}

impl IngestOutcome {
    /// Returns true if the item was rejected as a duplicate.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }

    /// Returns true if the item was inserted.
    pub fn is_inserted(&self) -> bool {
        matches!(self, Self::Inserted { .. })
    }

    /// Tags suggested for the item.
    pub fn tags(&self) -> &[String] {
        match self {
            Self::Duplicate { tags, .. } => tags,
            Self::Inserted { suggested_tags, .. } => suggested_tags,
        }
    }
}

impl Pipeline {
    /// Ingests an item: duplicate check, tag suggestion, insert.
    pub async fn ingest(&self, request: IngestRequest) -> Result<IngestOutcome> {
        self.ingest_with_cancellation(request, CancellationToken::new())
            .await
    }

    /// Ingests an item, giving up if `cancel` fires before the insert.
    ///
    /// Once the insert has been dispatched it runs to completion on the
    /// runtime, even if this future is dropped or `cancel` fires.
    pub async fn ingest_with_cancellation(
        &self,
        request: IngestRequest,
        cancel: CancellationToken,
    ) -> Result<IngestOutcome> {
        let started_at = Instant::now();
        let id = request.id;

        tracing::debug!(
            target: TRACING_TARGET,
            id,
            has_text_embedding = request.text_embedding.is_some(),
            "Ingesting item"
        );

        self.config.dimensions.check(&request.image_embedding, Modality::Image)?;
        if let Some(text) = &request.text_embedding {
            self.config.dimensions.check(text, Modality::Text)?;
        }

        let guard = match &self.lock {
            Some(lock) => Some(
                stage(&cancel, "acquiring the ingest lock", async {
                    Ok(lock.acquire(&request.image_embedding).await)
                })
                .await?,
            ),
            None => None,
        };

        let duplicate = stage(
            &cancel,
            "the duplicate check",
            self.duplicates
                .is_duplicate(&request.image_embedding, Modality::Image),
        )
        .await?;

        if let Some(existing) = duplicate {
            let tags = stage(&cancel, "the tag lookup", self.tags_of(existing.id)).await?;

            tracing::info!(
                target: TRACING_TARGET,
                id,
                existing_id = existing.id,
                distance = existing.distance,
                elapsed_ms = started_at.elapsed().as_millis(),
                "Duplicate detected, item not inserted"
            );

            return Ok(IngestOutcome::Duplicate { existing, tags });
        }

        let candidates = stage(
            &cancel,
            "the candidate lookup",
            self.similarity.find_candidates(
                &request.image_embedding,
                Modality::Image,
                CANDIDATE_LIMIT,
            ),
        )
        .await?;

        let nearest = candidates.first().copied();
        let suggested_tags = match nearest {
            Some(nearest) => stage(&cancel, "the tag lookup", self.tags_of(nearest.id)).await?,
            None => Vec::new(),
        };

        if cancel.is_cancelled() {
            return Err(cancelled("the insert"));
        }

        let store = self.store.clone();
        let record = request.into_record();
        let insert = tokio::spawn(async move {
            let result = store.insert(record).await;
            drop(guard);
            result
        });

        insert.await.map_err(|error| {
            Error::dependency()
                .with_message("vector store insert task failed")
                .with_source(error)
        })??;

        tracing::info!(
            target: TRACING_TARGET,
            id,
            nearest_id = nearest.map(|n| n.id),
            suggested_tags = suggested_tags.len(),
            elapsed_ms = started_at.elapsed().as_millis(),
            "Item ingested"
        );

        Ok(IngestOutcome::Inserted {
            id,
            nearest,
            suggested_tags,
        })
    }

    async fn tags_of(&self, id: ItemId) -> Result<Vec<String>> {
        let metadata = self.metadata.get_by_ids(&[id]).await?;
        Ok(metadata
            .into_iter()
            .next()
            .map(|item| item.tags)
            .unwrap_or_default())
    }
}

/// Runs one ingestion stage unless `cancel` fires first.
async fn stage<T, F>(cancel: &CancellationToken, name: &str, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(cancelled(name)),
        result = future => result,
    }
}

fn cancelled(stage: &str) -> Error {
    Error::cancelled().with_message(format!("ingestion cancelled before {stage}"))
}
