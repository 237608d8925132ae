//! Query paths: banded search and plain similar-item lookup.

use std::collections::HashMap;
use std::time::Instant;

use lookalike_core::Result;
use lookalike_core::types::{EmbeddingVector, ItemId, Modality, SearchHit};
use serde::{Deserialize, Serialize};

use super::{Pipeline, TRACING_TARGET};
use crate::{CANDIDATE_LIMIT, rank};

/// A search by query embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Query embedding.
    pub embedding: EmbeddingVector,
    /// Embedding column to compare against.
    pub modality: Modality,
    /// Only return items carrying every one of these tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_tags: Vec<String>,
}

impl SearchRequest {
    /// Creates a search against the given embedding column.
    pub fn new(embedding: EmbeddingVector, modality: Modality) -> Self {
        Self {
            embedding,
            modality,
            required_tags: Vec::new(),
        }
    }

    /// Restricts results to items carrying all of `tags`.
    pub fn with_required_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.required_tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// Ranked search hits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    /// Hits in rank order.
    pub hits: Vec<SearchHit>,
    /// Number of candidates the hits were selected from.
    pub candidates: usize,
}

impl SearchResults {
    /// Returns true if nothing matched.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Ids of the hits, in rank order.
    pub fn ids(&self) -> Vec<ItemId> {
        self.hits.iter().map(|hit| hit.metadata.id).collect()
    }
}

impl Pipeline {
    /// Searches with a query embedding and ranks the results into bands.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResults> {
        let started_at = Instant::now();
        self.config
            .dimensions
            .check(&request.embedding, request.modality)?;

        let candidates = self
            .similarity
            .find_all_candidates(&request.embedding, request.modality)
            .await?;
        let ranked = rank(&candidates);

        let scored: Vec<(ItemId, f64)> = ranked.iter().map(|r| (r.id, r.similarity)).collect();
        let hits = self.resolve(&scored, &request.required_tags).await?;

        tracing::debug!(
            target: TRACING_TARGET,
            modality = %request.modality,
            candidates = candidates.len(),
            ranked = ranked.len(),
            hits = hits.len(),
            elapsed_ms = started_at.elapsed().as_millis(),
            "Search completed"
        );

        Ok(SearchResults {
            hits,
            candidates: candidates.len(),
        })
    }

    /// Embeds a text query and searches image embeddings with it.
    pub async fn search_text(&self, query: &str, required_tags: &[String]) -> Result<SearchResults> {
        let embedding = self.embedder()?.embed_text(query).await?;
        let request = SearchRequest::new(embedding, Modality::Image)
            .with_required_tags(required_tags.iter().cloned());
        self.search(&request).await
    }

    /// Returns the nearest non-duplicate items without banding.
    pub async fn similar(
        &self,
        embedding: &EmbeddingVector,
        modality: Modality,
    ) -> Result<SearchResults> {
        let started_at = Instant::now();
        self.config.dimensions.check(embedding, modality)?;

        let candidates = self
            .similarity
            .find_candidates(embedding, modality, CANDIDATE_LIMIT)
            .await?;

        let scored: Vec<(ItemId, f64)> =
            candidates.iter().map(|c| (c.id, c.similarity())).collect();
        let hits = self.resolve(&scored, &[]).await?;

        tracing::debug!(
            target: TRACING_TARGET,
            modality = %modality,
            candidates = candidates.len(),
            hits = hits.len(),
            elapsed_ms = started_at.elapsed().as_millis(),
            "Similar lookup completed"
        );

        Ok(SearchResults {
            hits,
            candidates: candidates.len(),
        })
    }

    /// Maps scored ids to hits, keeping order and dropping ids without metadata.
    async fn resolve(
        &self,
        scored: &[(ItemId, f64)],
        required_tags: &[String],
    ) -> Result<Vec<SearchHit>> {
        let ids: Vec<ItemId> = scored.iter().map(|(id, _)| *id).collect();
        let mut metadata: HashMap<ItemId, _> = self
            .metadata
            .get_by_ids(&ids)
            .await?
            .into_iter()
            .map(|item| (item.id, item))
            .collect();

        let hits: Vec<SearchHit> = scored
            .iter()
            .filter_map(|(id, similarity)| {
                metadata.remove(id).map(|metadata| SearchHit {
                    metadata,
                    similarity: *similarity,
                })
            })
            .filter(|hit| hit.metadata.has_all_tags(required_tags))
            .collect();

        if hits.len() < scored.len() {
            tracing::debug!(
                target: TRACING_TARGET,
                scored = scored.len(),
                kept = hits.len(),
                "Dropped hits without metadata or required tags"
            );
        }

        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use lookalike_core::types::EmbeddingDimensions;
    use lookalike_core::{EmbeddingService, ErrorKind, MockEmbeddingProvider};

    use super::*;
    use crate::Embedder;
    use crate::pipeline::tests::{DIMENSIONS, Fixture, vector};

    /// Unit vector at `degrees` from the x axis.
    fn at(degrees: f64) -> [f32; 2] {
        let radians = degrees.to_radians();
        [radians.cos() as f32, radians.sin() as f32]
    }

    /// Similarity of a unit vector at `degrees` to the x axis.
    fn similarity_at(degrees: f64) -> f64 {
        degrees.to_radians().cos()
    }

    #[tokio::test]
    async fn test_search_returns_one_hit_per_band() {
        let fixture = Fixture::new();
        // Similarities to the x axis: 1.0, 0.95, 0.80, 0.80, 0.70.
        fixture.seed(1, &at(0.0), &["exact"]).await;
        fixture.seed(2, &at(18.19), &["close"]).await;
        fixture.seed(3, &at(36.87), &["mid"]).await;
        fixture.seed(4, &at(36.87), &["mid"]).await;
        fixture.seed(5, &at(45.57), &["far"]).await;

        let results = fixture
            .pipeline
            .search(&SearchRequest::new(vector(&at(0.0)), Modality::Image))
            .await
            .unwrap();

        assert_eq!(results.candidates, 4);
        assert_eq!(results.ids(), vec![2, 3, 5]);
        assert!((results.hits[0].similarity - similarity_at(18.19)).abs() < 1e-4);
        assert!(results.hits.iter().all(|hit| hit.metadata.id != 1));
    }

    #[tokio::test]
    async fn test_search_on_empty_store() {
        let fixture = Fixture::new();

        let results = fixture
            .pipeline
            .search(&SearchRequest::new(vector(&[1.0, 0.0]), Modality::Image))
            .await
            .unwrap();
        assert!(results.is_empty());
        assert_eq!(results.candidates, 0);
    }

    #[tokio::test]
    async fn test_search_drops_ids_without_metadata() {
        let fixture = Fixture::new();
        fixture.seed(1, &at(18.19), &[]).await;
        fixture.metadata.remove(1).await;

        let results = fixture
            .pipeline
            .search(&SearchRequest::new(vector(&at(0.0)), Modality::Image))
            .await
            .unwrap();
        assert!(results.is_empty());
        assert_eq!(results.candidates, 1);
    }

    #[tokio::test]
    async fn test_search_filters_required_tags() {
        let fixture = Fixture::new();
        fixture.seed(1, &at(18.19), &["cat", "outdoor"]).await;
        fixture.seed(2, &at(36.87), &["cat"]).await;

        let request = SearchRequest::new(vector(&at(0.0)), Modality::Image)
            .with_required_tags(["cat", "outdoor"]);
        let results = fixture.pipeline.search(&request).await.unwrap();
        assert_eq!(results.ids(), vec![1]);

        let request = SearchRequest::new(vector(&at(0.0)), Modality::Image)
            .with_required_tags(["dog"]);
        assert!(fixture.pipeline.search(&request).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_rejects_wrong_width() {
        let fixture = Fixture::new();

        let error = fixture
            .pipeline
            .search(&SearchRequest::new(vector(&[1.0, 0.0, 0.0]), Modality::Image))
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_similar_returns_nearest_without_banding() {
        let fixture = Fixture::new();
        for (id, degrees) in [(1, 0.0), (2, 20.0), (3, 21.0), (4, 22.0), (5, 23.0), (6, 24.0), (7, 90.0)] {
            fixture.seed(id, &at(degrees), &[]).await;
        }

        let results = fixture
            .pipeline
            .similar(&vector(&at(0.0)), Modality::Image)
            .await
            .unwrap();

        assert_eq!(results.ids(), vec![2, 3, 4, 5, 6]);
        assert!(results.hits.windows(2).all(|w| w[0].similarity >= w[1].similarity));
    }

    #[tokio::test]
    async fn test_search_text_compares_against_images() {
        let fixture = Fixture::new();
        fixture.seed(1, &at(18.19), &["sunset"]).await;

        let embedder = Embedder::new(
            EmbeddingService::from_provider(
                MockEmbeddingProvider::new(DIMENSIONS)
                    .with_text_embedding("a sunset", vector(&at(0.0))),
            ),
            EmbeddingDimensions::uniform(DIMENSIONS),
        );
        let pipeline = fixture.pipeline.clone().with_embedder(embedder);

        let results = pipeline.search_text("a sunset", &[]).await.unwrap();
        assert_eq!(results.ids(), vec![1]);

        let error = fixture.pipeline.search_text("a sunset", &[]).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Configuration);
    }
}
