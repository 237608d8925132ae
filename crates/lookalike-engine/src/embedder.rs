//! Turns raw inputs into validated query embeddings.

use std::time::Duration;

use lookalike_core::inference::{EmbeddingRequest, EmbeddingService};
use lookalike_core::types::{EmbeddingDimensions, EmbeddingVector, Modality};
use lookalike_core::{Error, Result, ServiceHealth};

/// Embeds images and text queries through the inference service.
///
/// Returned vectors are checked against the configured dimensions. A vector
/// the service got wrong is a dependency failure, not a caller mistake.
#[derive(Debug, Clone)]
pub struct Embedder {
    service: EmbeddingService,
    dimensions: EmbeddingDimensions,
}

impl Embedder {
    /// Creates an embedder over `service`.
    pub fn new(service: EmbeddingService, dimensions: EmbeddingDimensions) -> Self {
        Self {
            service,
            dimensions,
        }
    }

    /// Sets the per-call timeout of the underlying service.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.service = self.service.with_timeout(timeout);
        self
    }

    /// Embeds an encoded image.
    pub async fn embed_image(&self, image: Vec<u8>) -> Result<EmbeddingVector> {
        if image.is_empty() {
            return Err(Error::validation().with_message("image payload is empty"));
        }

        let response = self.service.embed(&EmbeddingRequest::image(image)).await?;
        self.checked(response.into_first()?, Modality::Image)
    }

    /// Embeds a single text query.
    pub async fn embed_text(&self, query: &str) -> Result<EmbeddingVector> {
        let mut vectors = self.embed_texts(&[query]).await?;
        vectors
            .pop()
            .ok_or_else(|| Error::dependency().with_message("inference service returned no embeddings"))
    }

    /// Embeds several text queries, one vector per query in order.
    pub async fn embed_texts(&self, queries: &[&str]) -> Result<Vec<EmbeddingVector>> {
        if queries.iter().any(|query| query.trim().is_empty()) {
            return Err(Error::validation().with_message("text query is empty"));
        }

        let request = EmbeddingRequest::texts(queries.iter().copied());
        let response = self.service.embed(&request).await?;

        response
            .embed
            .into_iter()
            .map(|vector| self.checked(vector, Modality::Text))
            .collect()
    }

    /// Returns the dimensions vectors are checked against.
    pub fn dimensions(&self) -> EmbeddingDimensions {
        self.dimensions
    }

    /// Performs a health check on the inference service.
    pub async fn health_check(&self) -> Result<ServiceHealth> {
        self.service.health_check().await
    }

    fn checked(&self, vector: EmbeddingVector, modality: Modality) -> Result<EmbeddingVector> {
        match self.dimensions.check(&vector, modality) {
            Ok(()) => Ok(vector),
            Err(error) => Err(Error::dependency()
                .with_message(format!("inference service returned an unusable {modality} embedding"))
                .with_source(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use lookalike_core::ErrorKind;
    use lookalike_core::inference::MockEmbeddingProvider;

    use super::*;

    fn embedder(provider: MockEmbeddingProvider, dimensions: usize) -> Embedder {
        Embedder::new(
            EmbeddingService::from_provider(provider),
            EmbeddingDimensions::uniform(dimensions),
        )
    }

    #[tokio::test]
    async fn test_embed_image_is_deterministic() {
        let embedder = embedder(MockEmbeddingProvider::new(8), 8);

        let a = embedder.embed_image(b"jpeg bytes".to_vec()).await.unwrap();
        let b = embedder.embed_image(b"jpeg bytes".to_vec()).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.dimensions(), 8);
    }

    #[tokio::test]
    async fn test_embed_text_uses_pinned_vector() {
        let pinned = EmbeddingVector::new(vec![0.0, 0.0, 1.0]);
        let provider = MockEmbeddingProvider::new(3).with_text_embedding("sunset", pinned.clone());

        let vector = embedder(provider, 3).embed_text("sunset").await.unwrap();
        assert_eq!(vector, pinned);
    }

    #[tokio::test]
    async fn test_wrong_width_from_service_is_dependency_error() {
        let error = embedder(MockEmbeddingProvider::new(4), 8)
            .embed_text("sunset")
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Dependency);
    }

    #[tokio::test]
    async fn test_empty_inputs_are_rejected() {
        let embedder = embedder(MockEmbeddingProvider::new(4), 4);

        assert!(embedder.embed_image(Vec::new()).await.unwrap_err().is_validation());
        assert!(embedder.embed_text("  ").await.unwrap_err().is_validation());
    }

    #[tokio::test]
    async fn test_unavailable_service() {
        let error = embedder(MockEmbeddingProvider::unavailable(4), 4)
            .embed_image(vec![1, 2, 3])
            .await
            .unwrap_err();
        assert!(error.is_dependency());
    }
}
