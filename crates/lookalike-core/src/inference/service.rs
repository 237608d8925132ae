//! Embedding service with observability.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::{EmbeddingProvider, EmbeddingRequest, EmbeddingResponse, TRACING_TARGET};
use crate::deadline::{DEFAULT_TIMEOUT, bounded};
use crate::{Error, Result, ServiceHealth};

/// Embedding service with observability.
///
/// This service wraps any provider implementing [`EmbeddingProvider`], adds
/// structured logging and a bounded timeout, and checks that the provider
/// answered with one vector per input.
#[derive(Clone)]
pub struct EmbeddingService {
    provider: Arc<dyn EmbeddingProvider>,
    timeout: Option<Duration>,
}

impl fmt::Debug for EmbeddingService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddingService")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl EmbeddingService {
    /// Creates a new embedding service from a provider.
    pub fn from_provider<P>(provider: P) -> Self
    where
        P: EmbeddingProvider + 'static,
    {
        Self {
            provider: Arc::new(provider),
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }

    /// Creates a service backed by the deterministic mock provider.
    #[cfg(feature = "test-utils")]
    #[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
    pub fn mock(dimensions: usize) -> Self {
        Self::from_provider(super::MockEmbeddingProvider::new(dimensions))
    }

    /// Sets the per-call timeout; `None` disables it.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Generates embeddings for the request.
    pub async fn embed(&self, request: &EmbeddingRequest) -> Result<EmbeddingResponse> {
        let started_at = Instant::now();

        tracing::debug!(
            target: TRACING_TARGET,
            request_id = %request.request_id,
            modality = %request.modality(),
            payload_size = request.payload_size(),
            "Processing embedding request"
        );

        let result = bounded(self.timeout, "embedding request", self.provider.embed(request))
            .await
            .and_then(|response| Self::check_response(request, response));
        let elapsed = started_at.elapsed();

        match &result {
            Ok(response) => tracing::debug!(
                target: TRACING_TARGET,
                request_id = %request.request_id,
                response_id = %response.response_id,
                count = response.len(),
                dimensions = response.dimensions(),
                elapsed_ms = elapsed.as_millis(),
                "Embedding generation successful"
            ),
            Err(error) => tracing::error!(
                target: TRACING_TARGET,
                request_id = %request.request_id,
                error = %error,
                elapsed_ms = elapsed.as_millis(),
                "Embedding generation failed"
            ),
        }

        result
    }

    /// Performs a health check on the inference service.
    pub async fn health_check(&self) -> Result<ServiceHealth> {
        let started_at = Instant::now();
        let health =
            bounded(self.timeout, "inference health check", self.provider.health_check()).await?;
        Ok(health.with_response_time(started_at.elapsed()))
    }

    fn check_response(
        request: &EmbeddingRequest,
        response: EmbeddingResponse,
    ) -> Result<EmbeddingResponse> {
        let expected = request.expected_count();
        if response.len() != expected {
            return Err(Error::dependency().with_message(format!(
                "inference service returned {} embeddings for {expected} inputs",
                response.len()
            )));
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EmbeddingVector;

    struct ShortProvider;

    #[async_trait::async_trait]
    impl EmbeddingProvider for ShortProvider {
        async fn embed(&self, request: &EmbeddingRequest) -> Result<EmbeddingResponse> {
            Ok(request.reply(vec![EmbeddingVector::new(vec![1.0, 0.0])]))
        }

        async fn health_check(&self) -> Result<ServiceHealth> {
            Ok(ServiceHealth::unhealthy("gateway down"))
        }
    }

    #[tokio::test]
    async fn test_count_mismatch_is_dependency_error() {
        let service = EmbeddingService::from_provider(ShortProvider);

        let single = service.embed(&EmbeddingRequest::text("a cat")).await.unwrap();
        assert_eq!(single.dimensions(), 2);

        let error = service
            .embed(&EmbeddingRequest::texts(["a cat", "a dog"]))
            .await
            .unwrap_err();
        assert!(error.is_dependency());
    }

    #[tokio::test]
    async fn test_health_check_passes_provider_status() {
        let health = EmbeddingService::from_provider(ShortProvider)
            .health_check()
            .await
            .unwrap();
        assert!(!health.is_healthy());
        assert_eq!(health.message.as_deref(), Some("gateway down"));
    }
}
