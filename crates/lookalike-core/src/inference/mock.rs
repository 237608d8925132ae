//! Deterministic mock embedding provider for testing.
//!
//! This module is only available when the `test-utils` feature is enabled:
//!
//! ```toml
//! [dev-dependencies]
//! lookalike-core = { version = "...", features = ["test-utils"] }
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use super::{EmbeddingInput, EmbeddingProvider, EmbeddingRequest, EmbeddingResponse};
use crate::types::EmbeddingVector;
use crate::{Error, Result, ServiceHealth};

/// Mock provider that derives vectors from a hash of the input.
///
/// Identical inputs always map to identical vectors, so duplicate detection
/// can be exercised end to end. Specific text queries can be pinned to known
/// vectors with [`MockEmbeddingProvider::with_text_embedding`].
#[derive(Clone, Debug)]
pub struct MockEmbeddingProvider {
    dimensions: usize,
    pinned: Arc<HashMap<String, EmbeddingVector>>,
    unavailable: bool,
}

impl MockEmbeddingProvider {
    /// Creates a new mock provider producing vectors of `dimensions` width.
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            pinned: Arc::default(),
            unavailable: false,
        }
    }

    /// Creates a mock provider whose every call fails with a dependency error.
    pub fn unavailable(dimensions: usize) -> Self {
        Self {
            unavailable: true,
            ..Self::new(dimensions)
        }
    }

    /// Pins the embedding returned for a text query.
    pub fn with_text_embedding(mut self, text: impl Into<String>, vector: EmbeddingVector) -> Self {
        Arc::make_mut(&mut self.pinned).insert(text.into(), vector);
        self
    }

    fn hashed(&self, input: &[u8]) -> EmbeddingVector {
        // FNV-1a seed, xorshift stream.
        let mut state = input.iter().fold(0xcbf2_9ce4_8422_2325_u64, |hash, byte| {
            (hash ^ u64::from(*byte)).wrapping_mul(0x0000_0100_0000_01b3)
        });

        let mut values: Vec<f32> = (0..self.dimensions)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                ((state >> 40) as f32 / (1u64 << 24) as f32) * 2.0 - 1.0
            })
            .collect();

        if let Some(first) = values.first_mut()
            && *first == 0.0
        {
            *first = 1.0;
        }

        EmbeddingVector::new(values)
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed(&self, request: &EmbeddingRequest) -> Result<EmbeddingResponse> {
        if self.unavailable {
            return Err(Error::dependency().with_message("mock inference service is unavailable"));
        }

        let embed = match &request.input {
            EmbeddingInput::Image { bytes } => vec![self.hashed(bytes)],
            EmbeddingInput::Text { texts } => texts
                .iter()
                .map(|text| {
                    self.pinned
                        .get(text)
                        .cloned()
                        .unwrap_or_else(|| self.hashed(text.as_bytes()))
                })
                .collect(),
        };

        Ok(request.reply(embed))
    }

    async fn health_check(&self) -> Result<ServiceHealth> {
        if self.unavailable {
            return Ok(ServiceHealth::unhealthy("mock inference service is unavailable"));
        }
        Ok(ServiceHealth::healthy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Modality;

    #[tokio::test]
    async fn test_same_input_same_vector() {
        let provider = MockEmbeddingProvider::new(16);

        let a = provider.embed(&EmbeddingRequest::image(&b"pixels"[..])).await.unwrap();
        let b = provider.embed(&EmbeddingRequest::image(&b"pixels"[..])).await.unwrap();
        let c = provider.embed(&EmbeddingRequest::image(&b"other"[..])).await.unwrap();

        assert_eq!(a.embed, b.embed);
        assert_ne!(a.embed, c.embed);

        let vector = a.into_first().unwrap();
        assert!(vector.validate(Modality::Image, 16).is_ok());
    }

    #[tokio::test]
    async fn test_pinned_text_embedding() {
        let pinned = EmbeddingVector::new(vec![0.0, 1.0]);
        let provider = MockEmbeddingProvider::new(2).with_text_embedding("cat", pinned.clone());

        let response = provider.embed(&EmbeddingRequest::text("cat")).await.unwrap();
        assert_eq!(response.into_first().unwrap(), pinned);
    }

    #[tokio::test]
    async fn test_unavailable_provider_fails() {
        let provider = MockEmbeddingProvider::unavailable(4);
        let error = provider.embed(&EmbeddingRequest::text("cat")).await.unwrap_err();
        assert!(error.is_dependency());
    }
}
