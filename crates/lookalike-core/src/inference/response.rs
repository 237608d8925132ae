//! Vectors returned by the inference service.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::EmbeddingVector;
use crate::{Error, Result};

/// Vectors produced for one [`EmbeddingRequest`](super::EmbeddingRequest).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingResponse {
    /// Time-ordered identifier assigned on receipt.
    pub response_id: Uuid,
    /// Identifier of the request being answered.
    pub request_id: Uuid,
    /// One vector per input, in input order.
    pub embed: Vec<EmbeddingVector>,
}

impl EmbeddingResponse {
    pub fn new(request_id: Uuid, embed: Vec<EmbeddingVector>) -> Self {
        Self {
            response_id: Uuid::now_v7(),
            request_id,
            embed,
        }
    }

    pub fn len(&self) -> usize {
        self.embed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.embed.is_empty()
    }

    /// Width of the first vector; zero for an empty response.
    pub fn dimensions(&self) -> usize {
        self.embed.first().map_or(0, EmbeddingVector::dimensions)
    }

    /// Takes the first vector, failing with a dependency error when there is none.
    pub fn into_first(self) -> Result<EmbeddingVector> {
        self.embed.into_iter().next().ok_or_else(|| {
            Error::dependency().with_message("inference service returned no embeddings")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_response_has_no_first() {
        let response = EmbeddingResponse::new(Uuid::now_v7(), Vec::new());
        assert!(response.is_empty());
        assert_eq!(response.dimensions(), 0);
        assert!(response.into_first().unwrap_err().is_dependency());
    }
}
