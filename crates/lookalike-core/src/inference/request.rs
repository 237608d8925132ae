//! Embedding request types.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::response::EmbeddingResponse;
use crate::types::{EmbeddingVector, Modality};

/// Input accepted by the inference service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum EmbeddingInput {
    /// Raw encoded image bytes.
    Image {
        /// Encoded image (JPEG, PNG, ...).
        bytes: Bytes,
    },
    /// One or more text queries.
    Text {
        /// Query texts, embedded independently.
        texts: Vec<String>,
    },
}

/// A single embedding request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingRequest {
    /// Unique identifier for this request.
    pub request_id: Uuid,
    /// Input to embed.
    pub input: EmbeddingInput,
}

impl EmbeddingRequest {
    /// Creates a request from an input.
    pub fn new(input: EmbeddingInput) -> Self {
        Self {
            request_id: Uuid::now_v7(),
            input,
        }
    }

    /// Creates an image embedding request.
    pub fn image(bytes: impl Into<Bytes>) -> Self {
        Self::new(EmbeddingInput::Image {
            bytes: bytes.into(),
        })
    }

    /// Creates a request for a single text query.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(EmbeddingInput::Text {
            texts: vec![text.into()],
        })
    }

    /// Creates a request for several text queries.
    pub fn texts(texts: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::new(EmbeddingInput::Text {
            texts: texts.into_iter().map(Into::into).collect(),
        })
    }

    /// Returns the modality of the produced embeddings.
    pub fn modality(&self) -> Modality {
        match self.input {
            EmbeddingInput::Image { .. } => Modality::Image,
            EmbeddingInput::Text { .. } => Modality::Text,
        }
    }

    /// Number of vectors a well-behaved provider returns for this request.
    pub fn expected_count(&self) -> usize {
        match &self.input {
            EmbeddingInput::Image { .. } => 1,
            EmbeddingInput::Text { texts } => texts.len(),
        }
    }

    /// Size of the request payload in bytes.
    pub fn payload_size(&self) -> usize {
        match &self.input {
            EmbeddingInput::Image { bytes } => bytes.len(),
            EmbeddingInput::Text { texts } => texts.iter().map(String::len).sum(),
        }
    }

    /// Builds a response to this request.
    pub fn reply(&self, embed: Vec<EmbeddingVector>) -> EmbeddingResponse {
        EmbeddingResponse::new(self.request_id, embed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let image = EmbeddingRequest::image(vec![0xff, 0xd8, 0xff]);
        assert_eq!(image.modality(), Modality::Image);
        assert_eq!(image.expected_count(), 1);
        assert_eq!(image.payload_size(), 3);

        let text = EmbeddingRequest::texts(["a cat", "a dog"]);
        assert_eq!(text.modality(), Modality::Text);
        assert_eq!(text.expected_count(), 2);
    }

    #[test]
    fn test_reply_carries_request_id() {
        let request = EmbeddingRequest::text("a cat");
        let response = request.reply(vec![EmbeddingVector::new(vec![1.0])]);
        assert_eq!(response.request_id, request.request_id);
    }
}
