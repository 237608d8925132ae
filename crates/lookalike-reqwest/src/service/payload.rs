//! Wire format of the inference service.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use lookalike_core::inference::EmbeddingInput;
use lookalike_core::types::EmbeddingVector;
use serde::{Deserialize, Serialize};

/// Request body.
#[derive(Debug, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub(crate) enum EmbedPayload<'a> {
    /// Base64-encoded image.
    Image { image: String },
    /// Text queries.
    Text { texts: &'a [String] },
}

impl<'a> From<&'a EmbeddingInput> for EmbedPayload<'a> {
    fn from(input: &'a EmbeddingInput) -> Self {
        match input {
            EmbeddingInput::Image { bytes } => Self::Image {
                image: STANDARD.encode(bytes),
            },
            EmbeddingInput::Text { texts } => Self::Text { texts },
        }
    }
}

/// One entry of the `embed` array.
///
/// Image requests produce a flat vector. Text requests may produce either one
/// flat vector per query or a single entry holding the whole batch.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum EmbedEntry {
    Single(Vec<f32>),
    Batch(Vec<Vec<f32>>),
}

/// Response body.
#[derive(Debug, Deserialize)]
pub(crate) struct EmbedReply {
    pub embed: Vec<EmbedEntry>,
}

impl EmbedReply {
    /// True when the reply carries no vectors at all.
    pub fn is_empty(&self) -> bool {
        self.embed
            .iter()
            .all(|entry| matches!(entry, EmbedEntry::Batch(vectors) if vectors.is_empty()))
    }

    /// Flattens the reply into vectors in request order.
    pub fn into_vectors(self) -> Vec<EmbeddingVector> {
        self.embed
            .into_iter()
            .flat_map(|entry| match entry {
                EmbedEntry::Single(vector) => vec![EmbeddingVector::new(vector)],
                EmbedEntry::Batch(vectors) => vectors.into_iter().map(EmbeddingVector::new).collect(),
            })
            .collect()
    }
}
