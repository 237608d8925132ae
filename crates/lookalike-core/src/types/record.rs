//! Stored embedding rows.

use serde::{Deserialize, Serialize};

use super::{EmbeddingDimensions, EmbeddingVector, Modality};
use crate::Result;

/// Identifier shared with the external metadata store.
pub type ItemId = i64;

/// Embedding row owned by the vector record store.
///
/// Records are never partially updated: replacing an embedding means deleting
/// the record and inserting it again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    /// Item identifier, unique within the store.
    pub id: ItemId,
    /// Image embedding.
    pub image_embedding: EmbeddingVector,
    /// Text embedding, absent when the item has no caption.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_embedding: Option<EmbeddingVector>,
}

impl VectorRecord {
    /// Creates a record with only an image embedding.
    pub fn new(id: ItemId, image_embedding: EmbeddingVector) -> Self {
        Self {
            id,
            image_embedding,
            text_embedding: None,
        }
    }

    /// Attaches a text embedding.
    pub fn with_text_embedding(mut self, text_embedding: EmbeddingVector) -> Self {
        self.text_embedding = Some(text_embedding);
        self
    }

    /// Returns the embedding stored for a modality, if any.
    pub fn embedding(&self, modality: Modality) -> Option<&EmbeddingVector> {
        match modality {
            Modality::Image => Some(&self.image_embedding),
            Modality::Text => self.text_embedding.as_ref(),
        }
    }

    /// Validates both embeddings against the configured widths.
    pub fn validate(&self, dimensions: &EmbeddingDimensions) -> Result<()> {
        dimensions.check(&self.image_embedding, Modality::Image)?;
        if let Some(text) = &self.text_embedding {
            dimensions.check(text, Modality::Text)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_by_modality() {
        let record = VectorRecord::new(7, EmbeddingVector::new(vec![1.0, 0.0]));
        assert!(record.embedding(Modality::Image).is_some());
        assert!(record.embedding(Modality::Text).is_none());

        let record = record.with_text_embedding(EmbeddingVector::new(vec![0.0, 1.0, 0.0]));
        assert_eq!(
            record.embedding(Modality::Text).map(|v| v.dimensions()),
            Some(3)
        );
    }

    #[test]
    fn test_validate_checks_text_embedding() {
        let dimensions = EmbeddingDimensions::new(2, 3);
        let record = VectorRecord::new(1, EmbeddingVector::new(vec![1.0, 0.0]))
            .with_text_embedding(EmbeddingVector::new(vec![1.0, 0.0]));

        assert!(record.validate(&dimensions).is_err());
    }
}
