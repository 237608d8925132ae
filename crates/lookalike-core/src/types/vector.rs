//! Embedding vectors and the modalities they belong to.

#[cfg(feature = "config")]
use clap::{Args, ValueEnum};
use derive_more::{Deref, From, Into};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, IntoStaticStr};

use crate::{Error, Result};

/// Default embedding width of the CLIP ViT-B/32 image and text encoders.
pub const DEFAULT_DIMENSIONS: usize = 512;

/// Which embedding space a vector (or a query) lives in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, Display, IntoStaticStr,
)]
#[cfg_attr(feature = "config", derive(ValueEnum))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Modality {
    /// Image embedding space.
    Image,
    /// Text embedding space.
    Text,
}

/// A fixed-length embedding produced by the inference service.
///
/// Values are not required to be unit-normalized; the distance function is
/// responsible for normalization.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Deref, From, Into)]
#[serde(transparent)]
pub struct EmbeddingVector(Vec<f32>);

impl EmbeddingVector {
    /// Wraps raw embedding values.
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    /// Returns the number of dimensions.
    #[inline]
    pub fn dimensions(&self) -> usize {
        self.0.len()
    }

    /// Returns the values as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Consumes the vector and returns the raw values.
    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }

    /// Returns the Euclidean norm.
    pub fn norm(&self) -> f32 {
        self.0.iter().map(|v| v * v).sum::<f32>().sqrt()
    }

    /// Checks the vector against the expected dimension for its modality.
    ///
    /// Empty, non-finite and all-zero vectors are rejected as well: cosine
    /// distance is undefined for them.
    pub fn validate(&self, modality: Modality, expected: usize) -> Result<()> {
        if self.0.is_empty() {
            return Err(Error::validation().with_message(format!("{modality} embedding is empty")));
        }

        if self.0.len() != expected {
            return Err(Error::validation().with_message(format!(
                "{modality} embedding has {} dimensions, expected {expected}",
                self.0.len()
            )));
        }

        if let Some(position) = self.0.iter().position(|v| !v.is_finite()) {
            return Err(Error::validation().with_message(format!(
                "{modality} embedding has a non-finite value at index {position}"
            )));
        }

        if self.0.iter().all(|v| *v == 0.0) {
            return Err(Error::validation().with_message(format!(
                "{modality} embedding is the zero vector"
            )));
        }

        Ok(())
    }
}

impl FromIterator<f32> for EmbeddingVector {
    fn from_iter<I: IntoIterator<Item = f32>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Configured embedding width per modality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct EmbeddingDimensions {
    /// Number of dimensions of image embeddings.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "image-dimensions",
            env = "IMAGE_EMBEDDING_DIMENSIONS",
            default_value_t = DEFAULT_DIMENSIONS
        )
    )]
    #[serde(default = "default_dimensions")]
    pub image: usize,

    /// Number of dimensions of text embeddings.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "text-dimensions",
            env = "TEXT_EMBEDDING_DIMENSIONS",
            default_value_t = DEFAULT_DIMENSIONS
        )
    )]
    #[serde(default = "default_dimensions")]
    pub text: usize,
}

fn default_dimensions() -> usize {
    DEFAULT_DIMENSIONS
}

impl Default for EmbeddingDimensions {
    fn default() -> Self {
        Self::uniform(DEFAULT_DIMENSIONS)
    }
}

impl EmbeddingDimensions {
    /// Creates dimensions with distinct widths per modality.
    pub fn new(image: usize, text: usize) -> Self {
        Self { image, text }
    }

    /// Creates dimensions where both modalities share one width.
    pub fn uniform(dimensions: usize) -> Self {
        Self::new(dimensions, dimensions)
    }

    /// Returns the expected width for a modality.
    #[inline]
    pub fn for_modality(&self, modality: Modality) -> usize {
        match modality {
            Modality::Image => self.image,
            Modality::Text => self.text,
        }
    }

    /// Validates a vector against the width configured for its modality.
    pub fn check(&self, vector: &EmbeddingVector, modality: Modality) -> Result<()> {
        vector.validate(modality, self.for_modality(modality))
    }

    /// Rejects zero widths.
    pub fn validate(&self) -> Result<()> {
        if self.image == 0 || self.text == 0 {
            return Err(Error::configuration().with_message("embedding dimensions must be non-zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_validate_accepts_matching_vector() {
        let vector = EmbeddingVector::new(vec![0.1, 0.2, 0.3]);
        assert!(vector.validate(Modality::Image, 3).is_ok());
    }

    #[test]
    fn test_validate_rejects_wrong_dimension() {
        let vector = EmbeddingVector::new(vec![0.1, 0.2]);
        let error = vector.validate(Modality::Text, 3).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Validation);
        assert!(error.to_string().contains("expected 3"));
    }

    #[test]
    fn test_validate_rejects_malformed_values() {
        let nan = EmbeddingVector::new(vec![0.1, f32::NAN]);
        let zero = EmbeddingVector::new(vec![0.0, 0.0]);
        let empty = EmbeddingVector::default();

        assert!(nan.validate(Modality::Image, 2).is_err());
        assert!(zero.validate(Modality::Image, 2).is_err());
        assert!(empty.validate(Modality::Image, 0).is_err());
    }

    #[test]
    fn test_dimensions_per_modality() {
        let dimensions = EmbeddingDimensions::new(512, 768);
        assert_eq!(dimensions.for_modality(Modality::Image), 512);
        assert_eq!(dimensions.for_modality(Modality::Text), 768);
        assert!(EmbeddingDimensions::uniform(0).validate().is_err());
    }

    #[test]
    fn test_modality_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Modality::Image).unwrap(), "\"image\"");
        assert_eq!(Modality::Text.to_string(), "text");
    }
}
