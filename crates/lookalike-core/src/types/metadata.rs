//! Caller-visible item metadata resolved from the external store.

use serde::{Deserialize, Serialize};

use super::ItemId;

/// Display metadata for an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemMetadata {
    /// Item identifier.
    pub id: ItemId,
    /// Location of the full-size image.
    pub path: String,
    /// Location of the thumbnail, if one was generated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_path: Option<String>,
    /// Tags attached to the item.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ItemMetadata {
    /// Creates metadata without a thumbnail or tags.
    pub fn new(id: ItemId, path: impl Into<String>) -> Self {
        Self {
            id,
            path: path.into(),
            thumbnail_path: None,
            tags: Vec::new(),
        }
    }

    /// Sets the thumbnail location.
    pub fn with_thumbnail(mut self, thumbnail_path: impl Into<String>) -> Self {
        self.thumbnail_path = Some(thumbnail_path.into());
        self
    }

    /// Sets the tags.
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Returns true if every tag in `required` is attached to the item.
    pub fn has_all_tags(&self, required: &[String]) -> bool {
        required.iter().all(|tag| self.tags.contains(tag))
    }
}

/// A search hit: metadata plus the similarity that placed it in the results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Resolved item metadata.
    #[serde(flatten)]
    pub metadata: ItemMetadata,
    /// Similarity to the query, `1 - distance`.
    pub similarity: f64,
}
