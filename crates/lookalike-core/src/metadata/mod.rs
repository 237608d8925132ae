//! Metadata lookup for ranked item ids.
//!
//! The relational store of item paths, thumbnails and tags belongs to the
//! surrounding application. The pipeline only needs to map ids back to
//! [`ItemMetadata`], which is what [`MetadataProvider`] describes.

mod service;

pub use service::MetadataStore;

use crate::types::{ItemId, ItemMetadata};
use crate::{Result, ServiceHealth};

/// Tracing target for metadata lookups.
pub const TRACING_TARGET: &str = "lookalike_core::metadata";

/// Trait for metadata lookup backends.
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Returns metadata for the ids that exist, in no particular order.
    ///
    /// Unknown ids are silently skipped.
    async fn get_by_ids(&self, ids: &[ItemId]) -> Result<Vec<ItemMetadata>>;

    /// Performs a health check on the metadata backend.
    async fn health_check(&self) -> Result<ServiceHealth>;
}
