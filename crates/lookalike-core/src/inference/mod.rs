//! Turning images and captions into embedding vectors.
//!
//! Image and text embeddings share one space: a text query is compared
//! directly against stored image vectors.
//!
//! # Example
//!
//! ```rust,ignore
//! use lookalike_core::inference::{EmbeddingRequest, EmbeddingService};
//!
//! let service = EmbeddingService::from_provider(my_provider);
//! let response = service.embed(&EmbeddingRequest::text("red bicycle")).await?;
//! let vector = response.into_first()?;
//! ```

#[cfg(feature = "test-utils")]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
mod mock;
mod service;

pub mod request;
pub mod response;

#[cfg(feature = "test-utils")]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub use mock::MockEmbeddingProvider;
pub use request::{EmbeddingInput, EmbeddingRequest};
pub use response::EmbeddingResponse;
pub use service::EmbeddingService;

use crate::{Result, ServiceHealth};

/// Tracing target for embedding calls.
pub const TRACING_TARGET: &str = "lookalike_core::inference";

/// Backend that computes embeddings, usually a remote model server.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds the request input.
    ///
    /// An image yields one vector. Text yields one vector per query, in the
    /// order the queries were given.
    async fn embed(&self, request: &EmbeddingRequest) -> Result<EmbeddingResponse>;

    /// Probes the backend without embedding anything.
    async fn health_check(&self) -> Result<ServiceHealth>;
}
