//! Commonly used items from lookalike-core.
//!
//! ```rust,ignore
//! use lookalike_core::prelude::*;
//! ```

// Inference
pub use crate::inference::{
    EmbeddingInput, EmbeddingProvider, EmbeddingRequest, EmbeddingResponse, EmbeddingService,
};
#[cfg(feature = "test-utils")]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub use crate::inference::MockEmbeddingProvider;
// Collaborators
pub use crate::metadata::{MetadataProvider, MetadataStore};
pub use crate::store::{
    DistanceRange, NearestQuery, SortOrder, VectorStore, VectorStoreProvider,
};
// Data model
pub use crate::types::{
    DistanceResult, EmbeddingDimensions, EmbeddingVector, ItemId, ItemMetadata, Modality,
    RankedResult, SearchHit, VectorRecord,
};
pub use crate::{BoxedError, Error, ErrorKind, Result, ServiceHealth, ServiceStatus};
