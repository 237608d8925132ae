//! Vector record store contract.
//!
//! The store owns [`VectorRecord`] rows and answers nearest-by-distance
//! queries. Backends implement [`VectorStoreProvider`]; the rest of the system
//! talks to them through the cloneable [`VectorStore`] wrapper, which adds
//! logging, a bounded timeout and shape validation of returned rows.
//!
//! [`VectorRecord`]: crate::types::VectorRecord

mod query;
mod service;

pub use query::{DistanceRange, NearestQuery, SortOrder};
pub use service::VectorStore;

use crate::types::{DistanceResult, ItemId, VectorRecord};
use crate::{Result, ServiceHealth};

/// Tracing target for vector store operations.
pub const TRACING_TARGET: &str = "lookalike_core::store";

/// Trait for vector record store backends.
///
/// Implementations must support unbounded queries (`limit == None`): the band
/// ranker needs the full candidate distribution, not a pre-truncated top-k.
#[async_trait::async_trait]
pub trait VectorStoreProvider: Send + Sync {
    /// Inserts a new record.
    ///
    /// Fails with a conflict error if the id already exists and with a
    /// validation error if an embedding has the wrong dimension.
    async fn insert(&self, record: VectorRecord) -> Result<()>;

    /// Deletes a record. Deleting a missing id is not an error.
    async fn delete(&self, id: ItemId) -> Result<()>;

    /// Returns records within the query's distance range, ordered and limited
    /// as requested.
    async fn nearest(&self, query: &NearestQuery) -> Result<Vec<DistanceResult>>;

    /// Performs a health check on the store.
    async fn health_check(&self) -> Result<ServiceHealth>;
}
