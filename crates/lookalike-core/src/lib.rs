#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod deadline;
mod error;
mod health;

pub mod inference;
pub mod metadata;
#[doc(hidden)]
pub mod prelude;
pub mod store;
pub mod types;

pub use deadline::DEFAULT_TIMEOUT;
pub use error::{BoxedError, Error, ErrorKind, Result};
pub use health::{ServiceHealth, ServiceStatus};
#[cfg(feature = "test-utils")]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub use inference::MockEmbeddingProvider;
pub use inference::{EmbeddingProvider, EmbeddingService};
pub use metadata::{MetadataProvider, MetadataStore};
pub use store::{VectorStore, VectorStoreProvider};
