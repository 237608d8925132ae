#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod duplicate;
mod embedder;
pub mod memory;
pub mod pipeline;
pub mod ranker;
mod similarity;

pub use duplicate::{DUPLICATE_DISTANCE_THRESHOLD, DuplicateDetector};
pub use embedder::Embedder;
pub use memory::{MemoryMetadataStore, MemoryVectorStore};
pub use pipeline::{
    IngestOutcome, IngestRequest, Pipeline, PipelineConfig, PipelineHealth, SearchRequest,
    SearchResults,
};
pub use ranker::rank;
pub use similarity::{CANDIDATE_LIMIT, SimilarityEngine};
