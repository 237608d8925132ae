//! Reqwest-based client for the embedding inference service.
//!
//! The service takes `{"mode": "image", "image": <base64>}` or
//! `{"mode": "text", "texts": [..]}` and answers `{"embed": [..]}`.
//! [`ReqwestClient`] implements [`EmbeddingProvider`] over that protocol.
//!
//! # Example
//!
//! ```rust,ignore
//! use lookalike_reqwest::{ReqwestClient, ReqwestConfig};
//!
//! let config = ReqwestConfig::new("http://nuclio:8070".parse()?)
//!     .with_header("x-nuclio-function-name", "clip-function");
//! let service = ReqwestClient::new(config)?.into_service();
//! ```
//!
//! [`EmbeddingProvider`]: lookalike_core::EmbeddingProvider

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod connect;
mod error;
mod service;

pub use crate::connect::{DEFAULT_TIMEOUT_SECS, ReqwestClient, ReqwestConfig, TRACING_TARGET};
pub use crate::error::{Error, Result};
