//! HTTP client and its configuration.

mod client;
mod config;

pub use client::{ReqwestClient, TRACING_TARGET};
pub use config::{DEFAULT_TIMEOUT_SECS, ReqwestConfig};
