//! Pipeline configuration.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use lookalike_core::types::EmbeddingDimensions;
use lookalike_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default per-call timeout for collaborators, in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

const MAX_TIMEOUT_MS: u64 = 300_000;

/// Configuration for the ingestion/query pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct PipelineConfig {
    /// Embedding widths per modality.
    #[cfg_attr(feature = "config", clap(flatten))]
    #[serde(default)]
    pub dimensions: EmbeddingDimensions,

    /// Timeout for every store, metadata and inference call, in milliseconds
    /// (0 disables it)
    #[cfg_attr(
        feature = "config",
        arg(
            long = "request-timeout-ms",
            env = "REQUEST_TIMEOUT_MS",
            default_value_t = DEFAULT_TIMEOUT_MS
        )
    )]
    #[serde(default = "default_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Serialize ingestion of identical embeddings
    #[cfg_attr(
        feature = "config",
        arg(long = "serialize-ingest", env = "SERIALIZE_INGEST")
    )]
    #[serde(default)]
    pub serialize_ingest: bool,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            dimensions: EmbeddingDimensions::default(),
            request_timeout_ms: DEFAULT_TIMEOUT_MS,
            serialize_ingest: false,
        }
    }
}

impl PipelineConfig {
    /// Creates a configuration with the given dimensions and defaults otherwise.
    pub fn new(dimensions: EmbeddingDimensions) -> Self {
        Self {
            dimensions,
            ..Default::default()
        }
    }

    /// Sets the per-call timeout; `None` disables it.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout_ms = timeout.map_or(0, |t| t.as_millis().max(1) as u64);
        self
    }

    /// Enables or disables the ingest lock.
    pub fn with_serialized_ingest(mut self, enabled: bool) -> Self {
        self.serialize_ingest = enabled;
        self
    }

    /// Returns the per-call timeout, `None` when disabled.
    #[inline]
    pub fn timeout(&self) -> Option<Duration> {
        (self.request_timeout_ms > 0).then(|| Duration::from_millis(self.request_timeout_ms))
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        self.dimensions.validate()?;
        if self.request_timeout_ms > MAX_TIMEOUT_MS {
            return Err(Error::configuration().with_message(format!(
                "request timeout must be at most {MAX_TIMEOUT_MS}ms, got {}ms",
                self.request_timeout_ms
            )));
        }
        Ok(())
    }
}
