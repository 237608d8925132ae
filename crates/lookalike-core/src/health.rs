//! Health reporting for external collaborators.
//!
//! Every collaborator trait exposes a `health_check` that returns a
//! [`ServiceHealth`]. The pipeline aggregates them so the process entry point
//! can report whether the store, the metadata lookup and the inference service
//! are reachable.

use std::collections::HashMap;
use std::time::Duration;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reachability of a collaborator, ordered from best to worst.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    /// Answering normally.
    #[default]
    Healthy,
    /// Answering, but slow or short on capacity.
    Degraded,
    /// Not answering.
    Unhealthy,
}

/// Result of one health probe.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub status: ServiceStatus,
    /// Round-trip time of the probe, when one was sent.
    pub response: Option<Duration>,
    /// Why the collaborator is not healthy.
    pub message: Option<String>,
    pub checked_at: Timestamp,
    /// Adapter-specific figures such as pool occupancy or record counts.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metrics: HashMap<String, Value>,
}

impl ServiceHealth {
    fn with_status(status: ServiceStatus, message: Option<String>) -> Self {
        Self {
            status,
            message,
            checked_at: Timestamp::now(),
            ..Default::default()
        }
    }

    pub fn healthy() -> Self {
        Self::with_status(ServiceStatus::Healthy, None)
    }

    pub fn degraded(message: impl Into<String>) -> Self {
        Self::with_status(ServiceStatus::Degraded, Some(message.into()))
    }

    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self::with_status(ServiceStatus::Unhealthy, Some(message.into()))
    }

    /// Records the probe's round-trip time.
    pub fn with_response_time(mut self, response_time: Duration) -> Self {
        self.response = Some(response_time);
        self
    }

    pub fn with_metric(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metrics.insert(key.into(), value);
        self
    }

    pub fn is_healthy(&self) -> bool {
        self.status == ServiceStatus::Healthy
    }
}
