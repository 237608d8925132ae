//! Embedding provider implementation.
//!
//! Implements [`EmbeddingProvider`] for [`ReqwestClient`].

mod payload;

use std::time::Instant;

use lookalike_core::inference::{EmbeddingRequest, EmbeddingResponse};
use lookalike_core::{EmbeddingProvider, ServiceHealth};

use self::payload::{EmbedPayload, EmbedReply};
use crate::connect::{ReqwestClient, TRACING_TARGET};
use crate::error::{Error, Result};

/// Longest response body excerpt kept in a status error.
const ERROR_BODY_LIMIT: usize = 512;

impl ReqwestClient {
    /// Posts `payload` and decodes the service reply.
    async fn post(&self, payload: &EmbedPayload<'_>) -> Result<EmbedReply> {
        let response = self
            .http()
            .post(self.config().inference_url.clone())
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let body = String::from_utf8_lossy(&body)
                .chars()
                .take(ERROR_BODY_LIMIT)
                .collect();
            return Err(Error::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for ReqwestClient {
    async fn embed(&self, request: &EmbeddingRequest) -> lookalike_core::Result<EmbeddingResponse> {
        let started_at = Instant::now();
        let payload = EmbedPayload::from(&request.input);

        tracing::debug!(
            target: TRACING_TARGET,
            request_id = %request.request_id,
            modality = %request.modality(),
            payload_size = request.payload_size(),
            "Requesting embeddings"
        );

        let reply = self.post(&payload).await.inspect_err(|error| {
            tracing::warn!(
                target: TRACING_TARGET,
                request_id = %request.request_id,
                error = %error,
                elapsed_ms = started_at.elapsed().as_millis(),
                "Embedding request failed"
            );
        })?;

        let embed = reply.into_vectors();
        tracing::debug!(
            target: TRACING_TARGET,
            request_id = %request.request_id,
            vectors = embed.len(),
            elapsed_ms = started_at.elapsed().as_millis(),
            "Embedding request completed"
        );

        Ok(request.reply(embed))
    }

    async fn health_check(&self) -> lookalike_core::Result<ServiceHealth> {
        let started_at = Instant::now();
        let probe = EmbeddingRequest::text("health check");

        let health = match self.post(&EmbedPayload::from(&probe.input)).await {
            Ok(reply) if reply.is_empty() => {
                ServiceHealth::degraded("inference service returned no embeddings")
            }
            Ok(_) => ServiceHealth::healthy(),
            Err(error) => ServiceHealth::unhealthy(error.to_string()),
        };

        Ok(health.with_response_time(started_at.elapsed()))
    }
}
