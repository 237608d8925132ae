//! Pooled HTTP client bound to one inference endpoint.

use std::fmt;
use std::sync::Arc;

use lookalike_core::EmbeddingService;
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderValue};

use super::ReqwestConfig;
use crate::error::Result;

/// Tracing target for the inference HTTP client.
pub const TRACING_TARGET: &str = "lookalike_reqwest::client";

/// Client for the embedding inference service.
///
/// Implements [`EmbeddingProvider`](lookalike_core::EmbeddingProvider).
/// Clones share the underlying connection pool.
#[derive(Clone)]
pub struct ReqwestClient {
    shared: Arc<Shared>,
}

struct Shared {
    http: Client,
    config: ReqwestConfig,
}

impl ReqwestClient {
    /// Validates `config` and builds the HTTP client.
    ///
    /// Configured extra headers go out with every request, next to a JSON
    /// content type.
    pub fn new(config: ReqwestConfig) -> Result<Self> {
        config.validate()?;

        let mut default_headers = config.header_map()?;
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .default_headers(default_headers)
            .build()?;

        tracing::info!(
            target: TRACING_TARGET,
            endpoint = %config.inference_url,
            timeout_ms = config.timeout().as_millis(),
            headers = config.inference_headers.len(),
            "Inference client ready"
        );

        Ok(Self {
            shared: Arc::new(Shared { http, config }),
        })
    }

    pub(crate) fn http(&self) -> &Client {
        &self.shared.http
    }

    #[inline]
    pub fn config(&self) -> &ReqwestConfig {
        &self.shared.config
    }

    /// Wraps the client for use behind [`EmbeddingService`].
    pub fn into_service(self) -> EmbeddingService {
        EmbeddingService::from_provider(self)
    }
}

impl fmt::Debug for ReqwestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReqwestClient")
            .field("endpoint", &self.shared.config.inference_url.as_str())
            .field("timeout", &self.shared.config.timeout())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::*;
    use crate::Error;

    fn endpoint() -> Url {
        Url::parse("http://localhost:8070").unwrap()
    }

    #[test]
    fn test_client_keeps_extra_headers() {
        let config = ReqwestConfig::new(endpoint())
            .with_header("x-nuclio-function-name", "clip-function");

        let client = ReqwestClient::new(config).unwrap();
        assert_eq!(client.config().inference_headers.len(), 1);
        assert!(format!("{client:?}").contains("localhost:8070"));
    }

    #[test]
    fn test_malformed_header_is_rejected() {
        let mut config = ReqwestConfig::new(endpoint());
        config.inference_headers.push("bad header:value".into());

        assert!(matches!(ReqwestClient::new(config), Err(Error::Config(_))));
    }
}
