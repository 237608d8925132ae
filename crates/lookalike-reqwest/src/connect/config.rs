//! Configuration for the inference HTTP client.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for [`ReqwestClient`](crate::ReqwestClient).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct ReqwestConfig {
    /// Endpoint of the embedding inference service
    #[cfg_attr(
        feature = "config",
        arg(
            long = "inference-url",
            env = "INFERENCE_URL",
            default_value = "http://localhost:8070/"
        )
    )]
    pub inference_url: Url,

    /// Request timeout in seconds
    #[cfg_attr(
        feature = "config",
        arg(
            long = "inference-timeout-secs",
            env = "INFERENCE_TIMEOUT_SECS",
            default_value_t = DEFAULT_TIMEOUT_SECS
        )
    )]
    #[serde(default = "default_timeout_secs")]
    pub inference_timeout_secs: u64,

    /// Extra request headers as `name:value`, e.g. gateway routing headers
    #[cfg_attr(
        feature = "config",
        arg(
            long = "inference-header",
            env = "INFERENCE_HEADERS",
            value_delimiter = ','
        )
    )]
    #[serde(default)]
    pub inference_headers: Vec<String>,

    /// User-Agent header sent with every request
    #[cfg_attr(feature = "config", arg(skip = ReqwestConfig::default_user_agent()))]
    #[serde(default = "ReqwestConfig::default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl ReqwestConfig {
    /// Creates a configuration for the given endpoint.
    pub fn new(inference_url: Url) -> Self {
        Self {
            inference_url,
            inference_timeout_secs: DEFAULT_TIMEOUT_SECS,
            inference_headers: Vec::new(),
            user_agent: Self::default_user_agent(),
        }
    }

    fn default_user_agent() -> String {
        format!("lookalike/{}", env!("CARGO_PKG_VERSION"))
    }

    /// Sets the request timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.inference_timeout_secs = secs;
        self
    }

    /// Adds an extra request header.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.inference_headers
            .push(format!("{}:{}", name.as_ref(), value.as_ref()));
        self
    }

    /// Returns the effective timeout, using the default if zero.
    pub fn timeout(&self) -> Duration {
        match self.inference_timeout_secs {
            0 => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            secs => Duration::from_secs(secs),
        }
    }

    /// Parses the extra headers.
    pub fn header_map(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::with_capacity(self.inference_headers.len());
        for entry in &self.inference_headers {
            let (name, value) = entry
                .split_once(':')
                .ok_or_else(|| Error::Config(format!("header '{entry}' is not 'name:value'")))?;

            let name = HeaderName::from_bytes(name.trim().as_bytes())
                .map_err(|e| Error::Config(format!("invalid header name in '{entry}': {e}")))?;
            let value = HeaderValue::from_str(value.trim())
                .map_err(|e| Error::Config(format!("invalid header value in '{entry}': {e}")))?;
            headers.append(name, value);
        }

        Ok(headers)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.inference_url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "inference URL must use http or https, got '{}'",
                self.inference_url.scheme()
            )));
        }

        self.header_map().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ReqwestConfig {
        ReqwestConfig::new(Url::parse("http://localhost:8070").unwrap())
    }

    #[test]
    fn test_config_defaults() {
        let config = config();
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(config.user_agent.starts_with("lookalike/"));
        assert!(config.header_map().unwrap().is_empty());
    }

    #[test]
    fn test_zero_timeout_uses_default() {
        assert_eq!(config().with_timeout_secs(0).timeout(), Duration::from_secs(30));
        assert_eq!(config().with_timeout_secs(5).timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_gateway_headers_are_parsed() {
        let config = config()
            .with_header("x-nuclio-function-name", "clip-function")
            .with_header("x-nuclio-function-namespace", " nuclio ");

        let headers = config.header_map().unwrap();
        assert_eq!(headers["x-nuclio-function-name"], "clip-function");
        assert_eq!(headers["x-nuclio-function-namespace"], "nuclio");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut missing_colon = config();
        missing_colon.inference_headers.push("no-separator".into());
        assert!(matches!(missing_colon.validate(), Err(Error::Config(_))));

        let ftp = ReqwestConfig::new(Url::parse("ftp://localhost/clip").unwrap());
        assert!(ftp.validate().is_err());
    }

    #[test]
    fn test_deserialize_applies_defaults() {
        let config: ReqwestConfig =
            serde_json::from_str(r#"{ "inference_url": "http://clip:8080/" }"#).unwrap();
        assert_eq!(config.inference_timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(config.inference_headers.is_empty());
    }
}
