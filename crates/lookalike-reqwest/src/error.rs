//! Internal error types for lookalike-reqwest.

use thiserror::Error;

/// Result type alias for lookalike-reqwest operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Internal error type for lookalike-reqwest operations.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),
    /// Response body was not the expected JSON.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// The service answered with a non-success status.
    #[error("inference service returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Leading part of the response body.
        body: String,
    },
    /// Invalid client configuration.
    #[error("invalid inference client configuration: {0}")]
    Config(String),
}

impl From<Error> for lookalike_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Reqwest(e) if e.is_timeout() => lookalike_core::Error::dependency()
                .with_message("inference request timed out")
                .with_source(e),
            Error::Reqwest(e) if e.is_connect() => lookalike_core::Error::dependency()
                .with_message("failed to connect to inference service")
                .with_source(e),
            Error::Reqwest(e) => lookalike_core::Error::dependency()
                .with_message(e.to_string())
                .with_source(e),
            Error::Config(message) => lookalike_core::Error::configuration().with_message(message),
            other => lookalike_core::Error::dependency()
                .with_message(other.to_string())
                .with_source(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use lookalike_core::ErrorKind;

    use super::*;

    #[test]
    fn test_status_error_is_dependency() {
        let error = lookalike_core::Error::from(Error::Status {
            status: 502,
            body: "bad gateway".into(),
        });
        assert_eq!(error.kind(), ErrorKind::Dependency);
        assert!(error.to_string().contains("502"));
    }

    #[test]
    fn test_config_error_is_configuration() {
        let error = lookalike_core::Error::from(Error::Config("bad header".into()));
        assert_eq!(error.kind(), ErrorKind::Configuration);
    }
}
