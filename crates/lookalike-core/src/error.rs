//! Error type shared by every lookalike crate.

use strum::{AsRefStr, Display, IntoStaticStr};
use thiserror::Error;

/// Source error attached to an [`Error`].
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// What went wrong, independent of which backend reported it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed input, such as an embedding of the wrong dimension.
    ///
    /// Raised before any external collaborator is contacted.
    Validation,
    /// An external collaborator (vector store, metadata store or inference
    /// service) is unreachable, returned an error, or timed out.
    Dependency,
    /// A lookup by id found nothing.
    NotFound,
    /// A record with the same id already exists.
    Conflict,
    /// The caller cancelled the request before anything was persisted.
    Cancelled,
    /// Configuration is invalid.
    Configuration,
}

/// Error kind with an optional message and source.
#[derive(Debug, Error)]
#[error("{kind}{}", .message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
pub struct Error {
    pub kind: ErrorKind,
    pub message: Option<String>,
    #[source]
    pub source: Option<BoxedError>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            source: None,
        }
    }

    /// Sets the human-readable message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn validation() -> Self {
        Self::new(ErrorKind::Validation)
    }

    pub fn dependency() -> Self {
        Self::new(ErrorKind::Dependency)
    }

    pub fn not_found() -> Self {
        Self::new(ErrorKind::NotFound)
    }

    pub fn conflict() -> Self {
        Self::new(ErrorKind::Conflict)
    }

    pub fn cancelled() -> Self {
        Self::new(ErrorKind::Cancelled)
    }

    pub fn configuration() -> Self {
        Self::new(ErrorKind::Configuration)
    }

    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Snake-case kind name, as used in logs and JSON output.
    pub fn kind_str(&self) -> &'static str {
        self.kind.into()
    }

    pub fn is_validation(&self) -> bool {
        self.kind == ErrorKind::Validation
    }

    pub fn is_dependency(&self) -> bool {
        self.kind == ErrorKind::Dependency
    }

    pub fn is_cancelled(&self) -> bool {
        self.kind == ErrorKind::Cancelled
    }

    /// True when retrying the same call unchanged cannot succeed.
    pub fn is_permanent(&self) -> bool {
        !matches!(self.kind, ErrorKind::Dependency | ErrorKind::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind_and_message() {
        let error = Error::validation().with_message("expected 512 dimensions, got 3");
        assert_eq!(
            error.to_string(),
            "validation: expected 512 dimensions, got 3"
        );
        assert_eq!(Error::dependency().to_string(), "dependency");
    }

    #[test]
    fn test_classification() {
        assert!(Error::conflict().is_permanent());
        assert!(Error::validation().is_permanent());
        assert!(!Error::dependency().is_permanent());
        assert!(Error::cancelled().is_cancelled());
        assert!(!Error::cancelled().is_permanent());
        assert_eq!(Error::not_found().kind_str(), "not_found");
    }
}
