//! Database error type and its mapping onto the core error kinds.

use std::borrow::Cow;

pub use deadpool::managed::TimeoutType;
pub use diesel::result::{ConnectionError as DieselConnectionError, Error as DieselError};
use diesel::result::DatabaseErrorKind;
pub use diesel_async::pooled_connection::PoolError as DieselPoolError;
pub use diesel_async::pooled_connection::deadpool::PoolError as DeadpoolError;

use crate::TRACING_TARGET_CONNECTION;

/// Boxed error carried by migration failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result alias for database operations.
pub type PgResult<T, E = PgError> = Result<T, E>;

/// Failure talking to the vector database.
#[derive(Debug, thiserror::Error)]
#[must_use = "database errors should be handled"]
pub enum PgError {
    #[error("invalid postgres configuration: {0}")]
    Config(String),

    /// Waiting for, creating or recycling a pooled connection timed out.
    #[error("postgres pool timed out ({0:?})")]
    Timeout(TimeoutType),

    #[error("postgres connection failed: {0}")]
    Connection(#[from] DieselConnectionError),

    #[error("postgres migration failed: {0}")]
    Migration(BoxError),

    /// Includes constraint violations.
    #[error("postgres query failed: {0}")]
    Query(#[from] DieselError),

    #[error("postgres pool error: {0}")]
    Unexpected(Cow<'static, str>),
}

impl PgError {
    /// True for primary key and unique constraint violations.
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            Self::Query(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _))
        )
    }

    /// True when the same call may succeed later.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::Connection(DieselConnectionError::BadConnection(_))
        )
    }
}

impl From<DeadpoolError> for PgError {
    fn from(error: DeadpoolError) -> Self {
        match error {
            DeadpoolError::Timeout(timeout) => Self::Timeout(timeout),
            DeadpoolError::Backend(DieselPoolError::ConnectionError(error)) => {
                Self::Connection(error)
            }
            DeadpoolError::Backend(DieselPoolError::QueryError(error)) => Self::Query(error),
            DeadpoolError::Closed => Self::Unexpected("connection pool is closed".into()),
            DeadpoolError::NoRuntimeSpecified => {
                Self::Unexpected("connection pool has no async runtime".into())
            }
            DeadpoolError::PostCreateHook(error) => {
                tracing::warn!(
                    target: TRACING_TARGET_CONNECTION,
                    error = %error,
                    "Post-create hook rejected a connection"
                );
                Self::Unexpected(error.to_string().into())
            }
        }
    }
}

impl From<PgError> for lookalike_core::Error {
    fn from(error: PgError) -> Self {
        let base = match &error {
            PgError::Config(_) => Self::configuration(),
            _ if error.is_unique_violation() => Self::conflict(),
            _ => Self::dependency(),
        };

        base.with_message(error.to_string()).with_source(error)
    }
}
