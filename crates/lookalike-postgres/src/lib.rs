#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Schema migrations compiled into the binary.
pub(crate) const MIGRATIONS: diesel_migrations::EmbeddedMigrations =
    diesel_migrations::embed_migrations!("./src/migrations");

/// Tracing target for pool construction.
pub const TRACING_TARGET_CLIENT: &str = "lookalike_postgres::client";

/// Tracing target for repository queries.
pub const TRACING_TARGET_QUERY: &str = "lookalike_postgres::queries";

/// Tracing target for schema migrations.
pub const TRACING_TARGET_MIGRATION: &str = "lookalike_postgres::migrations";

/// Tracing target for connection setup, pool hooks and acquisition.
pub const TRACING_TARGET_CONNECTION: &str = "lookalike_postgres::connection";

mod client;
pub mod error;
pub mod model;
pub mod query;
mod schema;
mod store;

pub use diesel_async::AsyncPgConnection as PgConnection;

pub use crate::client::{
    ConnectionPool, MigrationResult, PgClient, PgClientMigrationExt, PgConfig, PgConn,
    PgPoolStatus, PooledConnection, get_applied_migrations, run_pending_migrations,
};
pub use crate::error::{PgError, PgResult};
pub use crate::store::{PgMetadataStore, PgVectorStore};
