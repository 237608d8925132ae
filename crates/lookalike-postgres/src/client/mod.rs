//! Connection pool, its configuration and schema migrations.

mod custom_hooks;
pub mod migrate;
mod pg_client;
mod pg_config;

use deadpool::managed::{Object, Pool};
use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
pub use migrate::{
    MigrationResult, PgClientMigrationExt, get_applied_migrations, run_pending_migrations,
};
pub use pg_client::{PgClient, PgConn, PgPoolStatus};
pub use pg_config::PgConfig;

type Manager = AsyncDieselConnectionManager<AsyncPgConnection>;

/// Deadpool pool of async diesel connections.
pub type ConnectionPool = Pool<Manager>;

/// A connection checked out of [`ConnectionPool`].
pub type PooledConnection = Object<Manager>;
