use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use deadpool::managed::{Hook, Pool};
use derive_more::{Deref, DerefMut};
use diesel_async::RunQueryDsl;
use diesel_async::pooled_connection::{AsyncDieselConnectionManager, ManagerConfig};

use super::custom_hooks;
use crate::{
    ConnectionPool, PgConfig, PgError, PgResult, PooledConnection, TRACING_TARGET_CLIENT,
    TRACING_TARGET_CONNECTION,
};

/// Acquisitions slower than this are logged as a warning.
const SLOW_ACQUIRE: Duration = Duration::from_millis(100);

/// Share of busy connections above which the pool counts as under pressure.
const PRESSURE_UTILIZATION: f64 = 0.8;

/// Snapshot of the connection pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PgPoolStatus {
    /// Configured upper bound on connections.
    pub max_size: usize,
    /// Open connections, busy or idle.
    pub size: usize,
    /// Idle connections ready to hand out.
    pub available: usize,
    /// Callers queued for a connection.
    pub waiting: usize,
}

impl PgPoolStatus {
    /// Busy connections as a share of `max_size`, in `[0, 1]`.
    #[inline]
    pub fn utilization(&self) -> f64 {
        if self.max_size == 0 {
            return 0.0;
        }

        let busy = self.size.saturating_sub(self.available);
        busy as f64 / self.max_size as f64
    }

    /// True when callers are queueing or most connections are busy.
    #[inline]
    pub fn is_under_pressure(&self) -> bool {
        self.waiting > 0 || self.utilization() > PRESSURE_UTILIZATION
    }
}

/// Pooled connection to the vector database.
///
/// Clones share one pool. Connections are opened lazily, so constructing a
/// client never touches the network.
#[derive(Clone)]
pub struct PgClient {
    inner: Arc<PgClientInner>,
}

struct PgClientInner {
    pool: ConnectionPool,
    config: PgConfig,
}

impl PgClient {
    /// Builds the connection pool described by `config`.
    pub fn new(config: PgConfig) -> PgResult<Self> {
        let mut manager_config = ManagerConfig::default();
        manager_config.custom_setup = Box::new(custom_hooks::setup_callback);
        let manager =
            AsyncDieselConnectionManager::new_with_config(&config.postgres_url, manager_config);

        let pool = Pool::builder(manager)
            .max_size(config.postgres_max_connections as usize)
            .wait_timeout(config.connection_timeout())
            .create_timeout(config.connection_timeout())
            .recycle_timeout(config.idle_timeout())
            .runtime(deadpool::Runtime::Tokio1)
            .post_create(Hook::sync_fn(custom_hooks::post_create))
            .post_recycle(Hook::sync_fn(custom_hooks::post_recycle))
            .build()
            .map_err(|e| PgError::Unexpected(format!("cannot build connection pool: {e}").into()))?;

        tracing::info!(
            target: TRACING_TARGET_CLIENT,
            url = %config.database_url_masked(),
            max_connections = config.postgres_max_connections,
            "Vector database pool created"
        );

        Ok(Self {
            inner: Arc::new(PgClientInner { pool, config }),
        })
    }

    /// Round-trips `SELECT 1` to check that the database answers.
    pub async fn ping(&self) -> PgResult<()> {
        #[derive(diesel::QueryableByName)]
        struct Ping {
            #[diesel(sql_type = diesel::sql_types::Integer)]
            #[allow(dead_code)]
            result: i32,
        }

        let mut conn = self.get_connection().await?;
        let _: Ping = diesel::sql_query("SELECT 1 AS result")
            .get_result(&mut **conn)
            .await?;

        Ok(())
    }

    /// Takes a connection from the pool, waiting up to the connection timeout.
    pub async fn get_connection(&self) -> PgResult<PgConn> {
        self.get_pooled_connection()
            .await
            .map(|conn| PgConn { conn })
    }

    pub(crate) async fn get_pooled_connection(&self) -> PgResult<PooledConnection> {
        let started_at = Instant::now();
        let acquired = self.inner.pool.get().await;
        let elapsed = started_at.elapsed();

        match acquired {
            Ok(conn) => {
                if elapsed > SLOW_ACQUIRE {
                    tracing::warn!(
                        target: TRACING_TARGET_CONNECTION,
                        elapsed_ms = elapsed.as_millis(),
                        status = ?self.pool_status(),
                        "Slow connection acquisition"
                    );
                }
                Ok(conn)
            }
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET_CONNECTION,
                    elapsed_ms = elapsed.as_millis(),
                    error = %error,
                    "No connection available"
                );
                Err(PgError::from(error))
            }
        }
    }

    /// Current pool occupancy.
    pub fn pool_status(&self) -> PgPoolStatus {
        let status = self.inner.pool.status();
        PgPoolStatus {
            max_size: status.max_size,
            size: status.size,
            available: status.available,
            waiting: status.waiting,
        }
    }

    /// Configuration the pool was built from.
    #[inline]
    pub fn config(&self) -> &PgConfig {
        &self.inner.config
    }
}

impl fmt::Debug for PgClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgClient")
            .field("url", &self.inner.config.database_url_masked())
            .field("pool", &self.pool_status())
            .finish()
    }
}

/// A pooled connection, returned to the pool on drop.
///
/// Repository traits in [`query`](crate::query) are implemented for the
/// underlying [`PgConnection`](crate::PgConnection) and reachable through
/// [`Deref`].
#[derive(Deref, DerefMut)]
pub struct PgConn {
    conn: PooledConnection,
}

impl fmt::Debug for PgConn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgConn").finish_non_exhaustive()
    }
}
