//! Connection setup and pool lifecycle hooks.

use std::time::Instant;

use deadpool::managed::{HookResult, Metrics};
use diesel::ConnectionResult;
use diesel_async::pooled_connection::{PoolError, PoolableConnection};
use diesel_async::{AsyncConnection, AsyncPgConnection};
use futures::FutureExt;
use futures::future::BoxFuture;

use crate::{PgConfig, TRACING_TARGET_CONNECTION};

/// Opens a connection for the pool manager, timing the handshake.
///
/// Installed as the [`ManagerConfig`] custom setup so credentials in the URL
/// never reach the logs.
///
/// [`ManagerConfig`]: diesel_async::pooled_connection::ManagerConfig
pub fn setup_callback<C>(url: &str) -> BoxFuture<'_, ConnectionResult<C>>
where
    C: AsyncConnection + 'static,
{
    let masked_url = PgConfig::mask_url(url);

    async move {
        let started_at = Instant::now();
        let connection = C::establish(url).await;

        if let Err(error) = &connection {
            tracing::error!(
                target: TRACING_TARGET_CONNECTION,
                url = %masked_url,
                elapsed_ms = started_at.elapsed().as_millis(),
                error = %error,
                "Could not connect to the vector database"
            );
        } else {
            tracing::debug!(
                target: TRACING_TARGET_CONNECTION,
                url = %masked_url,
                elapsed_ms = started_at.elapsed().as_millis(),
                "Connected to the vector database"
            );
        }

        connection
    }
    .boxed()
}

/// Runs after the pool opens a connection.
pub fn post_create(conn: &mut AsyncPgConnection, metrics: &Metrics) -> HookResult<PoolError> {
    report_broken(conn, metrics, "post_create");
    Ok(())
}

/// Runs after the pool hands a connection back out.
pub fn post_recycle(conn: &mut AsyncPgConnection, metrics: &Metrics) -> HookResult<PoolError> {
    report_broken(conn, metrics, "post_recycle");
    Ok(())
}

fn report_broken(conn: &mut AsyncPgConnection, metrics: &Metrics, hook: &'static str) {
    if conn.is_broken() {
        tracing::warn!(
            target: TRACING_TARGET_CONNECTION,
            hook,
            recycled = metrics.recycle_count,
            "Pooled connection is broken"
        );
    }
}
