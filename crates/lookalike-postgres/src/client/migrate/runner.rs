use std::time::Instant;

use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_async::pooled_connection::PoolableConnection;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use diesel_migrations::MigrationHarness;

use super::MigrationResult;
use crate::{MIGRATIONS, PgClient, PgError, PgResult, TRACING_TARGET_MIGRATION};

/// Applies every embedded migration the database has not seen yet.
///
/// The migration harness is synchronous, so it runs on the blocking pool over
/// an [`AsyncConnectionWrapper`] that owns a pooled connection.
pub async fn run_pending_migrations(pg: &PgClient) -> PgResult<MigrationResult> {
    let started_at = Instant::now();
    let mut conn = pg.get_pooled_connection().await?;
    if conn.is_broken() {
        return Err(PgError::Migration(
            "pooled connection is broken, refusing to migrate".into(),
        ));
    }

    let mut wrapper: AsyncConnectionWrapper<_> = conn.into();
    let applied = tokio::task::spawn_blocking(move || {
        wrapper
            .run_pending_migrations(MIGRATIONS)
            .map(|versions| versions.iter().map(ToString::to_string).collect::<Vec<_>>())
    })
    .await
    .map_err(|join_error| PgError::Migration(join_error.into()))?
    .map_err(PgError::Migration);

    let applied = match applied {
        Ok(applied) => applied,
        Err(error) => {
            tracing::error!(
                target: TRACING_TARGET_MIGRATION,
                error = %error,
                "Schema migration failed"
            );
            return Err(error);
        }
    };

    let result = MigrationResult::new(started_at.elapsed(), applied);
    tracing::info!(
        target: TRACING_TARGET_MIGRATION,
        applied = result.applied_count(),
        elapsed_ms = result.duration.as_millis(),
        "Schema is up to date"
    );

    Ok(result)
}

/// Lists the migration versions recorded in the database, oldest first.
pub async fn get_applied_migrations(conn: &mut AsyncPgConnection) -> PgResult<Vec<String>> {
    #[derive(diesel::QueryableByName)]
    struct Applied {
        #[diesel(sql_type = diesel::sql_types::Text)]
        version: String,
    }

    let rows: Vec<Applied> =
        diesel::sql_query("SELECT version FROM __diesel_schema_migrations ORDER BY version")
            .load(conn)
            .await
            .map_err(|error| PgError::Migration(Box::new(error)))?;

    Ok(rows.into_iter().map(|row| row.version).collect())
}
