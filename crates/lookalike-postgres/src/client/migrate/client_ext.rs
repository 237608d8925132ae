use super::{MigrationResult, get_applied_migrations, run_pending_migrations};
use crate::{PgClient, PgResult};

/// Schema migration entry points on [`PgClient`].
pub trait PgClientMigrationExt {
    /// Brings the schema up to date; a no-op when nothing is pending.
    fn run_pending_migrations(&self) -> impl Future<Output = PgResult<MigrationResult>>;

    /// Versions already recorded in the database.
    fn get_applied_migrations(&self) -> impl Future<Output = PgResult<Vec<String>>>;
}

impl PgClientMigrationExt for PgClient {
    async fn run_pending_migrations(&self) -> PgResult<MigrationResult> {
        run_pending_migrations(self).await
    }

    async fn get_applied_migrations(&self) -> PgResult<Vec<String>> {
        let mut conn = self.get_connection().await?;
        get_applied_migrations(&mut conn).await
    }
}
