//! Embedded schema migrations.
//!
//! Migrations are compiled into the binary and applied through
//! [`PgClientMigrationExt::run_pending_migrations`]. Applying them is
//! idempotent: an up-to-date database yields an empty [`MigrationResult`].

mod client_ext;
mod report;
mod runner;

pub use client_ext::PgClientMigrationExt;
pub use report::MigrationResult;
pub use runner::{get_applied_migrations, run_pending_migrations};
