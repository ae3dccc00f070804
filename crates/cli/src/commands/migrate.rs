//! Database migration command.
//!
//! Migrations live in `crates/web/migrations/` and are embedded at compile
//! time; the server never runs them on startup.

use sqlx::PgPool;

use super::CliError;

/// Run all pending migrations.
///
/// # Errors
///
/// Returns an error when the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CliError> {
    let database_url = super::database_url()?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(&database_url).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../web/migrations").run(&pool).await?;

    tracing::info!("Migrations complete");
    Ok(())
}
