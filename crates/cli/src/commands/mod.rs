//! CLI subcommands.

pub mod migrate;
pub mod seed;

use thiserror::Error;

/// Errors shared by the CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Auth error: {0}")]
    Auth(#[from] fernwood_web::services::auth::AuthError),

    #[error("Repository error: {0}")]
    Repository(#[from] fernwood_web::db::RepositoryError),
}

/// Read `FERNWOOD_DATABASE_URL`, loading `.env` first if present.
pub fn database_url() -> Result<String, CliError> {
    dotenvy::dotenv().ok();

    std::env::var("FERNWOOD_DATABASE_URL")
        .map_err(|_| CliError::MissingEnvVar("FERNWOOD_DATABASE_URL"))
}
