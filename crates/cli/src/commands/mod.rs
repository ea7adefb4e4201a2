//! Subcommand implementations.

pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use stockroom_api::db::RepositoryError;
use stockroom_core::assignment::AssignmentError;

/// Pool size for one-shot commands.
const CLI_MAX_CONNECTIONS: u32 = 2;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A repository call failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// An item could not be assigned to the demo order.
    #[error("Assignment error: {0}")]
    Assignment(#[from] AssignmentError<sqlx::Error>),
}

/// Connect using `STOCKROOM_DATABASE_URL`, falling back to `DATABASE_URL`.
async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("STOCKROOM_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("STOCKROOM_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = stockroom_api::db::create_pool(&database_url, CLI_MAX_CONNECTIONS).await?;
    Ok(pool)
}
