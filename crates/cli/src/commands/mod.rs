//! CLI command implementations.

pub mod migrate;
pub mod seed;

use secrecy::SecretString;

/// Database connection error shared by all commands.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Store error: {0}")]
    Store(#[from] tiktokflow_server::store::RepositoryError),
}

/// Read the database URL from the environment (`.env` honored).
pub(crate) fn database_url() -> Result<SecretString, CommandError> {
    dotenvy::dotenv().ok();
    std::env::var("TIKTOKFLOW_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("TIKTOKFLOW_DATABASE_URL"))
}
