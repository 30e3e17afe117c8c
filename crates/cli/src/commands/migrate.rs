//! Database migration command.
//!
//! Migration files live in `crates/server/migrations/` and are embedded at
//! compile time, so the CLI binary carries them wherever it is deployed.

use tracing::info;

use tiktokflow_server::store::postgres::create_pool;

use super::CommandError;

/// Run all pending database migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails, or
/// a migration fails to apply.
pub async fn run() -> Result<(), CommandError> {
    let database_url = super::database_url()?;

    info!("Connecting to database...");
    let pool = create_pool(&database_url).await?;

    info!("Running migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    info!("Migrations complete!");
    Ok(())
}
