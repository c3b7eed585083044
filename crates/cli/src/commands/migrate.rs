//! Database migration command.
//!
//! Migrations are embedded from `crates/api/migrations/` at compile time
//! and applied in order. The server never runs migrations on startup; this
//! command is the only way schema changes reach a database.

use super::{CommandError, connect};

/// Run all pending database migrations.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../api/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
