//! Shared fixtures for the end-to-end suites.

use anyhow::{Context, Result};
use migration::{Migrator, MigratorTrait};
use platform_db::{DatabaseSettings, DbPool, connect};

/// A fresh private SQLite database with every migration applied.
pub async fn migrated_pool() -> Result<DbPool> {
    let pool = connect(&DatabaseSettings::in_memory())
        .await
        .context("failed to open in-memory database")?;
    Migrator::up(&pool, None)
        .await
        .context("failed to apply migrations")?;
    Ok(pool)
}
