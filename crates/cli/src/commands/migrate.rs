//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! catalog-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `CATALOG_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Catalog migrations: `crates/catalog/migrations/`

use product_catalog::config::{CatalogConfig, ConfigError};
use product_catalog::db;

/// Errors raised while migrating.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run catalog database migrations.
///
/// # Errors
///
/// Returns an error if configuration is missing, the database is
/// unreachable, or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let config = CatalogConfig::from_env()?;

    tracing::info!("Connecting to catalog database...");
    let pool = db::create_pool(&config.database_url, 1).await?;

    tracing::info!("Running catalog migrations...");
    sqlx::migrate!("../catalog/migrations").run(&pool).await?;

    pool.close().await;
    tracing::info!("Catalog migrations complete!");
    Ok(())
}
