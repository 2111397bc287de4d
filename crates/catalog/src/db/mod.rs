//! Database operations for the catalog `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `products` - Product records; rows are soft-deleted via `available`
//!
//! # Migrations
//!
//! Migrations are stored in `crates/catalog/migrations/` and run via:
//! ```bash
//! cargo run -p product-catalog-cli -- migrate
//! ```
//!
//! # Stores
//!
//! All persistence goes through the [`ProductStore`] trait. The service holds
//! an explicitly constructed store handle; there is no process-wide client.
//!
//! - [`PgProductStore`] - `PostgreSQL` implementation
//! - [`InMemoryProductStore`] - In-process implementation for tests and local development

pub mod memory;
pub mod products;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use product_catalog_core::ProductId;

use crate::models::{CreateProductInput, Product, ProductChanges, ProductFilter};

pub use memory::InMemoryProductStore;
pub use products::PgProductStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// No row matched the id and scope of a write.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., a check constraint on `price`).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation()
                || db_err.is_check_violation()
                || db_err.is_foreign_key_violation()
            {
                return Self::Conflict(db_err.message().to_string());
            }
        }
        Self::Database(err)
    }
}

/// Persistence operations scoped to the product collection.
///
/// Implementations never filter by availability on their own; callers pass
/// a [`ProductFilter`] wherever visibility matters.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Insert a new, available product. The store assigns id and timestamps.
    async fn insert(&self, input: &CreateProductInput) -> Result<Product, RepositoryError>;

    /// Fetch a product by id regardless of availability.
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Fetch a window of matching products, ordered by ascending id.
    async fn find_many(
        &self,
        filter: &ProductFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Product>, RepositoryError>;

    /// Count all matching products.
    async fn count(&self, filter: &ProductFilter) -> Result<i64, RepositoryError>;

    /// Fetch a page of matching products together with the total match count.
    ///
    /// Both queries run concurrently; if either fails the whole call fails.
    async fn find_page(
        &self,
        filter: &ProductFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Product>, i64), RepositoryError> {
        tokio::try_join!(self.find_many(filter, limit, offset), self.count(filter))
    }

    /// Apply `changes` to the product with `id`, only if it also matches
    /// `scope`, in a single conditional write.
    ///
    /// Returns `RepositoryError::NotFound` when no row matches both.
    async fn update_by_id(
        &self,
        id: ProductId,
        scope: &ProductFilter,
        changes: &ProductChanges,
    ) -> Result<Product, RepositoryError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
/// * `max_connections` - Upper bound on pooled connections
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(max_connections.min(2))
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
