//! `PostgreSQL` product store.
//!
//! Queries are checked at runtime (`query_as::<_, Row>`), not by the sqlx
//! macros, so the crate builds without a live database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use product_catalog_core::{Price, ProductId};

use super::{ProductStore, RepositoryError};
use crate::models::{CreateProductInput, Product, ProductChanges, ProductFilter};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    price: Decimal,
    available: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let price = Price::new(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("product {} has invalid price: {e}", row.id))
        })?;

        Ok(Self {
            id: ProductId::new(row.id),
            name: row.name,
            price,
            available: row.available,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// =============================================================================
// Store
// =============================================================================

/// Product store backed by the `products` table.
#[derive(Debug, Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    /// Create a new product store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn insert(&self, input: &CreateProductInput) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            INSERT INTO products (name, price, available)
            VALUES ($1, $2, TRUE)
            RETURNING id, name, price, available, created_at, updated_at
            ",
        )
        .bind(&input.name)
        .bind(input.price.amount())
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, price, available, created_at, updated_at
            FROM products
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn find_many(
        &self,
        filter: &ProductFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, price, available, created_at, updated_at
            FROM products
            WHERE ($1::boolean IS NULL OR available = $1)
            ORDER BY id ASC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(filter.available)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn count(&self, filter: &ProductFilter) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*)
            FROM products
            WHERE ($1::boolean IS NULL OR available = $1)
            ",
        )
        .bind(filter.available)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn update_by_id(
        &self,
        id: ProductId,
        scope: &ProductFilter,
        changes: &ProductChanges,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            UPDATE products
            SET
                name = COALESCE($3, name),
                price = COALESCE($4, price),
                available = COALESCE($5, available),
                updated_at = NOW()
            WHERE id = $1
                AND ($2::boolean IS NULL OR available = $2)
            RETURNING id, name, price, available, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(scope.available)
        .bind(changes.name.as_deref())
        .bind(changes.price.map(|p| p.amount()))
        .bind(changes.available)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
