//! In-memory product store.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use product_catalog_core::ProductId;

use super::{ProductStore, RepositoryError};
use crate::models::{CreateProductInput, Product, ProductChanges, ProductFilter};

#[derive(Debug, Default)]
struct State {
    last_id: i32,
    rows: BTreeMap<ProductId, Product>,
}

/// Product store kept in process memory.
///
/// Intended for tests/dev. Rows are ordered by id, matching the
/// `PostgreSQL` store. Locks are never held across an `.await`.
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    state: RwLock<State>,
}

impl InMemoryProductStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows, active or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the lock is poisoned.
    pub fn len(&self) -> Result<usize, RepositoryError> {
        Ok(self.read()?.rows.len())
    }

    /// Whether the store holds no rows at all.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, RepositoryError> {
        Ok(self.len()? == 0)
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, State>, RepositoryError> {
        self.state
            .read()
            .map_err(|_| RepositoryError::DataCorruption("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, State>, RepositoryError> {
        self.state
            .write()
            .map_err(|_| RepositoryError::DataCorruption("lock poisoned".to_string()))
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn insert(&self, input: &CreateProductInput) -> Result<Product, RepositoryError> {
        let mut state = self.write()?;
        state.last_id = state
            .last_id
            .checked_add(1)
            .ok_or_else(|| RepositoryError::Conflict("product id sequence exhausted".to_string()))?;

        let now = Utc::now();
        let product = Product {
            id: ProductId::new(state.last_id),
            name: input.name.clone(),
            price: input.price,
            available: true,
            created_at: now,
            updated_at: now,
        };
        state.rows.insert(product.id, product.clone());
        Ok(product)
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.read()?.rows.get(&id).cloned())
    }

    async fn find_many(
        &self,
        filter: &ProductFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Product>, RepositoryError> {
        let skip = usize::try_from(offset).unwrap_or(usize::MAX);
        let take = usize::try_from(limit).unwrap_or(0);

        Ok(self
            .read()?
            .rows
            .values()
            .filter(|p| filter.matches(p))
            .skip(skip)
            .take(take)
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &ProductFilter) -> Result<i64, RepositoryError> {
        let count = self.read()?.rows.values().filter(|p| filter.matches(p)).count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }

    async fn update_by_id(
        &self,
        id: ProductId,
        scope: &ProductFilter,
        changes: &ProductChanges,
    ) -> Result<Product, RepositoryError> {
        let mut state = self.write()?;
        let product = state
            .rows
            .get_mut(&id)
            .filter(|p| scope.matches(p))
            .ok_or(RepositoryError::NotFound)?;

        if let Some(name) = &changes.name {
            product.name.clone_from(name);
        }
        if let Some(price) = changes.price {
            product.price = price;
        }
        if let Some(available) = changes.available {
            product.available = available;
        }
        product.updated_at = Utc::now();

        Ok(product.clone())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        self.read().map(|_| ())
    }
}
