//! Product catalog service.
//!
//! Orchestrates validation and persistence, and enforces visibility: only
//! active (`available == true`) products exist for callers. Removal is a soft
//! delete; rows are never physically deleted.

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, instrument};

use product_catalog_core::ProductId;

use crate::db::{ProductStore, RepositoryError};
use crate::models::{
    CreateProductInput, Page, PageMeta, PageRequest, Product, ProductChanges, ProductFilter,
    ProductPatch,
};
use crate::validation::ValidationError;

/// Errors returned by catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The input payload broke one or more rules.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The product does not exist or is no longer available.
    #[error("Product with id {0} not found")]
    NotFound(ProductId),

    /// The store failed.
    #[error(transparent)]
    Store(#[from] RepositoryError),
}

impl CatalogError {
    /// HTTP status the error maps to.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the error is a server fault rather than a caller mistake.
    #[must_use]
    pub const fn is_server_fault(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}

/// Product catalog service.
///
/// Holds an explicitly constructed store handle; cloning is cheap.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn ProductStore>,
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService").finish_non_exhaustive()
    }
}

impl CatalogService {
    /// Create a new catalog service over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self { store }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn ProductStore> {
        &self.store
    }

    /// Validate `payload` and create an available product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` (nothing is written) or
    /// `CatalogError::Store`.
    #[instrument(skip(self, payload))]
    pub async fn create(&self, payload: &Value) -> Result<Product, CatalogError> {
        let input = CreateProductInput::from_payload(payload)?;

        let product = self
            .store
            .insert(&input)
            .await
            .map_err(|e| store_failure("create", e))?;

        info!(product_id = %product.id, "Product created");
        Ok(product)
    }

    /// List active products, one page at a time, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Store` if either the page or count query fails.
    #[instrument(skip(self), fields(page = request.page(), limit = request.limit()))]
    pub async fn list_available(
        &self,
        request: PageRequest,
    ) -> Result<Page<Product>, CatalogError> {
        let (data, total) = self
            .store
            .find_page(
                &ProductFilter::active(),
                i64::from(request.limit()),
                request.offset(),
            )
            .await
            .map_err(|e| store_failure("list_available", e))?;

        let total = u64::try_from(total).map_err(|_| {
            store_failure(
                "list_available",
                RepositoryError::DataCorruption(format!("negative product count {total}")),
            )
        })?;

        Ok(Page {
            data,
            meta: PageMeta::new(total, request),
        })
    }

    /// Fetch an active product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the product is missing or
    /// inactive, or `CatalogError::Store`.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_by_id(&self, id: ProductId) -> Result<Product, CatalogError> {
        let product = self
            .store
            .find_by_id(id)
            .await
            .map_err(|e| store_failure("get_by_id", e))?;

        match product {
            Some(product) if product.is_active() => Ok(product),
            _ => Err(CatalogError::NotFound(id)),
        }
    }

    /// Apply a validated patch to an active product.
    ///
    /// `id` is stripped from the patch and `available` is never changed.
    /// The write is a single conditional update on active rows.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation`, `CatalogError::NotFound` if the
    /// product is missing or inactive, or `CatalogError::Store`.
    #[instrument(skip(self, payload), fields(product_id = %id))]
    pub async fn update(&self, id: ProductId, payload: &Value) -> Result<Product, CatalogError> {
        let patch = ProductPatch::from_payload(payload)?;
        let changes = ProductChanges::from(patch);

        let product = self.write_active(id, &changes, "update").await?;
        info!("Product updated");
        Ok(product)
    }

    /// Soft-delete an active product.
    ///
    /// Returns the now-inactive product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the product is missing or already
    /// inactive, or `CatalogError::Store`.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn remove(&self, id: ProductId) -> Result<Product, CatalogError> {
        let product = self
            .write_active(id, &ProductChanges::deactivate(), "remove")
            .await?;
        info!("Product removed");
        Ok(product)
    }

    /// Check that the store is reachable.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Store` if the store cannot be reached.
    pub async fn ping(&self) -> Result<(), CatalogError> {
        self.store.ping().await.map_err(CatalogError::Store)
    }

    async fn write_active(
        &self,
        id: ProductId,
        changes: &ProductChanges,
        operation: &'static str,
    ) -> Result<Product, CatalogError> {
        match self
            .store
            .update_by_id(id, &ProductFilter::active(), changes)
            .await
        {
            Ok(product) => Ok(product),
            Err(RepositoryError::NotFound) => Err(CatalogError::NotFound(id)),
            Err(e) => Err(store_failure(operation, e)),
        }
    }
}

/// Log an unexpected store failure and wrap it unchanged.
fn store_failure(operation: &'static str, err: RepositoryError) -> CatalogError {
    error!(error = ?err, operation, "Product store operation failed");
    CatalogError::Store(err)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::InMemoryProductStore;
    use async_trait::async_trait;
    use serde_json::json;

    fn service() -> CatalogService {
        CatalogService::new(Arc::new(InMemoryProductStore::new()))
    }

    /// Store whose every call fails.
    struct FailingStore;

    #[async_trait]
    impl ProductStore for FailingStore {
        async fn insert(&self, _: &CreateProductInput) -> Result<Product, RepositoryError> {
            Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn find_by_id(&self, _: ProductId) -> Result<Option<Product>, RepositoryError> {
            Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn find_many(
            &self,
            _: &ProductFilter,
            _: i64,
            _: i64,
        ) -> Result<Vec<Product>, RepositoryError> {
            Ok(Vec::new())
        }

        async fn count(&self, _: &ProductFilter) -> Result<i64, RepositoryError> {
            Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn update_by_id(
            &self,
            _: ProductId,
            _: &ProductFilter,
            _: &ProductChanges,
        ) -> Result<Product, RepositoryError> {
            Err(RepositoryError::Database(sqlx::Error::PoolClosed))
        }

        async fn ping(&self) -> Result<(), RepositoryError> {
            Err(RepositoryError::Database(sqlx::Error::PoolClosed))
        }
    }

    #[tokio::test]
    async fn test_create_returns_available_product() {
        let service = service();
        let product = service
            .create(&json!({"name": "Pen", "price": 1.50}))
            .await
            .unwrap();

        assert_eq!(product.id, ProductId::new(1));
        assert_eq!(product.name, "Pen");
        assert_eq!(product.price.to_string(), "1.5");
        assert!(product.available);
    }

    #[tokio::test]
    async fn test_create_invalid_writes_nothing() {
        let store = Arc::new(InMemoryProductStore::new());
        let service = CatalogService::new(store.clone());

        let err = service
            .create(&json!({"name": "", "price": -1}))
            .await
            .unwrap_err();

        assert!(matches!(err, CatalogError::Validation(_)));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(store.is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_get_by_id_hides_removed_products() {
        let service = service();
        let product = service
            .create(&json!({"name": "Pen", "price": 2}))
            .await
            .unwrap();

        let removed = service.remove(product.id).await.unwrap();
        assert!(!removed.available);

        let err = service.get_by_id(product.id).await.unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(id) if id == product.id));
        assert_eq!(err.to_string(), "Product with id 1 not found");
    }

    #[tokio::test]
    async fn test_remove_twice_is_not_found() {
        let service = service();
        let product = service
            .create(&json!({"name": "Pen", "price": 2}))
            .await
            .unwrap();

        service.remove(product.id).await.unwrap();
        let err = service.remove(product.id).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_keeps_availability() {
        let service = service();
        let product = service
            .create(&json!({"name": "Pen", "price": 2}))
            .await
            .unwrap();

        let updated = service
            .update(
                product.id,
                &json!({"id": 42, "name": "Pencil", "available": false}),
            )
            .await
            .unwrap();

        assert_eq!(updated.id, product.id);
        assert_eq!(updated.name, "Pencil");
        assert_eq!(updated.price, product.price);
        assert!(updated.available);
    }

    #[tokio::test]
    async fn test_update_inactive_is_not_found() {
        let service = service();
        let product = service
            .create(&json!({"name": "Pen", "price": 2}))
            .await
            .unwrap();
        service.remove(product.id).await.unwrap();

        let err = service
            .update(product.id, &json!({"name": "Pencil"}))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_available_excludes_inactive() {
        let service = service();
        for i in 1..=3 {
            service
                .create(&json!({"name": format!("P{i}"), "price": i}))
                .await
                .unwrap();
        }
        service.remove(ProductId::new(2)).await.unwrap();

        let page = service
            .list_available(PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.meta.total, 2);
        assert_eq!(page.meta.total_pages, 1);
        assert!(page.data.iter().all(|p| p.available));
    }

    #[tokio::test]
    async fn test_list_available_empty() {
        let page = service()
            .list_available(PageRequest::default())
            .await
            .unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.meta.total, 0);
        assert_eq!(page.meta.total_pages, 0);
    }

    #[tokio::test]
    async fn test_store_failures_propagate() {
        let service = CatalogService::new(Arc::new(FailingStore));

        let err = service
            .create(&json!({"name": "Pen", "price": 1}))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Store(RepositoryError::Database(sqlx::Error::PoolTimedOut))
        ));
        assert!(err.is_server_fault());

        let err = service
            .list_available(PageRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let err = service.remove(ProductId::new(1)).await.unwrap_err();
        assert!(matches!(err, CatalogError::Store(_)));

        assert!(service.ping().await.is_err());
    }
}
