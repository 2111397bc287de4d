//! Product store and catalog service against `PostgreSQL`.
//!
//! These tests require:
//! - A running `PostgreSQL` database
//! - `CATALOG_TEST_DATABASE_URL` (or `CATALOG_DATABASE_URL`) pointing at it
//!
//! Migrations are applied automatically. Tests share the database, so they
//! only assert on rows they created themselves.
//!
//! Run with: cargo test -p product-catalog-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use serde_json::json;

use product_catalog::db::{PgProductStore, ProductStore, RepositoryError};
use product_catalog::models::{CreateProductInput, PageRequest, ProductChanges, ProductFilter};
use product_catalog::services::{CatalogError, CatalogService};
use product_catalog_core::{Price, ProductId};
use product_catalog_integration_tests::{TestApp, migrated_pool, unique_name};

async fn store() -> PgProductStore {
    PgProductStore::new(migrated_pool().await)
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_insert_and_find() {
    let store = store().await;
    let name = unique_name("insert");

    let product = store
        .insert(&CreateProductInput {
            name: name.clone(),
            price: Price::parse("12.3456").unwrap(),
        })
        .await
        .unwrap();

    assert_eq!(product.name, name);
    assert_eq!(product.price.to_string(), "12.3456");
    assert!(product.available);
    assert_eq!(product.created_at, product.updated_at);

    let found = store.find_by_id(product.id).await.unwrap().unwrap();
    assert_eq!(found, product);

    assert!(store.find_by_id(ProductId::new(-1)).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_conditional_update_respects_scope() {
    let store = store().await;
    let product = store
        .insert(&CreateProductInput {
            name: unique_name("scope"),
            price: Price::parse("1").unwrap(),
        })
        .await
        .unwrap();

    let removed = store
        .update_by_id(product.id, &ProductFilter::active(), &ProductChanges::deactivate())
        .await
        .unwrap();
    assert!(!removed.available);
    assert!(removed.updated_at >= product.updated_at);

    let err = store
        .update_by_id(product.id, &ProductFilter::active(), &ProductChanges::deactivate())
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound));

    // The row survives the soft delete.
    let row = store.find_by_id(product.id).await.unwrap().unwrap();
    assert!(!row.available);
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_partial_update_keeps_other_columns() {
    let store = store().await;
    let product = store
        .insert(&CreateProductInput {
            name: unique_name("partial"),
            price: Price::parse("4.20").unwrap(),
        })
        .await
        .unwrap();

    let changes = ProductChanges {
        price: Some(Price::parse("5").unwrap()),
        ..ProductChanges::default()
    };
    let updated = store
        .update_by_id(product.id, &ProductFilter::active(), &changes)
        .await
        .unwrap();

    assert_eq!(updated.name, product.name);
    assert_eq!(updated.price.to_string(), "5");
    assert!(updated.available);
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_find_page_counts_only_matching_rows() {
    let store = store().await;
    let filter = ProductFilter::active();

    let product = store
        .insert(&CreateProductInput {
            name: unique_name("page"),
            price: Price::parse("3").unwrap(),
        })
        .await
        .unwrap();
    let (items, total) = store.find_page(&filter, 1, 0).await.unwrap();
    assert!(total >= 1);
    assert_eq!(items.len(), 1);

    store
        .update_by_id(product.id, &filter, &ProductChanges::deactivate())
        .await
        .unwrap();

    let (items, _) = store.find_page(&filter, 100, 0).await.unwrap();
    assert!(items.iter().all(|p| p.available));
    assert!(items.iter().all(|p| p.id != product.id));
    assert!(items.windows(2).all(|w| w[0].id < w[1].id));
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_check_constraints_reject_bad_rows() {
    let pool = migrated_pool().await;

    let err = sqlx::query("INSERT INTO products (name, price) VALUES ('', 1)")
        .execute(&pool)
        .await
        .unwrap_err();
    assert!(matches!(RepositoryError::from(err), RepositoryError::Conflict(_)));

    let err = sqlx::query("INSERT INTO products (name, price) VALUES ('x', 0)")
        .execute(&pool)
        .await
        .unwrap_err();
    assert!(matches!(RepositoryError::from(err), RepositoryError::Conflict(_)));
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_service_lifecycle() {
    let catalog = CatalogService::new(Arc::new(store().await));
    let name = unique_name("lifecycle");

    let product = catalog
        .create(&json!({"name": name, "price": 1.50}))
        .await
        .unwrap();
    assert!(product.available);
    assert_eq!(product.price.to_string(), "1.5");

    let updated = catalog
        .update(product.id, &json!({"name": format!("{name}-v2"), "available": false}))
        .await
        .unwrap();
    assert!(updated.available);

    catalog.remove(product.id).await.unwrap();
    assert!(matches!(
        catalog.get_by_id(product.id).await,
        Err(CatalogError::NotFound(_))
    ));
    assert!(matches!(
        catalog.remove(product.id).await,
        Err(CatalogError::NotFound(_))
    ));

    let page = catalog
        .list_available(PageRequest::new(1, 100).unwrap())
        .await
        .unwrap();
    assert!(page.data.iter().all(|p| p.available));
    assert_eq!(page.meta.total_pages, page.meta.total.div_ceil(100));
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_readiness_against_database() {
    let app = TestApp::with_store(Arc::new(store().await));

    let resp = app.get("/health/ready").await;
    assert_eq!(resp.status, axum::http::StatusCode::OK);
}
