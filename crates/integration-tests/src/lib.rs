//! Integration tests for the product catalog.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process tests (in-memory store, no services needed)
//! cargo test -p product-catalog-integration-tests
//!
//! # PostgreSQL-backed tests
//! CATALOG_TEST_DATABASE_URL=postgres://localhost/catalog_test \
//!     cargo test -p product-catalog-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `catalog_service` - Service behavior over the in-memory store
//! - `products_api` - HTTP behavior via `tower::ServiceExt::oneshot`
//! - `postgres_store` - Store and service behavior against `PostgreSQL`

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use secrecy::SecretString;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use product_catalog::config::CatalogConfig;
use product_catalog::db::{self, InMemoryProductStore, ProductStore};
use product_catalog::routes;
use product_catalog::services::CatalogService;
use product_catalog::state::AppState;

/// Catalog service over a fresh in-memory store, plus the store itself.
#[must_use]
pub fn memory_catalog() -> (CatalogService, Arc<InMemoryProductStore>) {
    let store = Arc::new(InMemoryProductStore::new());
    (CatalogService::new(store.clone()), store)
}

/// Application state over `store` with a placeholder configuration.
#[must_use]
pub fn test_state(store: Arc<dyn ProductStore>) -> AppState {
    let config = CatalogConfig::with_database_url(SecretString::from("postgres://unused/test"));
    AppState::with_store(config, store)
}

/// In-process HTTP client wrapping the catalog router.
///
/// Dispatches requests with `tower::ServiceExt::oneshot`; no TCP port is
/// bound.
pub struct TestApp {
    router: Router,
}

/// A decoded response: status and JSON body (`Value::Null` if not JSON).
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    /// App over a fresh in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::with_store(Arc::new(InMemoryProductStore::new()))
    }

    /// App over an arbitrary store.
    #[must_use]
    pub fn with_store(store: Arc<dyn ProductStore>) -> Self {
        Self {
            router: routes::router().with_state(test_state(store)),
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: &Value) -> TestResponse {
        self.send(Method::POST, uri, Some(body.to_string())).await
    }

    pub async fn patch(&self, uri: &str, body: &Value) -> TestResponse {
        self.send(Method::PATCH, uri, Some(body.to_string())).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send(Method::DELETE, uri, None).await
    }

    /// Send a request with an optional raw JSON body.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body cannot be read.
    pub async fn send(&self, method: Method, uri: &str, body: Option<String>) -> TestResponse {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json)),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        let body = serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        });

        TestResponse { status, body }
    }
}

/// `PostgreSQL` URL for database-backed tests.
///
/// Reads `CATALOG_TEST_DATABASE_URL`, falling back to `CATALOG_DATABASE_URL`.
#[must_use]
pub fn test_database_url() -> Option<SecretString> {
    std::env::var("CATALOG_TEST_DATABASE_URL")
        .or_else(|_| std::env::var("CATALOG_DATABASE_URL"))
        .ok()
        .map(SecretString::from)
}

/// Connect to the test database and apply migrations.
///
/// # Panics
///
/// Panics if no test database URL is configured, or if connecting or
/// migrating fails.
pub async fn migrated_pool() -> PgPool {
    let url = test_database_url().expect("CATALOG_TEST_DATABASE_URL not set");
    let pool = db::create_pool(&url, 5)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("../catalog/migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// A product name unique within this test process.
#[must_use]
pub fn unique_name(prefix: &str) -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{}-{n}", std::process::id())
}
