//! HTTP route handlers for the catalog.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health               - Liveness check
//! GET    /health/ready         - Readiness check (store reachable)
//!
//! # Products (JSON)
//! POST   /products             - Create a product
//! GET    /products             - List available products (?page=&limit=)
//! GET    /products/{id}        - Fetch an available product
//! PATCH  /products/{id}        - Update an available product
//! DELETE /products/{id}        - Soft-delete an available product
//! ```

pub mod health;
pub mod products;

use axum::Router;

use crate::state::AppState;

/// Build the complete catalog router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(products::router())
}
