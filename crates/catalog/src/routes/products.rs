//! Product JSON API handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use product_catalog_core::ProductId;

use crate::{
    error::AppError,
    models::{DEFAULT_LIMIT, DEFAULT_PAGE, Page, PageRequest, Product},
    state::AppState,
    validation::{FieldViolation, ValidationError},
};

/// Build the products router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(index).post(create))
        .route(
            "/products/{id}",
            get(show).patch(update).delete(remove),
        )
}

/// Pagination query parameters.
///
/// Kept as raw strings so that malformed values produce a JSON validation
/// error instead of the extractor's plain-text rejection.
#[derive(Debug, Default, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl PaginationQuery {
    /// Parse into a validated page request, applying defaults for absent
    /// parameters.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` for non-numeric, zero, negative or
    /// oversized values.
    pub fn into_request(self) -> Result<PageRequest, ValidationError> {
        let mut violations = Vec::new();
        let page = parse_param("page", self.page.as_deref(), DEFAULT_PAGE, &mut violations);
        let limit = parse_param("limit", self.limit.as_deref(), DEFAULT_LIMIT, &mut violations);

        match (page, limit) {
            (Some(page), Some(limit)) if violations.is_empty() => PageRequest::new(page, limit),
            _ => Err(ValidationError::new(violations)),
        }
    }
}

fn parse_param(
    field: &str,
    raw: Option<&str>,
    default: u32,
    violations: &mut Vec<FieldViolation>,
) -> Option<u32> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Some(default);
    };
    if let Ok(value) = raw.parse::<u32>() {
        return Some(value);
    }

    let message = if raw.parse::<i64>().is_ok() {
        format!("{field} must be a positive number")
    } else {
        format!("{field} must be an integer")
    };
    violations.push(FieldViolation::new(field, message));
    None
}

fn parse_id(raw: &str) -> Result<ProductId, AppError> {
    raw.parse::<ProductId>()
        .map_err(|_| AppError::BadRequest(format!("invalid product id: {raw}")))
}

fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

/// Create a product.
///
/// # Errors
///
/// Returns 400 for malformed or invalid payloads, 500 on store failure.
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    let payload = json_body(body)?;
    let product = state.catalog().create(&payload).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// List available products.
///
/// # Errors
///
/// Returns 400 for invalid pagination parameters, 500 on store failure.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<Page<Product>>, AppError> {
    let request = query.into_request()?;
    let page = state.catalog().list_available(request).await?;
    Ok(Json(page))
}

/// Fetch an available product.
///
/// # Errors
///
/// Returns 400 for a non-integer id, 404 if missing or removed.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, AppError> {
    let id = parse_id(&id)?;
    Ok(Json(state.catalog().get_by_id(id).await?))
}

/// Update an available product.
///
/// # Errors
///
/// Returns 400 for a bad id or invalid patch, 404 if missing or removed.
#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Product>, AppError> {
    let id = parse_id(&id)?;
    let payload = json_body(body)?;
    Ok(Json(state.catalog().update(id, &payload).await?))
}

/// Soft-delete an available product.
///
/// # Errors
///
/// Returns 400 for a bad id, 404 if missing or already removed.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, AppError> {
    let id = parse_id(&id)?;
    Ok(Json(state.catalog().remove(id).await?))
}
