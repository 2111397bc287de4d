//! Unified error handling for the catalog HTTP surface.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::CatalogError;
use crate::validation::{FieldViolation, ValidationError};

/// Application-level error type for the catalog API.
#[derive(Debug, Error)]
pub enum AppError {
    /// A catalog operation failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The request could not be parsed (bad path or query parameters, or a
    /// body that is not JSON).
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::Catalog(CatalogError::Validation(err))
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        Self::Catalog(CatalogError::Store(err))
    }
}

impl AppError {
    /// HTTP status the error maps to.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Catalog(err) => err.status_code(),
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

/// JSON error body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    status_code: u16,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<FieldViolation>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Log server errors with Sentry
        if matches!(&self, Self::Catalog(err) if err.is_server_fault()) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Catalog request error"
            );
        }

        // Don't expose internal error details to clients
        let body = match &self {
            Self::Catalog(CatalogError::Store(_)) => ErrorBody {
                status_code: status.as_u16(),
                message: "Internal server error".to_string(),
                errors: None,
            },
            Self::Catalog(CatalogError::Validation(err)) => ErrorBody {
                status_code: status.as_u16(),
                message: err.to_string(),
                errors: Some(err.violations().to_vec()),
            },
            _ => ErrorBody {
                status_code: status.as_u16(),
                message: self.to_string(),
                errors: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use product_catalog_core::ProductId;
    use serde_json::{Value, json};

    async fn body_of(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::BadRequest("invalid page".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid page");

        let err = AppError::from(CatalogError::NotFound(ProductId::new(9)));
        assert_eq!(err.to_string(), "Product with id 9 not found");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(ValidationError::single("name", "name should not be empty").into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(CatalogError::NotFound(ProductId::new(1)).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(RepositoryError::DataCorruption("test".to_string()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_validation_body_lists_violations() {
        let err = ValidationError::new(vec![
            FieldViolation::new("name", "name should not be empty"),
            FieldViolation::new("price", "price must be a positive number"),
        ]);
        let (status, body) = body_of(err.into()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["statusCode"], json!(400));
        assert_eq!(body["errors"].as_array().unwrap().len(), 2);
        assert_eq!(body["errors"][1]["field"], json!("price"));
    }

    #[tokio::test]
    async fn test_store_error_body_hides_details() {
        let err = RepositoryError::DataCorruption("product 3 has invalid price".to_string());
        let (status, body) = body_of(err.into()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], json!("Internal server error"));
        assert!(body.get("errors").is_none());
    }
}
