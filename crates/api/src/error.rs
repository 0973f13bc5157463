//! API error types with HTTP response mapping.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use reporting::ReportError;
use sales::SalesError;
use serde::Serialize;
use store::StoreError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// The request conflicts with current state.
    Conflict(String),
    /// The route exists but not for this method.
    MethodNotAllowed,
    /// Internal server error. The message is logged, never returned.
    Internal(String),
}

/// Error body shared by every failing endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: &'static str,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "method not allowed".to_string(),
            ),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        let body = ErrorBody {
            status: "error",
            message,
        };
        (status, axum::Json(body)).into_response()
    }
}

fn store_error(err: StoreError) -> ApiError {
    match &err {
        StoreError::NotFound { .. } => ApiError::NotFound(err.to_string()),
        StoreError::CategoryInUse(_) => ApiError::Conflict(err.to_string()),
        _ => ApiError::Internal(err.to_string()),
    }
}

impl From<SalesError> for ApiError {
    fn from(err: SalesError) -> Self {
        match err {
            SalesError::InvalidInput(_) => ApiError::BadRequest(err.to_string()),
            SalesError::ProductNotFound(_) => ApiError::NotFound(err.to_string()),
            SalesError::CategoryNotFound(_) => ApiError::BadRequest(err.to_string()),
            SalesError::InsufficientStock { .. } => ApiError::Conflict(err.to_string()),
            SalesError::ConsistencyViolation(_) => ApiError::Internal(err.to_string()),
            SalesError::Store(store) => store_error(store),
        }
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::Store(store) => store_error(store),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<domain::DomainError> for ApiError {
    fn from(err: domain::DomainError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use common::{CategoryId, ProductId};
    use domain::DomainError;

    use super::*;

    fn status_of(err: impl Into<ApiError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn test_sales_error_status_mapping() {
        assert_eq!(
            status_of(SalesError::InvalidInput(DomainError::EmptyCheckout)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(SalesError::ProductNotFound(ProductId::new(99))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(SalesError::CategoryNotFound(CategoryId::new(3))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(SalesError::InsufficientStock {
                product_id: ProductId::new(1),
                requested: 2,
                available: 1,
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(SalesError::ConsistencyViolation("mismatch".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(SalesError::Store(StoreError::CategoryInUse(CategoryId::new(1)))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(SalesError::Store(StoreError::Unavailable("down".into()))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_internal_error_hides_details() {
        let response = ApiError::Internal("password=hunter2".into()).into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "internal server error");
    }
}
