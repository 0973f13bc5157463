//! HTTP handlers.

pub mod categories;
pub mod checkout;
pub mod health;
pub mod metrics;
pub mod products;
pub mod report;

use serde::Serialize;

use crate::error::ApiError;

/// Body returned by successful deletes.
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub status: &'static str,
    pub message: String,
}

impl DeletedResponse {
    pub(crate) fn new(entity: &str) -> Self {
        Self {
            status: "success",
            message: format!("{entity} deleted successfully"),
        }
    }
}

/// Fallback for a known path hit with an unsupported method.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Fallback for unknown paths.
pub async fn not_found() -> ApiError {
    ApiError::NotFound("route not found".to_string())
}
