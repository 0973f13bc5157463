//! Sales error types.

use common::{CategoryId, ProductId};
use domain::DomainError;
use store::StoreError;
use thiserror::Error;

/// Errors that can occur during checkout and catalog operations.
#[derive(Debug, Error)]
pub enum SalesError {
    /// The request broke a domain rule before any store access.
    #[error("{0}")]
    InvalidInput(#[from] DomainError),

    /// A checkout line names a product that does not exist.
    #[error("product id {0} not found")]
    ProductNotFound(ProductId),

    /// A product write names a category that does not exist.
    #[error("category id {0} not found")]
    CategoryNotFound(CategoryId),

    /// A checkout line asks for more units than are in stock.
    #[error(
        "insufficient stock for product {product_id}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: i64,
    },

    /// A sale record failed its own bookkeeping check. Indicates a bug.
    #[error("consistency violation: {0}")]
    ConsistencyViolation(String),

    /// Store error.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Convenience type alias for sales results.
pub type Result<T> = std::result::Result<T, SalesError>;
