//! Domain error types.

use common::ProductId;
use thiserror::Error;

/// Input that violates a domain rule.
///
/// Every variant is the caller's fault and is raised before any store is
/// touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A checkout was requested without any items.
    #[error("items required")]
    EmptyCheckout,

    /// A checkout line asked for zero or a negative quantity.
    #[error("Invalid quantity {quantity} for product {product_id} (must be greater than 0)")]
    InvalidQuantity { product_id: ProductId, quantity: i64 },

    /// A price below zero.
    #[error("Invalid price: {price} (must not be negative)")]
    InvalidPrice { price: i64 },

    /// A stock level below zero on a catalog write.
    #[error("Invalid stock: {stock} (must not be negative)")]
    InvalidStock { stock: i64 },

    /// A name that is empty or only whitespace.
    #[error("{entity} name is required")]
    BlankName { entity: &'static str },

    /// A line subtotal or running total that does not fit the money type.
    #[error("Amount overflow while pricing product {product_id}")]
    AmountOverflow { product_id: ProductId },
}
