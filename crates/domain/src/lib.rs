//! Domain layer for the point-of-sale backend.
//!
//! This crate holds the pure, I/O-free types shared by every other crate:
//! - [`Money`] and [`Quantity`] value objects
//! - Catalog entities ([`Category`], [`Product`]) and their write models
//! - Sale records ([`Transaction`], [`TransactionDetail`]) and checkout input
//! - The daily sales summary ([`DailySummary`])

pub mod catalog;
pub mod error;
pub mod sale;
pub mod summary;
pub mod value_objects;

pub use catalog::{Category, CategoryUpdate, NewCategory, NewProduct, Product, ProductUpdate};
pub use common::{CategoryId, DetailId, ProductId, TransactionId};
pub use error::DomainError;
pub use sale::{CheckoutItem, NewTransactionDetail, Transaction, TransactionDetail, validate_checkout};
pub use summary::{BestSeller, DailySummary};
pub use value_objects::{Money, Quantity};
