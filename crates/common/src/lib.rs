//! Shared identifier types used across the point-of-sale workspace.

pub mod types;

pub use types::{CategoryId, DetailId, ProductId, TransactionId};
