//! Sales use cases for the point-of-sale backend.
//!
//! The checkout engine turns a list of requested items into one committed
//! sale:
//! 1. Lock every requested product (ascending id)
//! 2. Price each line and decrement stock, in input order
//! 3. Insert the transaction header and its detail lines
//! 4. Commit
//!
//! Every step runs inside a single store unit of work. Any failure drops the
//! unit, which discards all stock changes and inserted rows.
//!
//! The catalog service wraps category and product maintenance.

pub mod catalog;
pub mod checkout;
pub mod error;

pub use catalog::CatalogService;
pub use checkout::{CheckoutEngine, StockPolicy};
pub use error::{Result, SalesError};
