pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::{InMemoryStore, InMemoryUnit};
pub use postgres::{PostgresStore, PostgresUnit};
pub use store::{CatalogStore, SalesStore, UnitOfWork};
