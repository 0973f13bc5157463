use common::CategoryId;
use thiserror::Error;

/// Errors that can occur when interacting with a store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The referenced row does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// The category still has products filed under it.
    #[error("Category {0} is still referenced by products")]
    CategoryInUse(CategoryId),

    /// A persisted row could not be mapped back into a domain value.
    #[error("Corrupt row: {0}")]
    CorruptRow(String),

    /// The backend refused the operation.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    pub(crate) fn category_not_found(id: CategoryId) -> Self {
        StoreError::NotFound {
            entity: "Category",
            id: id.as_i64(),
        }
    }

    pub(crate) fn product_not_found(id: common::ProductId) -> Self {
        StoreError::NotFound {
            entity: "Product",
            id: id.as_i64(),
        }
    }

    /// Returns true when the error means "the row is missing" rather than
    /// "the store broke".
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
