use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CategoryId, ProductId, TransactionId};
use domain::{
    Category, CategoryUpdate, Money, NewCategory, NewProduct, NewTransactionDetail, Product,
    ProductUpdate, Quantity, Transaction, TransactionDetail,
};

use crate::Result;

/// Category and product persistence.
///
/// Lookups of a missing id fail with [`StoreError::NotFound`], never with a
/// generic database error.
///
/// [`StoreError::NotFound`]: crate::StoreError::NotFound
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Lists all categories ordered by id.
    async fn list_categories(&self) -> Result<Vec<Category>>;

    /// Retrieves a category by id.
    async fn get_category(&self, id: CategoryId) -> Result<Category>;

    /// Inserts a category and returns it with its assigned id.
    async fn create_category(&self, category: NewCategory) -> Result<Category>;

    /// Renames a category.
    async fn update_category(&self, id: CategoryId, update: CategoryUpdate) -> Result<Category>;

    /// Deletes a category that no product references.
    async fn delete_category(&self, id: CategoryId) -> Result<()>;

    /// Lists products ordered by id, optionally filtered by a case-insensitive
    /// substring of the name.
    async fn list_products(&self, name_filter: Option<&str>) -> Result<Vec<Product>>;

    /// Retrieves a product with its category.
    async fn get_product(&self, id: ProductId) -> Result<Product>;

    /// Inserts a product and returns it with its assigned id.
    async fn create_product(&self, product: NewProduct) -> Result<Product>;

    /// Overwrites name, price and stock; moves the product to another
    /// category only when the update names one.
    async fn update_product(&self, id: ProductId, update: ProductUpdate) -> Result<Product>;

    /// Deletes a product. Committed sale lines keep their name snapshot.
    async fn delete_product(&self, id: ProductId) -> Result<()>;
}

/// Sale persistence.
///
/// Writes go through a [`UnitOfWork`]; reads of committed sales are plain
/// queries that see one consistent snapshot.
#[async_trait]
pub trait SalesStore: Send + Sync {
    /// The unit of work type handed out by [`SalesStore::begin`].
    type Unit: UnitOfWork;

    /// Opens a new all-or-nothing unit of work.
    async fn begin(&self) -> Result<Self::Unit>;

    /// Retrieves committed transactions with `from <= created_at < to`,
    /// ordered by id, each with its details ordered by id.
    async fn transactions_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Transaction>>;
}

/// An atomic unit of work against a sales store.
///
/// Nothing done through a unit is visible to other readers until
/// [`UnitOfWork::commit`] succeeds. Dropping a unit without committing
/// discards every change, so an early `?` return is always a rollback.
#[async_trait]
pub trait UnitOfWork: Send {
    /// Locks the given products for the rest of the unit.
    ///
    /// Locks are taken in ascending id order so that concurrent multi-item
    /// units cannot deadlock. Ids that do not exist are skipped.
    async fn lock_products(&mut self, ids: &[ProductId]) -> Result<()>;

    /// Reads a product, including stock changes made earlier in this unit.
    async fn product(&mut self, id: ProductId) -> Result<Product>;

    /// Subtracts `quantity` from the product's stock and returns the new
    /// level. No floor is applied here.
    async fn decrement_stock(&mut self, id: ProductId, quantity: Quantity) -> Result<i64>;

    /// Inserts a transaction header, returning its id and server timestamp.
    async fn insert_transaction(
        &mut self,
        total_amount: Money,
    ) -> Result<(TransactionId, DateTime<Utc>)>;

    /// Inserts one detail line for a transaction inserted in this unit.
    async fn insert_detail(
        &mut self,
        transaction_id: TransactionId,
        detail: NewTransactionDetail,
    ) -> Result<TransactionDetail>;

    /// Makes every change of this unit visible.
    async fn commit(self) -> Result<()>
    where
        Self: Sized;

    /// Discards every change of this unit.
    async fn rollback(self) -> Result<()>
    where
        Self: Sized;
}
