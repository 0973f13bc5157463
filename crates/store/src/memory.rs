use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CategoryId, DetailId, ProductId, TransactionId};
use domain::{
    Category, CategoryUpdate, Money, NewCategory, NewProduct, NewTransactionDetail, Product,
    ProductUpdate, Quantity, Transaction, TransactionDetail,
};
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};

use crate::{
    Result, StoreError,
    store::{CatalogStore, SalesStore, UnitOfWork},
};

#[derive(Debug, Clone)]
struct ProductRow {
    id: ProductId,
    name: String,
    price: Money,
    stock: i64,
    category_id: CategoryId,
}

#[derive(Debug, Clone)]
struct TransactionRow {
    id: TransactionId,
    total_amount: Money,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct MemoryState {
    categories: Vec<Category>,
    products: Vec<ProductRow>,
    transactions: Vec<TransactionRow>,
    details: Vec<TransactionDetail>,
    last_category_id: i64,
    last_product_id: i64,
    last_transaction_id: i64,
    last_detail_id: i64,
    fail_on_detail_insert: bool,
}

impl MemoryState {
    fn category(&self, id: CategoryId) -> Result<&Category> {
        self.categories
            .iter()
            .find(|c| c.id == id)
            .ok_or(StoreError::category_not_found(id))
    }

    fn product_row(&self, id: ProductId) -> Option<&ProductRow> {
        self.products.iter().find(|p| p.id == id)
    }

    fn to_product(&self, row: &ProductRow) -> Result<Product> {
        let category = self.category(row.category_id).map_err(|_| {
            StoreError::CorruptRow(format!(
                "product {} references missing category {}",
                row.id, row.category_id
            ))
        })?;
        Ok(Product {
            id: row.id,
            name: row.name.clone(),
            price: row.price,
            stock: row.stock,
            category: category.clone(),
        })
    }
}

/// In-memory store implementation.
///
/// A single lock guards the whole state. A [`UnitOfWork`] holds the write
/// side of that lock from `begin` until it is committed or dropped, which
/// serializes checkouts the same way row locks do in PostgreSQL.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures every later detail insert to fail until reset.
    pub async fn set_fail_on_detail_insert(&self, fail: bool) {
        self.state.write().await.fail_on_detail_insert = fail;
    }

    /// Returns the number of committed transactions.
    pub async fn transaction_count(&self) -> usize {
        self.state.read().await.transactions.len()
    }

    /// Returns the number of committed detail lines.
    pub async fn detail_count(&self) -> usize {
        self.state.read().await.details.len()
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        let state = self.state.read().await;
        let mut categories = state.categories.clone();
        categories.sort_by_key(|c| c.id);
        Ok(categories)
    }

    async fn get_category(&self, id: CategoryId) -> Result<Category> {
        self.state.read().await.category(id).cloned()
    }

    async fn create_category(&self, category: NewCategory) -> Result<Category> {
        let mut state = self.state.write().await;
        state.last_category_id += 1;
        let category = Category {
            id: CategoryId::new(state.last_category_id),
            name: category.name,
        };
        state.categories.push(category.clone());
        Ok(category)
    }

    async fn update_category(&self, id: CategoryId, update: CategoryUpdate) -> Result<Category> {
        let mut state = self.state.write().await;
        let category = state
            .categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(StoreError::category_not_found(id))?;
        category.name = update.name;
        Ok(category.clone())
    }

    async fn delete_category(&self, id: CategoryId) -> Result<()> {
        let mut state = self.state.write().await;
        let index = state
            .categories
            .iter()
            .position(|c| c.id == id)
            .ok_or(StoreError::category_not_found(id))?;
        if state.products.iter().any(|p| p.category_id == id) {
            return Err(StoreError::CategoryInUse(id));
        }
        state.categories.remove(index);
        Ok(())
    }

    async fn list_products(&self, name_filter: Option<&str>) -> Result<Vec<Product>> {
        let state = self.state.read().await;
        let mut products = state
            .products
            .iter()
            .map(|row| state.to_product(row))
            .collect::<Result<Vec<_>>>()?;
        if let Some(filter) = name_filter {
            products.retain(|p| p.name_matches(filter));
        }
        products.sort_by_key(|p| p.id);
        Ok(products)
    }

    async fn get_product(&self, id: ProductId) -> Result<Product> {
        let state = self.state.read().await;
        let row = state
            .product_row(id)
            .ok_or(StoreError::product_not_found(id))?;
        state.to_product(row)
    }

    async fn create_product(&self, product: NewProduct) -> Result<Product> {
        let mut state = self.state.write().await;
        state.category(product.category_id)?;
        state.last_product_id += 1;
        let row = ProductRow {
            id: ProductId::new(state.last_product_id),
            name: product.name,
            price: product.price,
            stock: product.stock,
            category_id: product.category_id,
        };
        let created = state.to_product(&row)?;
        state.products.push(row);
        Ok(created)
    }

    async fn update_product(&self, id: ProductId, update: ProductUpdate) -> Result<Product> {
        let mut state = self.state.write().await;
        if let Some(category_id) = update.category_id {
            state.category(category_id)?;
        }
        let row = state
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::product_not_found(id))?;
        row.name = update.name;
        row.price = update.price;
        row.stock = update.stock;
        if let Some(category_id) = update.category_id {
            row.category_id = category_id;
        }
        let row = row.clone();
        state.to_product(&row)
    }

    async fn delete_product(&self, id: ProductId) -> Result<()> {
        let mut state = self.state.write().await;
        let index = state
            .products
            .iter()
            .position(|p| p.id == id)
            .ok_or(StoreError::product_not_found(id))?;
        state.products.remove(index);
        Ok(())
    }
}

#[async_trait]
impl SalesStore for InMemoryStore {
    type Unit = InMemoryUnit;

    async fn begin(&self) -> Result<InMemoryUnit> {
        let state = self.state.clone().write_owned().await;
        Ok(InMemoryUnit {
            next_transaction_id: state.last_transaction_id,
            next_detail_id: state.last_detail_id,
            state,
            stock: HashMap::new(),
            transactions: Vec::new(),
            details: Vec::new(),
        })
    }

    async fn transactions_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Transaction>> {
        let state = self.state.read().await;
        let mut transactions: Vec<Transaction> = state
            .transactions
            .iter()
            .filter(|t| t.created_at >= from && t.created_at < to)
            .map(|t| Transaction {
                id: t.id,
                total_amount: t.total_amount,
                created_at: t.created_at,
                details: Vec::new(),
            })
            .collect();
        transactions.sort_by_key(|t| t.id);

        let index: HashMap<TransactionId, usize> = transactions
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id, i))
            .collect();

        let mut details: Vec<&TransactionDetail> = state
            .details
            .iter()
            .filter(|d| index.contains_key(&d.transaction_id))
            .collect();
        details.sort_by_key(|d| d.id);
        for detail in details {
            transactions[index[&detail.transaction_id]]
                .details
                .push(detail.clone());
        }

        Ok(transactions)
    }
}

/// Unit of work over an [`InMemoryStore`].
///
/// Holds the store's write lock. Changes are staged on the unit and only
/// copied into the shared state by `commit`.
pub struct InMemoryUnit {
    state: OwnedRwLockWriteGuard<MemoryState>,
    stock: HashMap<ProductId, i64>,
    transactions: Vec<TransactionRow>,
    details: Vec<TransactionDetail>,
    next_transaction_id: i64,
    next_detail_id: i64,
}

impl InMemoryUnit {
    fn current_stock(&self, row: &ProductRow) -> i64 {
        self.stock.get(&row.id).copied().unwrap_or(row.stock)
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnit {
    async fn lock_products(&mut self, _ids: &[ProductId]) -> Result<()> {
        // The unit already holds the store-wide lock.
        Ok(())
    }

    async fn product(&mut self, id: ProductId) -> Result<Product> {
        let row = self
            .state
            .product_row(id)
            .ok_or(StoreError::product_not_found(id))?;
        let mut product = self.state.to_product(row)?;
        product.stock = self.current_stock(row);
        Ok(product)
    }

    async fn decrement_stock(&mut self, id: ProductId, quantity: Quantity) -> Result<i64> {
        let row = self
            .state
            .product_row(id)
            .ok_or(StoreError::product_not_found(id))?;
        let remaining = self.current_stock(row) - i64::from(quantity.get());
        self.stock.insert(id, remaining);
        Ok(remaining)
    }

    async fn insert_transaction(
        &mut self,
        total_amount: Money,
    ) -> Result<(TransactionId, DateTime<Utc>)> {
        self.next_transaction_id += 1;
        let row = TransactionRow {
            id: TransactionId::new(self.next_transaction_id),
            total_amount,
            created_at: Utc::now(),
        };
        let inserted = (row.id, row.created_at);
        self.transactions.push(row);
        Ok(inserted)
    }

    async fn insert_detail(
        &mut self,
        transaction_id: TransactionId,
        detail: NewTransactionDetail,
    ) -> Result<TransactionDetail> {
        if self.state.fail_on_detail_insert {
            return Err(StoreError::Unavailable(
                "detail insert rejected".to_string(),
            ));
        }
        if !self.transactions.iter().any(|t| t.id == transaction_id) {
            return Err(StoreError::NotFound {
                entity: "Transaction",
                id: transaction_id.as_i64(),
            });
        }
        self.next_detail_id += 1;
        let detail = detail.into_detail(DetailId::new(self.next_detail_id), transaction_id);
        self.details.push(detail.clone());
        Ok(detail)
    }

    async fn commit(mut self) -> Result<()> {
        let stock = std::mem::take(&mut self.stock);
        for row in self.state.products.iter_mut() {
            if let Some(level) = stock.get(&row.id) {
                row.stock = *level;
            }
        }
        let transactions = std::mem::take(&mut self.transactions);
        let details = std::mem::take(&mut self.details);
        self.state.transactions.extend(transactions);
        self.state.details.extend(details);
        self.state.last_transaction_id = self.next_transaction_id;
        self.state.last_detail_id = self.next_detail_id;
        tracing::debug!(
            last_transaction_id = self.next_transaction_id,
            "in-memory unit committed"
        );
        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        tracing::debug!(
            staged_transactions = self.transactions.len(),
            "in-memory unit rolled back"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded_store() -> (InMemoryStore, Product, Product) {
        let store = InMemoryStore::new();
        let category = store
            .create_category(NewCategory::new("Elektronik").unwrap())
            .await
            .unwrap();
        let laptop = store
            .create_product(NewProduct::new("Laptop", 35_000_000, 10, category.id).unwrap())
            .await
            .unwrap();
        let mouse = store
            .create_product(NewProduct::new("Mouse", 3_000_000, 20, category.id).unwrap())
            .await
            .unwrap();
        (store, laptop, mouse)
    }

    fn qty(n: i64) -> Quantity {
        Quantity::new(n).unwrap()
    }

    fn pending(product: &Product, quantity: i64) -> NewTransactionDetail {
        NewTransactionDetail {
            product_id: product.id,
            product_name: product.name.clone(),
            quantity: qty(quantity),
            subtotal: product.price.checked_mul(qty(quantity)).unwrap(),
        }
    }

    #[tokio::test]
    async fn create_and_get_product() {
        let (store, laptop, _) = seeded_store().await;

        let fetched = store.get_product(laptop.id).await.unwrap();
        assert_eq!(fetched, laptop);
        assert_eq!(fetched.category.name, "Elektronik");
    }

    #[tokio::test]
    async fn get_missing_product_is_not_found() {
        let store = InMemoryStore::new();
        let err = store.get_product(ProductId::new(99)).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn create_product_requires_category() {
        let store = InMemoryStore::new();
        let result = store
            .create_product(NewProduct::new("Kopi", 5_000, 1, CategoryId::new(7)).unwrap())
            .await;
        assert!(matches!(
            result,
            Err(StoreError::NotFound {
                entity: "Category",
                id: 7
            })
        ));
    }

    #[tokio::test]
    async fn list_products_filters_by_name() {
        let (store, _, mouse) = seeded_store().await;

        let all = store.list_products(None).await.unwrap();
        assert_eq!(all.len(), 2);

        let filtered = store.list_products(Some("MOU")).await.unwrap();
        assert_eq!(filtered, vec![mouse]);
    }

    #[tokio::test]
    async fn update_product_keeps_category_when_not_given() {
        let (store, laptop, _) = seeded_store().await;

        let updated = store
            .update_product(
                laptop.id,
                ProductUpdate::new("Laptop Pro", 40_000_000, 4, None).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Laptop Pro");
        assert_eq!(updated.stock, 4);
        assert_eq!(updated.category, laptop.category);
    }

    #[tokio::test]
    async fn delete_category_in_use_is_rejected() {
        let (store, laptop, _) = seeded_store().await;

        let result = store.delete_category(laptop.category.id).await;
        assert!(matches!(result, Err(StoreError::CategoryInUse(_))));
    }

    #[tokio::test]
    async fn committed_unit_is_visible() {
        let (store, laptop, mouse) = seeded_store().await;

        let mut unit = store.begin().await.unwrap();
        assert_eq!(unit.decrement_stock(laptop.id, qty(2)).await.unwrap(), 8);
        assert_eq!(unit.decrement_stock(mouse.id, qty(1)).await.unwrap(), 19);
        let (tx_id, _) = unit
            .insert_transaction(Money::new(73_000_000))
            .await
            .unwrap();
        unit.insert_detail(tx_id, pending(&laptop, 2)).await.unwrap();
        unit.insert_detail(tx_id, pending(&mouse, 1)).await.unwrap();
        unit.commit().await.unwrap();

        assert_eq!(store.get_product(laptop.id).await.unwrap().stock, 8);
        assert_eq!(store.get_product(mouse.id).await.unwrap().stock, 19);
        assert_eq!(store.transaction_count().await, 1);
        assert_eq!(store.detail_count().await, 2);
    }

    #[tokio::test]
    async fn dropped_unit_discards_changes() {
        let (store, laptop, _) = seeded_store().await;

        {
            let mut unit = store.begin().await.unwrap();
            unit.decrement_stock(laptop.id, qty(3)).await.unwrap();
            unit.insert_transaction(Money::new(1)).await.unwrap();
        }

        assert_eq!(store.get_product(laptop.id).await.unwrap().stock, 10);
        assert_eq!(store.transaction_count().await, 0);
    }

    #[tokio::test]
    async fn unit_reads_its_own_stock_changes() {
        let (store, laptop, _) = seeded_store().await;

        let mut unit = store.begin().await.unwrap();
        unit.decrement_stock(laptop.id, qty(4)).await.unwrap();
        assert_eq!(unit.product(laptop.id).await.unwrap().stock, 6);
        unit.rollback().await.unwrap();

        assert_eq!(store.get_product(laptop.id).await.unwrap().stock, 10);
    }

    #[tokio::test]
    async fn decrement_has_no_floor() {
        let (store, laptop, _) = seeded_store().await;

        let mut unit = store.begin().await.unwrap();
        assert_eq!(unit.decrement_stock(laptop.id, qty(12)).await.unwrap(), -2);
    }

    #[tokio::test]
    async fn injected_detail_failure() {
        let (store, laptop, _) = seeded_store().await;
        store.set_fail_on_detail_insert(true).await;

        let mut unit = store.begin().await.unwrap();
        let (tx_id, _) = unit.insert_transaction(Money::new(1)).await.unwrap();
        let result = unit.insert_detail(tx_id, pending(&laptop, 1)).await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }

    #[tokio::test]
    async fn transactions_between_filters_and_orders() {
        let (store, laptop, mouse) = seeded_store().await;

        for product in [&mouse, &laptop] {
            let mut unit = store.begin().await.unwrap();
            let (tx_id, _) = unit.insert_transaction(product.price).await.unwrap();
            unit.insert_detail(tx_id, pending(product, 1)).await.unwrap();
            unit.commit().await.unwrap();
        }

        let now = Utc::now();
        let found = store
            .transactions_between(now - chrono::Duration::hours(1), now + chrono::Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
        assert!(found[0].id < found[1].id);
        assert_eq!(found[0].details[0].product_id, mouse.id);
        assert_eq!(found[1].details[0].product_id, laptop.id);

        let later = store
            .transactions_between(now + chrono::Duration::hours(1), now + chrono::Duration::hours(2))
            .await
            .unwrap();
        assert!(later.is_empty());
    }
}
