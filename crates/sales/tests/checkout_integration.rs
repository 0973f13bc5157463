//! Integration tests for checkout and catalog over the in-memory store.

use chrono::{Duration, Utc};
use common::ProductId;
use domain::{CheckoutItem, Money, NewCategory, NewProduct};
use sales::{CatalogService, CheckoutEngine, SalesError, StockPolicy};
use store::{CatalogStore, InMemoryStore, SalesStore};

struct TestHarness {
    store: InMemoryStore,
    catalog: CatalogService<InMemoryStore>,
    engine: CheckoutEngine<InMemoryStore>,
}

impl TestHarness {
    fn new() -> Self {
        Self::with_policy(StockPolicy::Reject)
    }

    fn with_policy(policy: StockPolicy) -> Self {
        let store = InMemoryStore::new();
        Self {
            catalog: CatalogService::new(store.clone()),
            engine: CheckoutEngine::with_policy(store.clone(), policy),
            store,
        }
    }

    async fn product(&self, name: &str, price: i64, stock: i64) -> ProductId {
        let category = match self.catalog.list_categories().await.unwrap().first() {
            Some(category) => category.clone(),
            None => self
                .catalog
                .create_category(NewCategory::new("Umum").unwrap())
                .await
                .unwrap(),
        };
        self.catalog
            .create_product(NewProduct::new(name, price, stock, category.id).unwrap())
            .await
            .unwrap()
            .id
    }

    async fn stock(&self, id: ProductId) -> i64 {
        self.store.get_product(id).await.unwrap().stock
    }
}

fn item(product_id: ProductId, quantity: i64) -> CheckoutItem {
    CheckoutItem::new(product_id, quantity).unwrap()
}

#[tokio::test]
async fn test_checkout_is_visible_in_committed_sales() {
    let h = TestHarness::new();
    let laptop = h.product("Laptop", 35_000_000, 10).await;
    let mouse = h.product("Mouse", 3_000_000, 20).await;

    let tx = h
        .engine
        .checkout(&[item(laptop, 2), item(mouse, 1)])
        .await
        .unwrap();

    let now = Utc::now();
    let committed = h
        .store
        .transactions_between(now - Duration::hours(1), now + Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(committed, vec![tx.clone()]);
    assert_eq!(tx.total_amount, Money::new(73_000_000));
    assert_eq!(h.stock(laptop).await, 8);
    assert_eq!(h.stock(mouse).await, 19);
}

#[tokio::test]
async fn test_detail_keeps_name_after_product_rename_and_delete() {
    let h = TestHarness::new();
    let kopi = h.product("Kopi Susu", 18_000, 5).await;

    let tx = h.engine.checkout(&[item(kopi, 1)]).await.unwrap();
    h.catalog.delete_product(kopi).await.unwrap();

    let now = Utc::now();
    let committed = h
        .store
        .transactions_between(now - Duration::hours(1), now + Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(committed[0].details[0].product_name, "Kopi Susu");
    assert_eq!(committed[0].details[0].id, tx.details[0].id);
}

#[tokio::test]
async fn test_same_product_twice_produces_two_lines() {
    let h = TestHarness::new();
    let teh = h.product("Teh", 5_000, 10).await;

    let tx = h
        .engine
        .checkout(&[item(teh, 2), item(teh, 3)])
        .await
        .unwrap();

    assert_eq!(tx.details.len(), 2);
    assert_eq!(tx.total_amount, Money::new(25_000));
    assert_eq!(h.stock(teh).await, 5);
}

#[tokio::test]
async fn test_concurrent_checkouts_of_last_unit() {
    let h = TestHarness::new();
    let last = h.product("Edisi Terbatas", 100_000, 1).await;

    let engine_a = CheckoutEngine::new(h.store.clone());
    let engine_b = CheckoutEngine::new(h.store.clone());
    let items = [item(last, 1)];

    let (a, b) = tokio::join!(engine_a.checkout(&items), engine_b.checkout(&items));

    let outcomes = [a, b];
    let succeeded = outcomes.iter().filter(|r| r.is_ok()).count();
    let rejected = outcomes
        .iter()
        .filter(|r| matches!(r, Err(SalesError::InsufficientStock { .. })))
        .count();
    assert_eq!(succeeded, 1);
    assert_eq!(rejected, 1);
    assert_eq!(h.stock(last).await, 0);
    assert_eq!(h.store.transaction_count().await, 1);
}

#[tokio::test]
async fn test_many_concurrent_checkouts_never_oversell() {
    let h = TestHarness::new();
    let a = h.product("Pensil", 2_000, 7).await;
    let b = h.product("Buku", 8_000, 7).await;

    let checkouts = (0..10).map(|i| {
        let engine = CheckoutEngine::new(h.store.clone());
        // Opposite item orders exercise the ascending lock order.
        let items = if i % 2 == 0 {
            vec![item(a, 1), item(b, 1)]
        } else {
            vec![item(b, 1), item(a, 1)]
        };
        async move { engine.checkout(&items).await }
    });
    let results = futures_util::future::join_all(checkouts).await;

    let succeeded = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(succeeded, 7);
    assert_eq!(h.stock(a).await, 0);
    assert_eq!(h.stock(b).await, 0);
    assert_eq!(h.store.detail_count().await, 14);
}

#[tokio::test]
async fn test_allow_negative_lets_both_concurrent_checkouts_through() {
    let h = TestHarness::with_policy(StockPolicy::AllowNegative);
    let last = h.product("Edisi Terbatas", 100_000, 1).await;

    let engine_b = CheckoutEngine::with_policy(h.store.clone(), StockPolicy::AllowNegative);
    let items = [item(last, 1)];
    let (a, b) = tokio::join!(h.engine.checkout(&items), engine_b.checkout(&items));

    assert!(a.is_ok());
    assert!(b.is_ok());
    assert_eq!(h.stock(last).await, -1);
}

#[tokio::test]
async fn test_failed_checkout_leaves_no_trace() {
    let h = TestHarness::new();
    let laptop = h.product("Laptop", 35_000_000, 10).await;

    let result = h
        .engine
        .checkout(&[item(laptop, 2), item(ProductId::new(99), 1)])
        .await;

    assert!(matches!(result, Err(SalesError::ProductNotFound(_))));
    assert_eq!(h.stock(laptop).await, 10);
    assert_eq!(h.store.transaction_count().await, 0);
    assert_eq!(h.store.detail_count().await, 0);
}

#[tokio::test]
async fn test_ids_are_assigned_in_commit_order() {
    let h = TestHarness::new();
    let roti = h.product("Roti", 10_000, 10).await;

    let first = h.engine.checkout(&[item(roti, 1)]).await.unwrap();
    let second = h.engine.checkout(&[item(roti, 1)]).await.unwrap();

    assert!(first.id < second.id);
    assert!(first.created_at <= second.created_at);
}
