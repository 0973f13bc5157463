use criterion::{Criterion, criterion_group, criterion_main};
use domain::{CheckoutItem, NewCategory, NewProduct};
use reporting::ReportAggregator;
use sales::CheckoutEngine;
use store::{CatalogStore, InMemoryStore};

/// Populate a store with N three-line checkouts over five products.
async fn populate_store(store: &InMemoryStore, n: usize) {
    let category = store
        .create_category(NewCategory::new("Bench").unwrap())
        .await
        .unwrap();
    let mut ids = Vec::new();
    for i in 0..5 {
        let product = store
            .create_product(
                NewProduct::new(format!("Product {i}"), 1_000, 1_000_000, category.id).unwrap(),
            )
            .await
            .unwrap();
        ids.push(product.id);
    }

    let engine = CheckoutEngine::new(store.clone());
    for i in 0..n {
        let items: Vec<_> = (0..3)
            .map(|j| CheckoutItem::new(ids[(i + j) % ids.len()], 1 + j as i64).unwrap())
            .collect();
        engine.checkout(&items).await.unwrap();
    }
}

fn bench_summary_100_transactions(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryStore::new();
    rt.block_on(populate_store(&store, 100));
    let aggregator = ReportAggregator::new(store);

    c.bench_function("reporting/summary_100_transactions", |b| {
        b.iter(|| {
            rt.block_on(async {
                aggregator.summary_for_today().await.unwrap();
            });
        });
    });
}

fn bench_summary_1000_transactions(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryStore::new();
    rt.block_on(populate_store(&store, 1000));
    let aggregator = ReportAggregator::new(store);

    c.bench_function("reporting/summary_1000_transactions", |b| {
        b.iter(|| {
            rt.block_on(async {
                aggregator.summary_for_today().await.unwrap();
            });
        });
    });
}

criterion_group!(
    benches,
    bench_summary_100_transactions,
    bench_summary_1000_transactions
);
criterion_main!(benches);
