//! HTTP API server for the point-of-sale backend.
//!
//! Provides REST endpoints for catalog maintenance, checkout and the daily
//! report, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use domain::{NewCategory, NewProduct};
use metrics_exporter_prometheus::PrometheusHandle;
use reporting::{ReportAggregator, ReportClock};
use sales::{CatalogService, CheckoutEngine, StockPolicy};
use store::{CatalogStore, SalesStore};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// A store backend the API can serve from.
pub trait PosStore: CatalogStore + SalesStore + Clone + 'static {}

impl<T: CatalogStore + SalesStore + Clone + 'static> PosStore for T {}

/// Shared application state accessible from all handlers.
pub struct AppState<S: PosStore> {
    pub catalog: CatalogService<S>,
    pub checkout: CheckoutEngine<S>,
    pub reports: ReportAggregator<S>,
}

impl<S: PosStore> AppState<S> {
    pub fn new(store: S, stock_policy: StockPolicy, report_clock: ReportClock) -> Self {
        Self {
            catalog: CatalogService::new(store.clone()),
            checkout: CheckoutEngine::with_policy(store.clone(), stock_policy),
            reports: ReportAggregator::with_clock(store, report_clock),
        }
    }
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: PosStore>(state: Arc<AppState<S>>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route(
            "/metrics",
            get(routes::metrics::render).fallback(routes::method_not_allowed),
        )
        .with_state(metrics_handle);

    Router::new()
        .route(
            "/health",
            get(routes::health::check).fallback(routes::method_not_allowed),
        )
        .route(
            "/api/categories",
            get(routes::categories::list::<S>)
                .post(routes::categories::create::<S>)
                .fallback(routes::method_not_allowed),
        )
        .route(
            "/api/categories/{id}",
            get(routes::categories::get::<S>)
                .put(routes::categories::update::<S>)
                .delete(routes::categories::delete::<S>)
                .fallback(routes::method_not_allowed),
        )
        .route(
            "/api/products",
            get(routes::products::list::<S>)
                .post(routes::products::create::<S>)
                .fallback(routes::method_not_allowed),
        )
        .route(
            "/api/products/{id}",
            get(routes::products::get::<S>)
                .put(routes::products::update::<S>)
                .delete(routes::products::delete::<S>)
                .fallback(routes::method_not_allowed),
        )
        .route(
            "/api/checkout",
            post(routes::checkout::create::<S>).fallback(routes::method_not_allowed),
        )
        .route(
            "/api/report/hari-ini",
            get(routes::report::today::<S>).fallback(routes::method_not_allowed),
        )
        .fallback(routes::not_found)
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Fills an empty catalog with a few categories and products so the
/// in-memory server is usable out of the box. Does nothing when any
/// category already exists.
pub async fn seed_catalog<S: CatalogStore>(catalog: &CatalogService<S>) -> sales::Result<()> {
    if !catalog.list_categories().await?.is_empty() {
        return Ok(());
    }

    let catalog_seed: [(&str, &[(&str, i64, i64)]); 2] = [
        (
            "Elektronik",
            &[("Laptop", 35_000_000, 10), ("Mouse", 3_000_000, 20)],
        ),
        (
            "Minuman",
            &[("Kopi Susu", 18_000, 50), ("Teh Manis", 8_000, 50)],
        ),
    ];

    for (category_name, products) in catalog_seed {
        let category = catalog
            .create_category(NewCategory::new(category_name)?)
            .await?;
        for (name, price, stock) in products {
            catalog
                .create_product(NewProduct::new(*name, *price, *stock, category.id)?)
                .await?;
        }
    }
    tracing::info!("seeded in-memory catalog");
    Ok(())
}
