//! Checkout endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use common::ProductId;
use domain::{CheckoutItem, Transaction};
use serde::Deserialize;

use crate::error::ApiError;
use crate::{AppState, PosStore};

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub items: Vec<CheckoutItemRequest>,
}

/// One requested line. Quantity is signed so that zero and negative values
/// reach validation instead of failing deserialization.
#[derive(Debug, Deserialize)]
pub struct CheckoutItemRequest {
    pub product_id: i64,
    pub quantity: i64,
}

/// POST /api/checkout
#[tracing::instrument(skip(state, payload))]
pub async fn create<S: PosStore>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Transaction>), ApiError> {
    let Json(req) = payload?;
    let items = req
        .items
        .iter()
        .map(|i| CheckoutItem::new(ProductId::new(i.product_id), i.quantity))
        .collect::<Result<Vec<_>, _>>()?;

    let transaction = state.checkout.checkout(&items).await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}
