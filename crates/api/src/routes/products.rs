//! Product CRUD endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::{CategoryId, ProductId};
use domain::{NewProduct, Product, ProductUpdate};
use serde::Deserialize;

use crate::error::ApiError;
use crate::routes::DeletedResponse;
use crate::{AppState, PosStore};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub price: i64,
    pub stock: i64,
    pub category_id: i64,
}

/// Full replacement of a product; omitting `category_id` keeps the current one.
#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: String,
    pub price: i64,
    pub stock: i64,
    pub category_id: Option<i64>,
}

/// GET /api/products?name=
#[tracing::instrument(skip(state, query))]
pub async fn list<S: PosStore>(
    State(state): State<Arc<AppState<S>>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let Query(query) = query?;
    let products = state.catalog.list_products(query.name.as_deref()).await?;
    Ok(Json(products))
}

/// POST /api/products
#[tracing::instrument(skip(state, payload))]
pub async fn create<S: PosStore>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<CreateProductRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let Json(req) = payload?;
    let product = NewProduct::new(
        req.name,
        req.price,
        req.stock,
        CategoryId::new(req.category_id),
    )?;
    let created = state.catalog.create_product(product).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/products/{id}
#[tracing::instrument(skip(state, id))]
pub async fn get<S: PosStore>(
    State(state): State<Arc<AppState<S>>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Product>, ApiError> {
    let Path(id) = id?;
    Ok(Json(state.catalog.get_product(ProductId::new(id)).await?))
}

/// PUT /api/products/{id}
#[tracing::instrument(skip(state, id, payload))]
pub async fn update<S: PosStore>(
    State(state): State<Arc<AppState<S>>>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateProductRequest>, JsonRejection>,
) -> Result<Json<Product>, ApiError> {
    let Path(id) = id?;
    let Json(req) = payload?;
    let update = ProductUpdate::new(
        req.name,
        req.price,
        req.stock,
        req.category_id.map(CategoryId::new),
    )?;
    let updated = state
        .catalog
        .update_product(ProductId::new(id), update)
        .await?;
    Ok(Json(updated))
}

/// DELETE /api/products/{id}
#[tracing::instrument(skip(state, id))]
pub async fn delete<S: PosStore>(
    State(state): State<Arc<AppState<S>>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let Path(id) = id?;
    state.catalog.delete_product(ProductId::new(id)).await?;
    Ok(Json(DeletedResponse::new("Product")))
}
