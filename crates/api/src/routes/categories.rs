//! Category CRUD endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::CategoryId;
use domain::{Category, CategoryUpdate, NewCategory};
use serde::Deserialize;

use crate::error::ApiError;
use crate::routes::DeletedResponse;
use crate::{AppState, PosStore};

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
}

/// GET /api/categories
#[tracing::instrument(skip(state))]
pub async fn list<S: PosStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(state.catalog.list_categories().await?))
}

/// POST /api/categories
#[tracing::instrument(skip(state, payload))]
pub async fn create<S: PosStore>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<CategoryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let Json(req) = payload?;
    let created = state
        .catalog
        .create_category(NewCategory::new(req.name)?)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/categories/{id}
#[tracing::instrument(skip(state, id))]
pub async fn get<S: PosStore>(
    State(state): State<Arc<AppState<S>>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Category>, ApiError> {
    let Path(id) = id?;
    Ok(Json(state.catalog.get_category(CategoryId::new(id)).await?))
}

/// PUT /api/categories/{id}
#[tracing::instrument(skip(state, id, payload))]
pub async fn update<S: PosStore>(
    State(state): State<Arc<AppState<S>>>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<CategoryRequest>, JsonRejection>,
) -> Result<Json<Category>, ApiError> {
    let Path(id) = id?;
    let Json(req) = payload?;
    let updated = state
        .catalog
        .update_category(CategoryId::new(id), CategoryUpdate::new(req.name)?)
        .await?;
    Ok(Json(updated))
}

/// DELETE /api/categories/{id}
#[tracing::instrument(skip(state, id))]
pub async fn delete<S: PosStore>(
    State(state): State<Arc<AppState<S>>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let Path(id) = id?;
    state.catalog.delete_category(CategoryId::new(id)).await?;
    Ok(Json(DeletedResponse::new("Category")))
}
