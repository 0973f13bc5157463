//! Daily report endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use domain::DailySummary;

use crate::error::ApiError;
use crate::{AppState, PosStore};

/// GET /api/report/hari-ini
///
/// Revenue, transaction count and best seller for today.
#[tracing::instrument(skip(state))]
pub async fn today<S: PosStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<DailySummary>, ApiError> {
    Ok(Json(state.reports.summary_for_today().await?))
}
