//! Order read model endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::AggregateId;
use projections::OrderReadModel;

use crate::AppState;
use crate::error::ApiError;

/// GET /orders/{id} — load an order read model by ID.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<OrderReadModel>, ApiError> {
    let order = state.orders.get_by_id(&AggregateId::from(id)).await?;
    Ok(Json(order))
}

/// GET /orders — list every order read model, soft-deleted ones included.
#[tracing::instrument(skip(state))]
pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<Vec<OrderReadModel>>, ApiError> {
    Ok(Json(state.orders.get_all().await?))
}

/// DELETE /orders/{id} — physically remove an order read model.
#[tracing::instrument(skip(state))]
pub async fn purge(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.orders.purge(&AggregateId::from(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
