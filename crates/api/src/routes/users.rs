//! User read model endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::AggregateId;
use projections::UserReadModel;

use crate::AppState;
use crate::error::ApiError;

/// GET /users/{id} — load a user read model by ID.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<UserReadModel>, ApiError> {
    let user = state.users.get_by_id(&AggregateId::from(id)).await?;
    Ok(Json(user))
}

/// GET /users — list every user read model.
#[tracing::instrument(skip(state))]
pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<Vec<UserReadModel>>, ApiError> {
    Ok(Json(state.users.get_all().await?))
}

/// DELETE /users/{id} — physically remove a user read model.
#[tracing::instrument(skip(state))]
pub async fn purge(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.users.purge(&AggregateId::from(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
