use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::Application;
use crate::services::applications::{self, StatusUpdate};
use crate::state::AppState;

/// GET /api/v1/applications/:id
pub async fn handle_get_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Application>, AppError> {
    Ok(Json(applications::get_application(&state.db, id).await?))
}

#[derive(Deserialize)]
pub struct WithdrawRequest {
    pub actor_id: Uuid,
}

/// POST /api/v1/applications/:id/withdraw
pub async fn handle_withdraw(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<WithdrawRequest>,
) -> Result<Json<Application>, AppError> {
    Ok(Json(applications::withdraw(&state.db, req.actor_id, id).await?))
}

/// PATCH /api/v1/applications/:id/status
pub async fn handle_update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusUpdate>,
) -> Result<Json<Application>, AppError> {
    Ok(Json(applications::update_status(&state.db, id, req).await?))
}
