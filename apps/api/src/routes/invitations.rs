use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::invitation::RecruiterInvitation;
use crate::services::invitations;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct AcceptInvitation {
    pub user_id: Uuid,
}

/// POST /api/v1/invitations/:id/accept
pub async fn handle_accept_invitation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AcceptInvitation>,
) -> Result<Json<RecruiterInvitation>, AppError> {
    Ok(Json(
        invitations::accept_invitation(&state.db, id, req.user_id).await?,
    ))
}
