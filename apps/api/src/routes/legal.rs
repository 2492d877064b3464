use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::legal::{LegalDocument, LegalDocumentKind};
use crate::services::legal;
use crate::state::AppState;

/// GET /api/v1/legal/:id
pub async fn handle_get_legal(
    State(state): State<AppState>,
    Path(kind): Path<LegalDocumentKind>,
) -> Result<Json<LegalDocument>, AppError> {
    Ok(Json(legal::get_legal_document(&state.db, kind).await?))
}

#[derive(Deserialize)]
pub struct LegalUpdate {
    pub actor_id: Uuid,
    pub content: String,
}

/// PUT /api/v1/legal/:id
pub async fn handle_upsert_legal(
    State(state): State<AppState>,
    Path(kind): Path<LegalDocumentKind>,
    Json(req): Json<LegalUpdate>,
) -> Result<Json<LegalDocument>, AppError> {
    let document = legal::upsert_legal_document(&state.db, req.actor_id, kind, &req.content).await?;
    Ok(Json(document))
}
