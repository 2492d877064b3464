use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::company::{Company, CompanyStatus};
use crate::models::invitation::RecruiterInvitation;
use crate::models::job::Job;
use crate::services::companies::CompanyDetails;
use crate::services::{companies, invitations, jobs};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CompanyListQuery {
    pub status: Option<CompanyStatus>,
}

/// GET /api/v1/companies
pub async fn handle_list_companies(
    State(state): State<AppState>,
    Query(params): Query<CompanyListQuery>,
) -> Result<Json<Vec<Company>>, AppError> {
    Ok(Json(companies::list_companies(&state.db, params.status).await?))
}

#[derive(Deserialize)]
pub struct CompanyRequest {
    pub actor_id: Uuid,
    #[serde(flatten)]
    pub details: CompanyDetails,
}

/// POST /api/v1/companies
pub async fn handle_create_company(
    State(state): State<AppState>,
    Json(req): Json<CompanyRequest>,
) -> Result<(StatusCode, Json<Company>), AppError> {
    let company = companies::create_company(&state.db, req.actor_id, req.details).await?;
    Ok((StatusCode::CREATED, Json(company)))
}

/// GET /api/v1/companies/:id
pub async fn handle_get_company(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Company>, AppError> {
    Ok(Json(companies::get_company(&state.db, id).await?))
}

/// PATCH /api/v1/companies/:id
pub async fn handle_update_company(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CompanyRequest>,
) -> Result<Json<Company>, AppError> {
    let company = companies::update_company(&state.db, req.actor_id, id, req.details).await?;
    Ok(Json(company))
}

#[derive(Deserialize)]
pub struct CompanyJobsQuery {
    pub actor_id: Option<Uuid>,
}

/// GET /api/v1/companies/:id/jobs
pub async fn handle_list_company_jobs(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<CompanyJobsQuery>,
) -> Result<Json<Vec<Job>>, AppError> {
    Ok(Json(
        jobs::list_company_jobs_for(&state.db, id, params.actor_id).await?,
    ))
}

#[derive(Deserialize)]
pub struct InviteRequest {
    pub actor_id: Uuid,
    pub email: String,
}

/// POST /api/v1/companies/:id/invitations
pub async fn handle_invite_recruiter(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<InviteRequest>,
) -> Result<(StatusCode, Json<RecruiterInvitation>), AppError> {
    let invitation =
        invitations::invite_recruiter(&state.db, req.actor_id, id, &req.email).await?;
    Ok((StatusCode::CREATED, Json(invitation)))
}
