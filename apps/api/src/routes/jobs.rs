use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::filters::jobs::JobFilters;
use crate::models::application::Application;
use crate::models::job::Job;
use crate::services::applications::NewApplication;
use crate::services::jobs::JobDraft;
use crate::services::{applications, jobs};
use crate::state::AppState;

/// GET /api/v1/jobs
/// Approved jobs, newest first.
pub async fn handle_list_jobs(State(state): State<AppState>) -> Result<Json<Vec<Job>>, AppError> {
    Ok(Json(jobs::list_approved_jobs(&state.db).await?))
}

/// POST /api/v1/jobs/search
pub async fn handle_search_jobs(
    State(state): State<AppState>,
    Json(filters): Json<JobFilters>,
) -> Result<Json<Vec<Job>>, AppError> {
    Ok(Json(jobs::search_jobs(&state.db, &filters).await?))
}

#[derive(Deserialize)]
pub struct JobRequest {
    pub actor_id: Uuid,
    #[serde(flatten)]
    pub draft: JobDraft,
}

/// POST /api/v1/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    Json(req): Json<JobRequest>,
) -> Result<(StatusCode, Json<Job>), AppError> {
    let job = jobs::create_job(&state.db, req.actor_id, req.draft).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Job>, AppError> {
    Ok(Json(jobs::get_job(&state.db, id).await?))
}

/// PUT /api/v1/jobs/:id
pub async fn handle_update_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<JobRequest>,
) -> Result<Json<Job>, AppError> {
    Ok(Json(jobs::update_job(&state.db, req.actor_id, id, req.draft).await?))
}

/// POST /api/v1/jobs/:id/applications
pub async fn handle_apply(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<NewApplication>,
) -> Result<(StatusCode, Json<Application>), AppError> {
    let application = applications::apply(&state.db, id, req).await?;
    Ok((StatusCode::CREATED, Json(application)))
}

#[derive(Deserialize)]
pub struct ActorQuery {
    pub actor_id: Uuid,
}

/// GET /api/v1/jobs/:id/applications
pub async fn handle_list_job_applications(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<ActorQuery>,
) -> Result<Json<Vec<Application>>, AppError> {
    Ok(Json(
        applications::list_for_job(&state.db, params.actor_id, id).await?,
    ))
}
