use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::filters::candidates::{filter_candidates, CandidateFilters};
use crate::models::application::Application;
use crate::models::invitation::RecruiterInvitation;
use crate::models::job::Job;
use crate::models::user::{SavedSearch, UserProfile, UserRole};
use crate::services::users::{NewSavedSearch, NewUser, ProfileUpdate};
use crate::services::{applications, invitations, jobs, users};
use crate::state::AppState;

/// POST /api/v1/users
pub async fn handle_create_user(
    State(state): State<AppState>,
    Json(req): Json<NewUser>,
) -> Result<(StatusCode, Json<UserProfile>), AppError> {
    let user = users::create_user(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/v1/users/:id
pub async fn handle_get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserProfile>, AppError> {
    Ok(Json(users::get_user(&state.db, id).await?))
}

/// PATCH /api/v1/users/:id
pub async fn handle_update_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ProfileUpdate>,
) -> Result<Json<UserProfile>, AppError> {
    Ok(Json(users::update_profile(&state.db, id, req).await?))
}

/// GET /api/v1/users/:id/saved-jobs
pub async fn handle_list_saved_jobs(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Job>>, AppError> {
    let user = users::get_user(&state.db, id).await?;
    Ok(Json(jobs::fetch_jobs_by_ids(&state.db, &user.saved_job_ids).await?))
}

/// PUT /api/v1/users/:id/saved-jobs/:job_id
pub async fn handle_save_job(
    State(state): State<AppState>,
    Path((id, job_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<UserProfile>, AppError> {
    Ok(Json(users::save_job(&state.db, id, job_id).await?))
}

/// DELETE /api/v1/users/:id/saved-jobs/:job_id
pub async fn handle_unsave_job(
    State(state): State<AppState>,
    Path((id, job_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<UserProfile>, AppError> {
    Ok(Json(users::unsave_job(&state.db, id, job_id).await?))
}

/// POST /api/v1/users/:id/saved-searches
pub async fn handle_add_saved_search(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<NewSavedSearch>,
) -> Result<(StatusCode, Json<SavedSearch>), AppError> {
    let search = users::add_saved_search(&state.db, id, req).await?;
    Ok((StatusCode::CREATED, Json(search)))
}

/// DELETE /api/v1/users/:id/saved-searches/:search_id
pub async fn handle_remove_saved_search(
    State(state): State<AppState>,
    Path((id, search_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<UserProfile>, AppError> {
    Ok(Json(users::remove_saved_search(&state.db, id, search_id).await?))
}

/// GET /api/v1/users/:id/applications
pub async fn handle_list_user_applications(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Application>>, AppError> {
    Ok(Json(applications::list_for_applicant(&state.db, id).await?))
}

/// GET /api/v1/users/:id/invitations
pub async fn handle_list_user_invitations(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<RecruiterInvitation>>, AppError> {
    let user = users::get_user(&state.db, id).await?;
    Ok(Json(
        invitations::list_pending_for_email(&state.db, &user.email).await?,
    ))
}

#[derive(Deserialize)]
pub struct CandidateSearchRequest {
    pub actor_id: Uuid,
    #[serde(default)]
    pub filters: CandidateFilters,
}

/// POST /api/v1/candidates/search
/// Employers with a company and moderators may browse searchable candidates.
pub async fn handle_search_candidates(
    State(state): State<AppState>,
    Json(req): Json<CandidateSearchRequest>,
) -> Result<Json<Vec<UserProfile>>, AppError> {
    let actor = users::get_user(&state.db, req.actor_id).await?;
    let allowed = actor.is_active()
        && (actor.role.can_moderate()
            || (actor.role == UserRole::Employer && actor.company_id.is_some()));
    if !allowed {
        return Err(AppError::Forbidden(
            "Only company members can search candidates".to_string(),
        ));
    }

    let candidates = users::list_searchable_candidates(&state.db).await?;
    let matched = filter_candidates(&candidates, &req.filters, Utc::now())
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(matched))
}
