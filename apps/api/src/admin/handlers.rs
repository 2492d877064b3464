use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::admin::{apply_table_query, Page, TableQuery};
use crate::errors::AppError;
use crate::models::application::Application;
use crate::models::company::{Company, CompanyStatus};
use crate::models::job::{Job, JobStatus};
use crate::models::user::{UserProfile, UserRole, UserStatus};
use crate::services::dashboard::{dashboard_stats, DashboardStats};
use crate::services::{applications, companies, jobs, require_role, users};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ActorQuery {
    pub actor_id: Uuid,
}

/// Reading admin tables is open to every back-office role.
async fn ensure_back_office(state: &AppState, actor_id: Uuid) -> Result<(), AppError> {
    require_role(&state.db, actor_id, UserRole::is_admin_like, "view admin tables").await?;
    Ok(())
}

/// GET /api/v1/admin/users
pub async fn handle_list_users(
    State(state): State<AppState>,
    Query(actor): Query<ActorQuery>,
    Query(table): Query<TableQuery>,
) -> Result<Json<Page<UserProfile>>, AppError> {
    ensure_back_office(&state, actor.actor_id).await?;
    let rows = users::list_users(&state.db).await?;
    Ok(Json(apply_table_query(rows, &table, state.config.admin_page_size)))
}

/// GET /api/v1/admin/companies
pub async fn handle_list_companies(
    State(state): State<AppState>,
    Query(actor): Query<ActorQuery>,
    Query(table): Query<TableQuery>,
) -> Result<Json<Page<Company>>, AppError> {
    ensure_back_office(&state, actor.actor_id).await?;
    let rows = companies::list_companies(&state.db, None).await?;
    Ok(Json(apply_table_query(rows, &table, state.config.admin_page_size)))
}

/// GET /api/v1/admin/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(actor): Query<ActorQuery>,
    Query(table): Query<TableQuery>,
) -> Result<Json<Page<Job>>, AppError> {
    ensure_back_office(&state, actor.actor_id).await?;
    let rows = jobs::list_all_jobs(&state.db).await?;
    Ok(Json(apply_table_query(rows, &table, state.config.admin_page_size)))
}

/// GET /api/v1/admin/applications
pub async fn handle_list_applications(
    State(state): State<AppState>,
    Query(actor): Query<ActorQuery>,
    Query(table): Query<TableQuery>,
) -> Result<Json<Page<Application>>, AppError> {
    ensure_back_office(&state, actor.actor_id).await?;
    let rows = applications::list_all_applications(&state.db).await?;
    Ok(Json(apply_table_query(rows, &table, state.config.admin_page_size)))
}

/// GET /api/v1/admin/dashboard
pub async fn handle_dashboard(
    State(state): State<AppState>,
    Query(actor): Query<ActorQuery>,
) -> Result<Json<DashboardStats>, AppError> {
    Ok(Json(dashboard_stats(&state.db, actor.actor_id).await?))
}

#[derive(Deserialize)]
pub struct Moderation<S> {
    pub actor_id: Uuid,
    pub status: S,
    pub reason: Option<String>,
}

/// PATCH /api/v1/admin/jobs/:id/status
pub async fn handle_moderate_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<Moderation<JobStatus>>,
) -> Result<Json<Job>, AppError> {
    let job = jobs::moderate_job(&state.db, req.actor_id, id, req.status, req.reason).await?;
    Ok(Json(job))
}

/// PATCH /api/v1/admin/companies/:id/status
pub async fn handle_moderate_company(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<Moderation<CompanyStatus>>,
) -> Result<Json<Company>, AppError> {
    let company =
        companies::moderate_company(&state.db, req.actor_id, id, req.status, req.reason).await?;
    Ok(Json(company))
}

/// PATCH /api/v1/admin/users/:id/status
pub async fn handle_set_user_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<Moderation<UserStatus>>,
) -> Result<Json<UserProfile>, AppError> {
    let user = users::set_user_status(&state.db, req.actor_id, id, req.status).await?;
    Ok(Json(user))
}
