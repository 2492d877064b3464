use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::flows::document::to_data_uri;
use crate::flows::job_description::{
    parse_job_description, ParseJobDescriptionInput, ParsedJobDescription,
};
use crate::flows::matching::{
    match_candidates, match_jobs, CandidateMatchInput, CandidateMatchOutput, JobMatchInput,
    JobMatchOutput,
};
use crate::flows::profile_text::{candidate_for_matching, describe_job, describe_profile, job_for_matching};
use crate::flows::resume::{parse_resume, ParseResumeInput, ParsedResume};
use crate::flows::summary::{generate_profile_summary, ProfileSummaryInput, ProfileSummaryOutput};
use crate::models::job::Job;
use crate::models::user::UserProfile;
use crate::services::{companies, jobs, users};
use crate::state::AppState;

/// Newest approved jobs / most recently active candidates sent to the matcher.
const MAX_MATCH_POOL: usize = 50;

/// POST /api/v1/flows/parse-resume
pub async fn handle_parse_resume(
    State(state): State<AppState>,
    Json(req): Json<ParseResumeInput>,
) -> Json<ParsedResume> {
    Json(parse_resume(state.llm.as_ref(), &req).await)
}

/// POST /api/v1/flows/parse-resume/upload
/// Multipart form with a `file` field; the part's content type becomes the data URI's MIME type.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ParsedResume>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid upload: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Invalid upload: {e}")))?;
        info!("Resume upload received ({mime_type}, {} bytes)", bytes.len());

        let input = ParseResumeInput {
            resume_data_uri: to_data_uri(&mime_type, &bytes),
        };
        return Ok(Json(parse_resume(state.llm.as_ref(), &input).await));
    }
    Err(AppError::Validation("Upload is missing a 'file' field".to_string()))
}

/// POST /api/v1/flows/parse-job-description
pub async fn handle_parse_job_description(
    State(state): State<AppState>,
    Json(req): Json<ParseJobDescriptionInput>,
) -> Json<ParsedJobDescription> {
    Json(parse_job_description(state.llm.as_ref(), &req).await)
}

#[derive(Deserialize)]
pub struct MatchJobsRequest {
    pub user_id: Uuid,
}

#[derive(Serialize)]
pub struct MatchJobsResponse {
    #[serde(flatten)]
    pub output: JobMatchOutput,
    /// The matched jobs, in the model's order.
    pub jobs: Vec<Job>,
}

/// POST /api/v1/flows/match-jobs
pub async fn handle_match_jobs(
    State(state): State<AppState>,
    Json(req): Json<MatchJobsRequest>,
) -> Result<Json<MatchJobsResponse>, AppError> {
    let profile = users::get_user(&state.db, req.user_id).await?;
    let mut pool = jobs::list_approved_jobs(&state.db).await?;
    pool.retain(|job| !profile.applied_job_ids.contains(&job.id));
    pool.truncate(MAX_MATCH_POOL);

    let input = JobMatchInput {
        job_seeker_profile: describe_profile(&profile),
        available_jobs: pool.iter().map(job_for_matching).collect(),
    };
    let output = match_jobs(state.llm.as_ref(), &input).await;
    let jobs = pick_in_order(pool, &output.relevant_job_ids, |job| job.id);
    Ok(Json(MatchJobsResponse { output, jobs }))
}

#[derive(Deserialize)]
pub struct MatchCandidatesRequest {
    pub actor_id: Uuid,
    pub job_id: Uuid,
}

#[derive(Serialize)]
pub struct MatchCandidatesResponse {
    #[serde(flatten)]
    pub output: CandidateMatchOutput,
    pub candidates: Vec<UserProfile>,
}

/// POST /api/v1/flows/match-candidates
pub async fn handle_match_candidates(
    State(state): State<AppState>,
    Json(req): Json<MatchCandidatesRequest>,
) -> Result<Json<MatchCandidatesResponse>, AppError> {
    let job = jobs::get_job(&state.db, req.job_id).await?;
    let company = companies::get_company(&state.db, job.company_id).await?;
    if !company.is_member(req.actor_id) {
        return Err(AppError::Forbidden(format!(
            "Only members of {} can match candidates for this job",
            company.name
        )));
    }

    let mut pool = users::list_searchable_candidates(&state.db).await?;
    pool.truncate(MAX_MATCH_POOL);

    let input = CandidateMatchInput {
        job_description: describe_job(&job),
        candidate_profiles: pool.iter().map(candidate_for_matching).collect(),
    };
    let output = match_candidates(state.llm.as_ref(), &input).await;
    let candidates = pick_in_order(pool, &output.relevant_candidate_ids, |c| c.id);
    Ok(Json(MatchCandidatesResponse { output, candidates }))
}

#[derive(Deserialize)]
pub struct ProfileSummaryRequest {
    pub user_id: Uuid,
    pub target_role: Option<String>,
}

/// POST /api/v1/flows/profile-summary
pub async fn handle_profile_summary(
    State(state): State<AppState>,
    Json(req): Json<ProfileSummaryRequest>,
) -> Result<Json<ProfileSummaryOutput>, AppError> {
    let profile = users::get_user(&state.db, req.user_id).await?;
    let input = ProfileSummaryInput {
        profile_details: describe_profile(&profile),
        target_role: req.target_role,
    };
    Ok(Json(generate_profile_summary(state.llm.as_ref(), &input).await))
}

/// Moves the items named by `ids` out of `pool`, in `ids` order.
fn pick_in_order<T>(pool: Vec<T>, ids: &[String], id_of: impl Fn(&T) -> Uuid) -> Vec<T> {
    let mut pool: Vec<Option<T>> = pool.into_iter().map(Some).collect();
    ids.iter()
        .filter_map(|raw| Uuid::parse_str(raw).ok())
        .filter_map(|id| {
            pool.iter_mut()
                .find(|slot| slot.as_ref().is_some_and(|item| id_of(item) == id))
                .and_then(Option::take)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_in_order() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let pool = vec![a, b, c];
        let ids = vec![c.to_string(), "garbage".to_string(), a.to_string(), c.to_string()];
        assert_eq!(pick_in_order(pool, &ids, |id| *id), vec![c, a]);
    }
}
