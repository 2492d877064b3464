use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::db::id_batches;
use crate::errors::AppError;
use crate::filters::jobs::{filter_jobs, sort_by_posted_date, JobFilters};
use crate::models::company::CompanyStatus;
use crate::models::job::{ExperienceLevel, Job, JobRow, JobStatus, JobType, ScreeningQuestion};
use crate::models::user::UserProfile;
use crate::services::companies::{get_company, moderation_reason};
use crate::services::users::{find_user, get_user};
use crate::services::{decode_all, ensure_moderator, required_text};

const JOB_SELECT: &str = r#"
    SELECT j.*,
        (SELECT COUNT(*) FROM applications a WHERE a.job_id = j.id) AS applicant_count
    FROM jobs j
"#;

pub async fn find_job(db: &PgPool, job_id: Uuid) -> Result<Option<Job>, AppError> {
    let row = sqlx::query_as::<_, JobRow>(&format!("{JOB_SELECT} WHERE j.id = $1"))
        .bind(job_id)
        .fetch_optional(db)
        .await?;
    Ok(row.map(Job::try_from).transpose()?)
}

pub async fn get_job(db: &PgPool, job_id: Uuid) -> Result<Job, AppError> {
    find_job(db, job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))
}

/// Approved jobs, newest first.
pub async fn list_approved_jobs(db: &PgPool) -> Result<Vec<Job>, AppError> {
    let rows = sqlx::query_as::<_, JobRow>(&format!(
        "{JOB_SELECT} WHERE j.status = $1 ORDER BY j.posted_date DESC"
    ))
    .bind(JobStatus::Approved.as_str())
    .fetch_all(db)
    .await?;
    decode_all(rows)
}

pub async fn list_company_jobs(db: &PgPool, company_id: Uuid) -> Result<Vec<Job>, AppError> {
    let rows = sqlx::query_as::<_, JobRow>(&format!(
        "{JOB_SELECT} WHERE j.company_id = $1 ORDER BY j.posted_date DESC"
    ))
    .bind(company_id)
    .fetch_all(db)
    .await?;
    decode_all(rows)
}

/// A company's postings as `viewer` may see them. The public sees approved jobs only;
/// company members and moderators also see pending, rejected and suspended ones.
pub async fn list_company_jobs_for(
    db: &PgPool,
    company_id: Uuid,
    viewer: Option<Uuid>,
) -> Result<Vec<Job>, AppError> {
    let company = get_company(db, company_id).await?;
    let sees_unpublished = match viewer {
        Some(viewer_id) => find_user(db, viewer_id).await?.is_some_and(|user| {
            user.is_active() && (user.role.can_moderate() || company.is_member(user.id))
        }),
        None => false,
    };
    let jobs = list_company_jobs(db, company_id).await?;
    Ok(visible_company_jobs(jobs, sees_unpublished))
}

fn visible_company_jobs(jobs: Vec<Job>, sees_unpublished: bool) -> Vec<Job> {
    if sees_unpublished {
        return jobs;
    }
    jobs.into_iter()
        .filter(|job| job.status == JobStatus::Approved)
        .collect()
}

pub async fn list_all_jobs(db: &PgPool) -> Result<Vec<Job>, AppError> {
    let rows = sqlx::query_as::<_, JobRow>(&format!("{JOB_SELECT} ORDER BY j.posted_date DESC"))
        .fetch_all(db)
        .await?;
    decode_all(rows)
}

/// Runs `filter_jobs` over every approved job. Newest first.
pub async fn search_jobs(db: &PgPool, filters: &JobFilters) -> Result<Vec<Job>, AppError> {
    let jobs = list_approved_jobs(db).await?;
    let mut matched = filter_jobs(&jobs, filters, Utc::now())
        .into_iter()
        .cloned()
        .collect::<Vec<_>>();
    sort_by_posted_date(&mut matched);
    info!("Job search matched {} of {} approved jobs", matched.len(), jobs.len());
    Ok(matched)
}

/// Loads jobs by id in chunks of `FETCH_BATCH_SIZE`. Missing ids are skipped; order follows `ids`.
pub async fn fetch_jobs_by_ids(db: &PgPool, ids: &[Uuid]) -> Result<Vec<Job>, AppError> {
    let mut found: HashMap<Uuid, Job> = HashMap::new();
    for batch in id_batches(ids) {
        let rows = sqlx::query_as::<_, JobRow>(&format!("{JOB_SELECT} WHERE j.id = ANY($1)"))
            .bind(&batch)
            .fetch_all(db)
            .await?;
        for job in decode_all::<_, Job>(rows)? {
            found.insert(job.id, job);
        }
    }
    Ok(order_by_ids(ids, found))
}

pub(crate) fn order_by_ids<T>(ids: &[Uuid], mut found: HashMap<Uuid, T>) -> Vec<T> {
    ids.iter().filter_map(|id| found.remove(id)).collect()
}

/// Everything an employer fills in on the posting form.
#[derive(Debug, Clone, Deserialize)]
pub struct JobDraft {
    pub title: String,
    pub description: String,
    pub location: String,
    pub job_type: JobType,
    #[serde(default)]
    pub is_remote: bool,
    #[serde(default)]
    pub skills: Vec<String>,
    pub responsibilities: Option<String>,
    pub requirements: Option<String>,
    pub benefits: Option<String>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    #[serde(default = "default_pay_transparency")]
    pub pay_transparency: bool,
    pub industry: Option<String>,
    pub department: Option<String>,
    pub experience_level: Option<ExperienceLevel>,
    pub min_experience_years: Option<i32>,
    pub max_experience_years: Option<i32>,
    pub education_qualification: Option<String>,
    pub application_deadline: Option<NaiveDate>,
    #[serde(default)]
    pub screening_questions: Vec<ScreeningQuestion>,
}

fn default_pay_transparency() -> bool {
    true
}

impl JobDraft {
    /// Trims text, dedups skills and checks ranges and screening questions.
    pub fn validated(mut self) -> Result<Self, AppError> {
        self.title = required_text(&self.title, "Title")?;
        self.description = required_text(&self.description, "Description")?;
        self.location = required_text(&self.location, "Location")?;
        self.skills = crate::flows::dedup_case_insensitive(self.skills);

        for (field, value) in [("salary_min", self.salary_min), ("salary_max", self.salary_max)] {
            if value.is_some_and(|v| v < 0) {
                return Err(AppError::Validation(format!("{field} cannot be negative")));
            }
        }
        if let (Some(lo), Some(hi)) = (self.salary_min, self.salary_max) {
            if lo > hi {
                return Err(AppError::Validation(
                    "salary_min cannot exceed salary_max".to_string(),
                ));
            }
        }
        if let (Some(lo), Some(hi)) = (self.min_experience_years, self.max_experience_years) {
            if lo > hi {
                return Err(AppError::Validation(
                    "min_experience_years cannot exceed max_experience_years".to_string(),
                ));
            }
        }

        let mut seen: Vec<&str> = Vec::new();
        for q in &self.screening_questions {
            if q.id.trim().is_empty() || q.question_text.trim().is_empty() {
                return Err(AppError::Validation(
                    "Screening questions need an id and text".to_string(),
                ));
            }
            if seen.contains(&q.id.as_str()) {
                return Err(AppError::Validation(format!(
                    "Duplicate screening question id '{}'",
                    q.id
                )));
            }
            seen.push(q.id.as_str());
        }
        Ok(self)
    }
}

/// The actor must belong to a company that is allowed to post.
async fn posting_company(db: &PgPool, actor: &UserProfile) -> Result<(Uuid, String), AppError> {
    let company_id = actor
        .company_id
        .ok_or_else(|| AppError::Forbidden("Only company members can post jobs".to_string()))?;
    let company = get_company(db, company_id).await?;
    if !company.is_member(actor.id) {
        return Err(AppError::Forbidden(format!(
            "You are not a member of {}",
            company.name
        )));
    }
    if !can_post(company.status) {
        return Err(AppError::Forbidden(format!(
            "{} is {} and cannot post jobs",
            company.name, company.status
        )));
    }
    Ok((company.id, company.name))
}

/// Pending companies may post; their jobs still wait for moderation.
pub(crate) fn can_post(status: CompanyStatus) -> bool {
    matches!(status, CompanyStatus::Approved | CompanyStatus::Pending)
}

/// New postings start `pending` until a moderator approves them.
pub async fn create_job(db: &PgPool, actor_id: Uuid, draft: JobDraft) -> Result<Job, AppError> {
    let actor = get_user(db, actor_id).await?;
    let (company_id, company_name) = posting_company(db, &actor).await?;
    let draft = draft.validated()?;

    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO jobs
            (id, title, description, location, job_type, is_remote, skills,
             responsibilities, requirements, benefits, salary_min, salary_max,
             pay_transparency, industry, department, experience_level,
             min_experience_years, max_experience_years, education_qualification,
             application_deadline, status, screening_questions, posted_by_id,
             company_id, company_name)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                $16, $17, $18, $19, $20, $21, $22, $23, $24, $25)
        "#,
    )
    .bind(id)
    .bind(&draft.title)
    .bind(&draft.description)
    .bind(&draft.location)
    .bind(draft.job_type.as_str())
    .bind(draft.is_remote)
    .bind(&draft.skills)
    .bind(&draft.responsibilities)
    .bind(&draft.requirements)
    .bind(&draft.benefits)
    .bind(draft.salary_min)
    .bind(draft.salary_max)
    .bind(draft.pay_transparency)
    .bind(&draft.industry)
    .bind(&draft.department)
    .bind(draft.experience_level.map(|l| l.as_str()))
    .bind(draft.min_experience_years)
    .bind(draft.max_experience_years)
    .bind(&draft.education_qualification)
    .bind(draft.application_deadline)
    .bind(JobStatus::Pending.as_str())
    .bind(Json(&draft.screening_questions))
    .bind(actor.id)
    .bind(company_id)
    .bind(&company_name)
    .execute(db)
    .await?;

    info!("Job {id} posted by {} for company {company_id}", actor.id);
    get_job(db, id).await
}

/// Any edit sends the posting back to moderation.
pub async fn update_job(
    db: &PgPool,
    actor_id: Uuid,
    job_id: Uuid,
    draft: JobDraft,
) -> Result<Job, AppError> {
    let job = get_job(db, job_id).await?;
    let company = get_company(db, job.company_id).await?;
    if !company.is_member(actor_id) {
        return Err(AppError::Forbidden(
            "Only members of the posting company can edit this job".to_string(),
        ));
    }
    let draft = draft.validated()?;

    sqlx::query(
        r#"
        UPDATE jobs SET
            title = $2, description = $3, location = $4, job_type = $5, is_remote = $6,
            skills = $7, responsibilities = $8, requirements = $9, benefits = $10,
            salary_min = $11, salary_max = $12, pay_transparency = $13, industry = $14,
            department = $15, experience_level = $16, min_experience_years = $17,
            max_experience_years = $18, education_qualification = $19,
            application_deadline = $20, screening_questions = $21,
            status = $22, moderation_reason = NULL, updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(job_id)
    .bind(&draft.title)
    .bind(&draft.description)
    .bind(&draft.location)
    .bind(draft.job_type.as_str())
    .bind(draft.is_remote)
    .bind(&draft.skills)
    .bind(&draft.responsibilities)
    .bind(&draft.requirements)
    .bind(&draft.benefits)
    .bind(draft.salary_min)
    .bind(draft.salary_max)
    .bind(draft.pay_transparency)
    .bind(&draft.industry)
    .bind(&draft.department)
    .bind(draft.experience_level.map(|l| l.as_str()))
    .bind(draft.min_experience_years)
    .bind(draft.max_experience_years)
    .bind(&draft.education_qualification)
    .bind(draft.application_deadline)
    .bind(Json(&draft.screening_questions))
    .bind(JobStatus::Pending.as_str())
    .execute(db)
    .await?;

    info!("Job {job_id} edited by {actor_id}; back to pending");
    get_job(db, job_id).await
}

pub async fn moderate_job(
    db: &PgPool,
    actor_id: Uuid,
    job_id: Uuid,
    status: JobStatus,
    reason: Option<String>,
) -> Result<Job, AppError> {
    ensure_moderator(db, actor_id, "moderate jobs").await?;
    let reason = moderation_reason(
        matches!(status, JobStatus::Rejected | JobStatus::Suspended),
        reason,
    )?;

    let updated = sqlx::query(
        "UPDATE jobs SET status = $2, moderation_reason = $3, updated_at = now() WHERE id = $1",
    )
    .bind(job_id)
    .bind(status.as_str())
    .bind(&reason)
    .execute(db)
    .await?;
    if updated.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Job {job_id} not found")));
    }

    info!("Job {job_id} moderated to {status} by {actor_id}");
    get_job(db, job_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::fixtures::job;
    use crate::models::job::QuestionType;

    fn draft() -> JobDraft {
        JobDraft {
            title: " Backend Engineer ".to_string(),
            description: "Build APIs".to_string(),
            location: "Pune".to_string(),
            job_type: JobType::FullTime,
            is_remote: false,
            skills: vec!["Rust".to_string(), "rust".to_string()],
            responsibilities: None,
            requirements: None,
            benefits: None,
            salary_min: Some(1_000_000),
            salary_max: Some(2_000_000),
            pay_transparency: true,
            industry: None,
            department: None,
            experience_level: None,
            min_experience_years: None,
            max_experience_years: None,
            education_qualification: None,
            application_deadline: None,
            screening_questions: vec![],
        }
    }

    fn question(id: &str) -> ScreeningQuestion {
        ScreeningQuestion {
            id: id.to_string(),
            question_text: "Notice period?".to_string(),
            question_type: QuestionType::Text,
            is_required: true,
        }
    }

    #[test]
    fn test_draft_is_trimmed_and_deduped() {
        let draft = draft().validated().unwrap();
        assert_eq!(draft.title, "Backend Engineer");
        assert_eq!(draft.skills, vec!["Rust"]);
    }

    #[test]
    fn test_draft_rejects_inverted_salary() {
        let mut bad = draft();
        bad.salary_min = Some(3_000_000);
        assert!(matches!(bad.validated(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_draft_rejects_duplicate_question_ids() {
        let mut bad = draft();
        bad.screening_questions = vec![question("q1"), question("q1")];
        assert!(bad.validated().is_err());
    }

    #[test]
    fn test_pay_transparency_defaults_on() {
        let json = r#"{"title": "t", "description": "d", "location": "l", "job_type": "Contract"}"#;
        let draft: JobDraft = serde_json::from_str(json).unwrap();
        assert!(draft.pay_transparency);
        assert_eq!(draft.job_type, JobType::Contract);
    }

    fn postings() -> Vec<Job> {
        let mut rejected = job("Rejected role");
        rejected.status = JobStatus::Rejected;
        rejected.moderation_reason = Some("Salary below minimum wage".to_string());
        let mut pending = job("Pending role");
        pending.status = JobStatus::Pending;
        vec![job("Open role"), rejected, pending]
    }

    #[test]
    fn test_public_sees_only_approved_company_jobs() {
        let visible = visible_company_jobs(postings(), false);
        let titles: Vec<&str> = visible.iter().map(|j| j.title.as_str()).collect();
        assert_eq!(titles, vec!["Open role"]);
        assert!(visible.iter().all(|j| j.moderation_reason.is_none()));
    }

    #[test]
    fn test_members_see_every_company_job() {
        assert_eq!(visible_company_jobs(postings(), true).len(), 3);
    }

    #[test]
    fn test_suspended_company_cannot_post() {
        assert!(can_post(CompanyStatus::Pending));
        assert!(can_post(CompanyStatus::Approved));
        assert!(!can_post(CompanyStatus::Suspended));
        assert!(!can_post(CompanyStatus::Rejected));
    }

    #[test]
    fn test_order_by_ids_follows_request_and_skips_missing() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let found = HashMap::from([(a, "a"), (c, "c")]);
        assert_eq!(order_by_ids(&[c, b, a], found), vec!["c", "a"]);
    }
}
