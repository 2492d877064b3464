use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::{Application, ApplicationRow, ApplicationStatus, ScreeningAnswer};
use crate::models::job::Job;
use crate::models::user::{UserProfile, UserRole};
use crate::services::companies::get_company;
use crate::services::jobs::get_job;
use crate::services::users::get_user;
use crate::services::decode_all;

pub async fn get_application(db: &PgPool, application_id: Uuid) -> Result<Application, AppError> {
    let row = sqlx::query_as::<_, ApplicationRow>("SELECT * FROM applications WHERE id = $1")
        .bind(application_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Application {application_id} not found")))?;
    Ok(row.try_into()?)
}

pub async fn list_for_applicant(db: &PgPool, applicant_id: Uuid) -> Result<Vec<Application>, AppError> {
    let rows = sqlx::query_as::<_, ApplicationRow>(
        "SELECT * FROM applications WHERE applicant_id = $1 ORDER BY applied_at DESC",
    )
    .bind(applicant_id)
    .fetch_all(db)
    .await?;
    decode_all(rows)
}

/// Applicants for a job, visible to the posting company and to moderators.
pub async fn list_for_job(
    db: &PgPool,
    actor_id: Uuid,
    job_id: Uuid,
) -> Result<Vec<Application>, AppError> {
    let job = get_job(db, job_id).await?;
    ensure_can_review(db, actor_id, &job).await?;
    let rows = sqlx::query_as::<_, ApplicationRow>(
        "SELECT * FROM applications WHERE job_id = $1 ORDER BY applied_at DESC",
    )
    .bind(job_id)
    .fetch_all(db)
    .await?;
    decode_all(rows)
}

pub async fn list_all_applications(db: &PgPool) -> Result<Vec<Application>, AppError> {
    let rows = sqlx::query_as::<_, ApplicationRow>("SELECT * FROM applications ORDER BY applied_at DESC")
        .fetch_all(db)
        .await?;
    decode_all(rows)
}

#[derive(Debug, Deserialize)]
pub struct AnswerInput {
    pub question_id: String,
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct NewApplication {
    pub applicant_id: Uuid,
    #[serde(default)]
    pub answers: Vec<AnswerInput>,
}

/// Checks the applicant may apply to `job` on `today`.
fn check_can_apply(job: &Job, applicant: &UserProfile, today: NaiveDate) -> Result<(), AppError> {
    if applicant.role != UserRole::JobSeeker || !applicant.is_active() {
        return Err(AppError::Forbidden(
            "Only active job seekers can apply to jobs".to_string(),
        ));
    }
    if !job.is_open_for_applications(today) {
        return Err(AppError::Validation(format!(
            "{} is not accepting applications",
            job.title
        )));
    }
    if applicant.applied_job_ids.contains(&job.id) {
        return Err(AppError::Conflict(format!(
            "You have already applied to {}",
            job.title
        )));
    }
    Ok(())
}

/// Matches answers to the job's questions, copying the question text.
/// Required questions need a non-blank answer; answers to unknown questions are rejected.
fn resolve_answers(job: &Job, answers: Vec<AnswerInput>) -> Result<Vec<ScreeningAnswer>, AppError> {
    let mut resolved = Vec::with_capacity(answers.len());
    for input in answers {
        let question = job
            .screening_questions
            .iter()
            .find(|q| q.id == input.question_id)
            .ok_or_else(|| {
                AppError::Validation(format!("Unknown screening question '{}'", input.question_id))
            })?;
        let answer = input.answer.trim().to_string();
        if answer.is_empty() || resolved.iter().any(|a: &ScreeningAnswer| a.question_id == question.id) {
            continue;
        }
        resolved.push(ScreeningAnswer {
            question_id: question.id.clone(),
            question_text: question.question_text.clone(),
            answer,
        });
    }

    for required in job.required_question_ids() {
        if !resolved.iter().any(|a| a.question_id == required) {
            return Err(AppError::Validation(format!(
                "Screening question '{required}' requires an answer"
            )));
        }
    }
    Ok(resolved)
}

/// Creates the application and records the job on the applicant's profile.
pub async fn apply(db: &PgPool, job_id: Uuid, input: NewApplication) -> Result<Application, AppError> {
    let job = get_job(db, job_id).await?;
    let applicant = get_user(db, input.applicant_id).await?;
    check_can_apply(&job, &applicant, Utc::now().date_naive())?;
    let answers = resolve_answers(&job, input.answers)?;

    let mut tx = db.begin().await?;
    let row = sqlx::query_as::<_, ApplicationRow>(
        r#"
        INSERT INTO applications
            (id, job_id, job_title, company_id, company_name, applicant_id,
             applicant_name, applicant_headline, status, answers)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ON CONFLICT (job_id, applicant_id) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(job.id)
    .bind(&job.title)
    .bind(job.company_id)
    .bind(&job.company_name)
    .bind(applicant.id)
    .bind(&applicant.name)
    .bind(&applicant.headline)
    .bind(ApplicationStatus::Applied.as_str())
    .bind(Json(&answers))
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::Conflict(format!("You have already applied to {}", job.title)))?;

    sqlx::query(
        r#"
        UPDATE users SET
            applied_job_ids = array_append(applied_job_ids, $2),
            last_active = now(), updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(applicant.id)
    .bind(job.id)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    info!("User {} applied to job {}", applicant.id, job.id);
    Ok(row.try_into()?)
}

/// Whether `next` may replace `current` for the given party.
fn check_transition(
    current: ApplicationStatus,
    next: ApplicationStatus,
    by_applicant: bool,
) -> Result<(), AppError> {
    if current.is_terminal() {
        return Err(AppError::Validation(format!(
            "Application is already {current}"
        )));
    }
    match (by_applicant, next) {
        (true, ApplicationStatus::WithdrawnByApplicant) => Ok(()),
        (true, _) => Err(AppError::Forbidden(
            "Applicants can only withdraw their application".to_string(),
        )),
        (false, ApplicationStatus::WithdrawnByApplicant) => Err(AppError::Validation(
            "Only the applicant can withdraw an application".to_string(),
        )),
        (false, _) => Ok(()),
    }
}

pub async fn withdraw(
    db: &PgPool,
    actor_id: Uuid,
    application_id: Uuid,
) -> Result<Application, AppError> {
    let application = get_application(db, application_id).await?;
    if application.applicant_id != actor_id {
        return Err(AppError::Forbidden(
            "Only the applicant can withdraw this application".to_string(),
        ));
    }
    check_transition(application.status, ApplicationStatus::WithdrawnByApplicant, true)?;
    let updated = store_status(
        db,
        application_id,
        application.status,
        ApplicationStatus::WithdrawnByApplicant,
        None,
    )
    .await?;
    info!("Application {application_id} withdrawn");
    Ok(updated)
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub actor_id: Uuid,
    pub status: ApplicationStatus,
    pub employer_notes: Option<String>,
}

pub async fn update_status(
    db: &PgPool,
    application_id: Uuid,
    update: StatusUpdate,
) -> Result<Application, AppError> {
    let application = get_application(db, application_id).await?;
    let job = get_job(db, application.job_id).await?;
    ensure_can_review(db, update.actor_id, &job).await?;
    check_transition(application.status, update.status, false)?;

    let notes = update
        .employer_notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());
    let updated = store_status(db, application_id, application.status, update.status, notes).await?;
    info!(
        "Application {application_id} moved to {} by {}",
        update.status, update.actor_id
    );
    Ok(updated)
}

/// Writes `next` only if the row still holds `current`, the status the transition was checked against.
async fn store_status(
    db: &PgPool,
    application_id: Uuid,
    current: ApplicationStatus,
    next: ApplicationStatus,
    notes: Option<String>,
) -> Result<Application, AppError> {
    let row = sqlx::query_as::<_, ApplicationRow>(
        r#"
        UPDATE applications SET
            status = $2, employer_notes = COALESCE($3, employer_notes), updated_at = now()
        WHERE id = $1 AND status = $4
        RETURNING *
        "#,
    )
    .bind(application_id)
    .bind(next.as_str())
    .bind(notes)
    .bind(current.as_str())
    .fetch_optional(db)
    .await?;
    Ok(unchanged_since_check(row, current)?.try_into()?)
}

fn unchanged_since_check<T>(row: Option<T>, current: ApplicationStatus) -> Result<T, AppError> {
    row.ok_or_else(|| {
        AppError::Conflict(format!(
            "Application is no longer {current}, reload and try again"
        ))
    })
}

/// Members of the posting company and moderators may review applicants.
async fn ensure_can_review(db: &PgPool, actor_id: Uuid, job: &Job) -> Result<(), AppError> {
    let actor = get_user(db, actor_id).await?;
    if actor.is_active() && actor.role.can_moderate() {
        return Ok(());
    }
    let company = get_company(db, job.company_id).await?;
    if actor.is_active() && company.is_member(actor.id) {
        return Ok(());
    }
    Err(AppError::Forbidden(format!(
        "You cannot review applications for {}",
        job.title
    )))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::models::job::fixtures::job;
    use crate::models::job::{JobStatus, QuestionType, ScreeningQuestion};
    use crate::models::user::fixtures::job_seeker;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn job_with_questions() -> Job {
        let mut posting = job("Data Engineer");
        posting.screening_questions = vec![
            ScreeningQuestion {
                id: "notice".to_string(),
                question_text: "Notice period?".to_string(),
                question_type: QuestionType::Text,
                is_required: true,
            },
            ScreeningQuestion {
                id: "relocate".to_string(),
                question_text: "Willing to relocate?".to_string(),
                question_type: QuestionType::YesNo,
                is_required: false,
            },
        ];
        posting
    }

    fn answer(question_id: &str, answer: &str) -> AnswerInput {
        AnswerInput {
            question_id: question_id.to_string(),
            answer: answer.to_string(),
        }
    }

    #[test]
    fn test_duplicate_application_conflicts() {
        let posting = job("Data Engineer");
        let mut seeker = job_seeker("Ann");
        seeker.applied_job_ids.push(posting.id);
        assert!(matches!(
            check_can_apply(&posting, &seeker, today()),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn test_cannot_apply_to_pending_job() {
        let mut posting = job("Data Engineer");
        posting.status = JobStatus::Pending;
        let seeker = job_seeker("Ann");
        assert!(matches!(
            check_can_apply(&posting, &seeker, today()),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_employers_cannot_apply() {
        let posting = job("Data Engineer");
        let mut employer = job_seeker("Eve");
        employer.role = UserRole::Employer;
        assert!(matches!(
            check_can_apply(&posting, &employer, today()),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_missing_required_answer_rejected() {
        let posting = job_with_questions();
        let result = resolve_answers(&posting, vec![answer("relocate", "yes"), answer("notice", "  ")]);
        assert!(matches!(result, Err(AppError::Validation(msg)) if msg.contains("notice")));
    }

    #[test]
    fn test_answers_carry_question_text() {
        let posting = job_with_questions();
        let resolved = resolve_answers(&posting, vec![answer("notice", " 30 days ")]).unwrap();
        assert_eq!(
            resolved,
            vec![ScreeningAnswer {
                question_id: "notice".to_string(),
                question_text: "Notice period?".to_string(),
                answer: "30 days".to_string(),
            }]
        );
    }

    #[test]
    fn test_unknown_question_rejected() {
        let posting = job_with_questions();
        assert!(resolve_answers(&posting, vec![answer("salary", "lots")]).is_err());
    }

    #[test]
    fn test_withdraw_only_from_open_status() {
        assert!(check_transition(
            ApplicationStatus::Interviewing,
            ApplicationStatus::WithdrawnByApplicant,
            true
        )
        .is_ok());
        assert!(check_transition(
            ApplicationStatus::Hired,
            ApplicationStatus::WithdrawnByApplicant,
            true
        )
        .is_err());
    }

    #[test]
    fn test_employer_cannot_set_withdrawn() {
        let result = check_transition(
            ApplicationStatus::Applied,
            ApplicationStatus::WithdrawnByApplicant,
            false,
        );
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(check_transition(ApplicationStatus::Applied, ApplicationStatus::OfferMade, false).is_ok());
    }

    #[test]
    fn test_applicant_cannot_advance_own_application() {
        let result = check_transition(ApplicationStatus::Applied, ApplicationStatus::Hired, true);
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[test]
    fn test_status_moved_after_check_is_conflict() {
        // withdraw checked against Interviewing, but a concurrent Hired won the race
        let result = unchanged_since_check(None::<()>, ApplicationStatus::Interviewing);
        match result {
            Err(AppError::Conflict(message)) => assert!(message.contains("Interviewing")),
            other => panic!("expected conflict, got {other:?}"),
        }
        assert_eq!(unchanged_since_check(Some(7), ApplicationStatus::Applied).unwrap(), 7);
    }
}
