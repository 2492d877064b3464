use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::ModelError;

string_enum!(
    /// Lifecycle of an application. Set directly by employers, admins, or the applicant (withdrawal).
    ApplicationStatus {
        Applied => "Applied",
        Reviewed => "Reviewed",
        Interviewing => "Interviewing",
        OfferMade => "Offer Made",
        Hired => "Hired",
        RejectedByCompany => "Rejected By Company",
        WithdrawnByApplicant => "Withdrawn by Applicant",
    }
);

impl ApplicationStatus {
    /// No further status changes are accepted once here.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ApplicationStatus::Hired
                | ApplicationStatus::RejectedByCompany
                | ApplicationStatus::WithdrawnByApplicant
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningAnswer {
    pub question_id: String,
    pub question_text: String,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub id: Uuid,
    pub job_id: Uuid,
    pub job_title: String,
    pub company_id: Uuid,
    pub company_name: String,
    pub applicant_id: Uuid,
    pub applicant_name: String,
    pub applicant_headline: Option<String>,
    pub status: ApplicationStatus,
    pub answers: Vec<ScreeningAnswer>,
    pub employer_notes: Option<String>,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ApplicationRow {
    pub id: Uuid,
    pub job_id: Uuid,
    pub job_title: String,
    pub company_id: Uuid,
    pub company_name: String,
    pub applicant_id: Uuid,
    pub applicant_name: String,
    pub applicant_headline: Option<String>,
    pub status: String,
    pub answers: Json<Vec<ScreeningAnswer>>,
    pub employer_notes: Option<String>,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ApplicationRow> for Application {
    type Error = ModelError;

    fn try_from(row: ApplicationRow) -> Result<Self, Self::Error> {
        Ok(Application {
            id: row.id,
            job_id: row.job_id,
            job_title: row.job_title,
            company_id: row.company_id,
            company_name: row.company_name,
            applicant_id: row.applicant_id,
            applicant_name: row.applicant_name,
            applicant_headline: row.applicant_headline,
            status: row.status.parse()?,
            answers: row.answers.0,
            employer_notes: row.employer_notes,
            applied_at: row.applied_at,
            updated_at: row.updated_at,
        })
    }
}
