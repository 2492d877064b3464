use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::{parse_opt, ModelError};

string_enum!(
    /// Moderation state of a posting. Only `Approved` jobs are visible to job seekers.
    JobStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
        Suspended => "suspended",
    }
);

string_enum!(JobType {
    FullTime => "Full-time",
    PartTime => "Part-time",
    Contract => "Contract",
    Internship => "Internship",
});

string_enum!(ExperienceLevel {
    EntryLevel => "Entry-Level",
    MidLevel => "Mid-Level",
    SeniorLevel => "Senior-Level",
    Lead => "Lead",
    Manager => "Manager",
    Executive => "Executive",
});

string_enum!(QuestionType {
    Text => "text",
    YesNo => "yesNo",
});

/// Employer-defined question answered by the applicant when applying.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningQuestion {
    pub id: String,
    pub question_text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(default)]
    pub is_required: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    pub job_type: JobType,
    pub is_remote: bool,
    pub skills: Vec<String>,
    pub responsibilities: Option<String>,
    pub requirements: Option<String>,
    pub benefits: Option<String>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub pay_transparency: bool,
    pub industry: Option<String>,
    pub department: Option<String>,
    pub experience_level: Option<ExperienceLevel>,
    pub min_experience_years: Option<i32>,
    pub max_experience_years: Option<i32>,
    pub education_qualification: Option<String>,
    pub application_deadline: Option<NaiveDate>,
    pub status: JobStatus,
    pub moderation_reason: Option<String>,
    pub screening_questions: Vec<ScreeningQuestion>,
    pub posted_by_id: Uuid,
    pub company_id: Uuid,
    pub company_name: String,
    pub posted_date: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Derived at read time from the applications table.
    pub applicant_count: i64,
}

impl Job {
    /// Screening questions the applicant must answer.
    pub fn required_question_ids(&self) -> impl Iterator<Item = &str> {
        self.screening_questions
            .iter()
            .filter(|q| q.is_required)
            .map(|q| q.id.as_str())
    }

    pub fn is_open_for_applications(&self, today: NaiveDate) -> bool {
        self.status == JobStatus::Approved
            && self.application_deadline.map_or(true, |d| d >= today)
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    pub job_type: String,
    pub is_remote: bool,
    pub skills: Vec<String>,
    pub responsibilities: Option<String>,
    pub requirements: Option<String>,
    pub benefits: Option<String>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub pay_transparency: bool,
    pub industry: Option<String>,
    pub department: Option<String>,
    pub experience_level: Option<String>,
    pub min_experience_years: Option<i32>,
    pub max_experience_years: Option<i32>,
    pub education_qualification: Option<String>,
    pub application_deadline: Option<NaiveDate>,
    pub status: String,
    pub moderation_reason: Option<String>,
    pub screening_questions: Json<Vec<ScreeningQuestion>>,
    pub posted_by_id: Uuid,
    pub company_id: Uuid,
    pub company_name: String,
    pub posted_date: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub applicant_count: i64,
}

impl TryFrom<JobRow> for Job {
    type Error = ModelError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        Ok(Job {
            id: row.id,
            title: row.title,
            description: row.description,
            location: row.location,
            job_type: row.job_type.parse()?,
            is_remote: row.is_remote,
            skills: row.skills,
            responsibilities: row.responsibilities,
            requirements: row.requirements,
            benefits: row.benefits,
            salary_min: row.salary_min,
            salary_max: row.salary_max,
            pay_transparency: row.pay_transparency,
            industry: row.industry,
            department: row.department,
            experience_level: parse_opt(row.experience_level)?,
            min_experience_years: row.min_experience_years,
            max_experience_years: row.max_experience_years,
            education_qualification: row.education_qualification,
            application_deadline: row.application_deadline,
            status: row.status.parse()?,
            moderation_reason: row.moderation_reason,
            screening_questions: row.screening_questions.0,
            posted_by_id: row.posted_by_id,
            company_id: row.company_id,
            company_name: row.company_name,
            posted_date: row.posted_date,
            updated_at: row.updated_at,
            applicant_count: row.applicant_count,
        })
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// An approved, remote-less full-time posting. Tests override what they need.
    pub fn job(title: &str) -> Job {
        let posted = DateTime::parse_from_rfc3339("2026-10-01T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        Job {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: String::new(),
            location: "Bengaluru".to_string(),
            job_type: JobType::FullTime,
            is_remote: false,
            skills: vec![],
            responsibilities: None,
            requirements: None,
            benefits: None,
            salary_min: None,
            salary_max: None,
            pay_transparency: false,
            industry: None,
            department: None,
            experience_level: None,
            min_experience_years: None,
            max_experience_years: None,
            education_qualification: None,
            application_deadline: None,
            status: JobStatus::Approved,
            moderation_reason: None,
            screening_questions: vec![],
            posted_by_id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            company_name: "Acme".to_string(),
            posted_date: posted,
            updated_at: posted,
            applicant_count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::job;
    use super::*;

    #[test]
    fn test_job_type_serde_uses_display_spelling() {
        let json = serde_json::to_string(&JobType::FullTime).unwrap();
        assert_eq!(json, r#""Full-time""#);
        let parsed: JobType = serde_json::from_str(r#""Internship""#).unwrap();
        assert_eq!(parsed, JobType::Internship);
    }

    #[test]
    fn test_screening_question_type_field_renamed() {
        let json = r#"{"id": "q1", "question_text": "Can you relocate?", "type": "yesNo", "is_required": true}"#;
        let question: ScreeningQuestion = serde_json::from_str(json).unwrap();
        assert_eq!(question.question_type, QuestionType::YesNo);
        assert!(question.is_required);
    }

    #[test]
    fn test_required_question_ids_skips_optional() {
        let mut posting = job("Backend Engineer");
        posting.screening_questions = vec![
            ScreeningQuestion {
                id: "q1".to_string(),
                question_text: "Notice period?".to_string(),
                question_type: QuestionType::Text,
                is_required: true,
            },
            ScreeningQuestion {
                id: "q2".to_string(),
                question_text: "Anything else?".to_string(),
                question_type: QuestionType::Text,
                is_required: false,
            },
        ];
        let ids: Vec<&str> = posting.required_question_ids().collect();
        assert_eq!(ids, vec!["q1"]);
    }

    #[test]
    fn test_deadline_in_past_closes_applications() {
        let mut posting = job("Backend Engineer");
        posting.application_deadline = NaiveDate::from_ymd_opt(2026, 9, 30);
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        assert!(!posting.is_open_for_applications(today));

        posting.application_deadline = NaiveDate::from_ymd_opt(2026, 10, 16);
        assert!(posting.is_open_for_applications(today));
    }

    #[test]
    fn test_pending_job_not_open() {
        let mut posting = job("Backend Engineer");
        posting.status = JobStatus::Pending;
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        assert!(!posting.is_open_for_applications(today));
    }
}
