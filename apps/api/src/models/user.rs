use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::filters::jobs::JobFilters;
use crate::models::{parse_opt, ModelError};

string_enum!(UserRole {
    JobSeeker => "jobSeeker",
    Employer => "employer",
    Admin => "admin",
    SuperAdmin => "superAdmin",
    Moderator => "moderator",
    SupportAgent => "supportAgent",
    DataAnalyst => "dataAnalyst",
});

impl UserRole {
    /// Any back-office role.
    pub fn is_admin_like(self) -> bool {
        !matches!(self, UserRole::JobSeeker | UserRole::Employer)
    }

    /// Roles allowed to change moderation state of jobs, companies and users.
    pub fn can_moderate(self) -> bool {
        matches!(
            self,
            UserRole::Admin | UserRole::SuperAdmin | UserRole::Moderator
        )
    }
}

string_enum!(UserStatus {
    Active => "active",
    Suspended => "suspended",
    Deleted => "deleted",
});

string_enum!(Availability {
    Immediate => "Immediate",
    TwoWeeks => "2 Weeks Notice",
    OneMonth => "1 Month Notice",
    Negotiable => "Negotiable",
});

string_enum!(JobSearchStatus {
    ActivelyLooking => "activelyLooking",
    OpenToOpportunities => "openToOpportunities",
    NotLooking => "notLooking",
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub company_name: String,
    pub job_role: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub currently_working: bool,
    pub description: Option<String>,
    pub annual_ctc: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub level: String,
    pub degree_name: String,
    pub institute_name: String,
    pub specialization: Option<String>,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    #[serde(default)]
    pub is_most_relevant: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LanguageEntry {
    pub language_name: String,
    pub proficiency: String,
    #[serde(default)]
    pub can_read: bool,
    #[serde(default)]
    pub can_write: bool,
    #[serde(default)]
    pub can_speak: bool,
}

/// A named set of job filters a job seeker can re-run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedSearch {
    pub id: Uuid,
    pub name: String,
    pub filters: JobFilters,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub headline: Option<String>,
    pub location: Option<String>,
    pub skills: Vec<String>,
    pub experiences: Vec<ExperienceEntry>,
    pub educations: Vec<EducationEntry>,
    pub languages: Vec<LanguageEntry>,
    pub total_years_experience: Option<i32>,
    pub expected_salary: Option<i64>,
    pub availability: Option<Availability>,
    pub job_search_status: Option<JobSearchStatus>,
    pub is_profile_searchable: bool,
    pub applied_job_ids: Vec<Uuid>,
    pub saved_job_ids: Vec<Uuid>,
    pub saved_searches: Vec<SavedSearch>,
    pub company_id: Option<Uuid>,
    pub is_company_admin: bool,
    pub last_active: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub status: String,
    pub headline: Option<String>,
    pub location: Option<String>,
    pub skills: Vec<String>,
    pub experiences: Json<Vec<ExperienceEntry>>,
    pub educations: Json<Vec<EducationEntry>>,
    pub languages: Json<Vec<LanguageEntry>>,
    pub total_years_experience: Option<i32>,
    pub expected_salary: Option<i64>,
    pub availability: Option<String>,
    pub job_search_status: Option<String>,
    pub is_profile_searchable: bool,
    pub applied_job_ids: Vec<Uuid>,
    pub saved_job_ids: Vec<Uuid>,
    pub saved_searches: Json<Vec<SavedSearch>>,
    pub company_id: Option<Uuid>,
    pub is_company_admin: bool,
    pub last_active: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for UserProfile {
    type Error = ModelError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(UserProfile {
            id: row.id,
            name: row.name,
            email: row.email,
            role: row.role.parse()?,
            status: row.status.parse()?,
            headline: row.headline,
            location: row.location,
            skills: row.skills,
            experiences: row.experiences.0,
            educations: row.educations.0,
            languages: row.languages.0,
            total_years_experience: row.total_years_experience,
            expected_salary: row.expected_salary,
            availability: parse_opt(row.availability)?,
            job_search_status: parse_opt(row.job_search_status)?,
            is_profile_searchable: row.is_profile_searchable,
            applied_job_ids: row.applied_job_ids,
            saved_job_ids: row.saved_job_ids,
            saved_searches: row.saved_searches.0,
            company_id: row.company_id,
            is_company_admin: row.is_company_admin,
            last_active: row.last_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serde_is_camel_case() {
        let json = serde_json::to_string(&UserRole::JobSeeker).unwrap();
        assert_eq!(json, r#""jobSeeker""#);
        let role: UserRole = serde_json::from_str(r#""superAdmin""#).unwrap();
        assert_eq!(role, UserRole::SuperAdmin);
    }

    #[test]
    fn test_admin_like_roles() {
        assert!(!UserRole::JobSeeker.is_admin_like());
        assert!(!UserRole::Employer.is_admin_like());
        assert!(UserRole::SupportAgent.is_admin_like());
        assert!(UserRole::Moderator.can_moderate());
        assert!(!UserRole::DataAnalyst.can_moderate());
    }

    #[test]
    fn test_experience_entry_defaults_missing_flags() {
        let json = r#"{
            "company_name": "Initech",
            "job_role": "Engineer",
            "start_date": "2021-04-01",
            "end_date": null,
            "description": null,
            "annual_ctc": null
        }"#;
        let entry: ExperienceEntry = serde_json::from_str(json).unwrap();
        assert!(!entry.currently_working);
        assert_eq!(entry.start_date, NaiveDate::from_ymd_opt(2021, 4, 1));
    }
}
