use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::ModelError;

string_enum!(CompanyStatus {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
    Suspended => "suspended",
    Deleted => "deleted",
});

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub website_url: Option<String>,
    pub logo_url: Option<String>,
    pub location: Option<String>,
    pub admin_uids: Vec<Uuid>,
    pub recruiter_uids: Vec<Uuid>,
    pub status: CompanyStatus,
    pub moderation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Read-time aggregates, not stored.
    pub job_count: i64,
    pub application_count: i64,
}

impl Company {
    pub fn is_admin(&self, user_id: Uuid) -> bool {
        self.admin_uids.contains(&user_id)
    }

    /// Admins and recruiters may post jobs and review applications.
    pub fn is_member(&self, user_id: Uuid) -> bool {
        self.is_admin(user_id) || self.recruiter_uids.contains(&user_id)
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct CompanyRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub website_url: Option<String>,
    pub logo_url: Option<String>,
    pub location: Option<String>,
    pub admin_uids: Vec<Uuid>,
    pub recruiter_uids: Vec<Uuid>,
    pub status: String,
    pub moderation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub job_count: i64,
    pub application_count: i64,
}

impl TryFrom<CompanyRow> for Company {
    type Error = ModelError;

    fn try_from(row: CompanyRow) -> Result<Self, Self::Error> {
        Ok(Company {
            id: row.id,
            name: row.name,
            description: row.description,
            website_url: row.website_url,
            logo_url: row.logo_url,
            location: row.location,
            admin_uids: row.admin_uids,
            recruiter_uids: row.recruiter_uids,
            status: row.status.parse()?,
            moderation_reason: row.moderation_reason,
            created_at: row.created_at,
            updated_at: row.updated_at,
            job_count: row.job_count,
            application_count: row.application_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn company(admin: Uuid, recruiter: Uuid) -> Company {
        let now = Utc::now();
        Company {
            id: Uuid::new_v4(),
            name: "Acme".to_string(),
            description: None,
            website_url: None,
            logo_url: None,
            location: None,
            admin_uids: vec![admin],
            recruiter_uids: vec![recruiter],
            status: CompanyStatus::Approved,
            moderation_reason: None,
            created_at: now,
            updated_at: now,
            job_count: 0,
            application_count: 0,
        }
    }

    #[test]
    fn test_recruiter_is_member_not_admin() {
        let admin = Uuid::new_v4();
        let recruiter = Uuid::new_v4();
        let acme = company(admin, recruiter);
        assert!(acme.is_admin(admin));
        assert!(acme.is_member(recruiter));
        assert!(!acme.is_admin(recruiter));
        assert!(!acme.is_member(Uuid::new_v4()));
    }
}
