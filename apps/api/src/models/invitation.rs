use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::ModelError;

string_enum!(InvitationStatus {
    Pending => "pending",
    Accepted => "accepted",
});

/// Invitation for an email address to join a company as a recruiter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecruiterInvitation {
    pub id: Uuid,
    pub company_id: Uuid,
    pub company_name: String,
    pub email: String,
    pub invited_by: Uuid,
    pub status: InvitationStatus,
    pub created_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, FromRow)]
pub struct InvitationRow {
    pub id: Uuid,
    pub company_id: Uuid,
    pub company_name: String,
    pub email: String,
    pub invited_by: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
}

impl TryFrom<InvitationRow> for RecruiterInvitation {
    type Error = ModelError;

    fn try_from(row: InvitationRow) -> Result<Self, Self::Error> {
        Ok(RecruiterInvitation {
            id: row.id,
            company_id: row.company_id,
            company_name: row.company_name,
            email: row.email,
            invited_by: row.invited_by,
            status: row.status.parse()?,
            created_at: row.created_at,
            accepted_at: row.accepted_at,
        })
    }
}

/// Emails are compared case-insensitively and without surrounding whitespace.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Jane.Doe@Example.COM "), "jane.doe@example.com");
    }
}
