use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::ModelError;

string_enum!(LegalDocumentKind {
    PrivacyPolicy => "privacyPolicy",
    TermsOfService => "termsOfService",
});

/// Admin-edited static content, stored as markdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegalDocument {
    pub id: LegalDocumentKind,
    pub content: String,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct LegalDocumentRow {
    pub id: String,
    pub content: String,
    pub last_updated: DateTime<Utc>,
}

impl TryFrom<LegalDocumentRow> for LegalDocument {
    type Error = ModelError;

    fn try_from(row: LegalDocumentRow) -> Result<Self, Self::Error> {
        Ok(LegalDocument {
            id: row.id.parse()?,
            content: row.content,
            last_updated: row.last_updated,
        })
    }
}
