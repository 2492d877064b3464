use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::legal::{LegalDocument, LegalDocumentKind, LegalDocumentRow};
use crate::models::user::UserRole;
use crate::services::require_role;

pub async fn get_legal_document(
    db: &PgPool,
    kind: LegalDocumentKind,
) -> Result<LegalDocument, AppError> {
    let row = sqlx::query_as::<_, LegalDocumentRow>("SELECT * FROM legal_content WHERE id = $1")
        .bind(kind.as_str())
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No {kind} has been published")))?;
    Ok(row.try_into()?)
}

fn can_edit_legal(role: UserRole) -> bool {
    matches!(role, UserRole::Admin | UserRole::SuperAdmin)
}

pub async fn upsert_legal_document(
    db: &PgPool,
    actor_id: Uuid,
    kind: LegalDocumentKind,
    content: &str,
) -> Result<LegalDocument, AppError> {
    require_role(db, actor_id, can_edit_legal, "edit legal documents").await?;
    if content.trim().is_empty() {
        return Err(AppError::Validation(format!("{kind} content cannot be empty")));
    }

    let row = sqlx::query_as::<_, LegalDocumentRow>(
        r#"
        INSERT INTO legal_content (id, content, last_updated)
        VALUES ($1, $2, now())
        ON CONFLICT (id) DO UPDATE SET content = EXCLUDED.content, last_updated = now()
        RETURNING *
        "#,
    )
    .bind(kind.as_str())
    .bind(content)
    .fetch_one(db)
    .await?;

    info!("{kind} updated by {actor_id}");
    Ok(row.try_into()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_admins_edit_legal() {
        assert!(can_edit_legal(UserRole::Admin));
        assert!(can_edit_legal(UserRole::SuperAdmin));
        assert!(!can_edit_legal(UserRole::Moderator));
        assert!(!can_edit_legal(UserRole::Employer));
    }
}
