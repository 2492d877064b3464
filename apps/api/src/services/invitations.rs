use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::invitation::{normalize_email, InvitationRow, InvitationStatus, RecruiterInvitation};
use crate::models::user::{UserProfile, UserRole};
use crate::services::companies::get_company;
use crate::services::users::{get_user, is_plausible_email};
use crate::services::decode_all;

/// Company admins invite recruiters by email. One pending invite per email and company.
pub async fn invite_recruiter(
    db: &PgPool,
    actor_id: Uuid,
    company_id: Uuid,
    email: &str,
) -> Result<RecruiterInvitation, AppError> {
    let company = get_company(db, company_id).await?;
    if !company.is_admin(actor_id) {
        return Err(AppError::Forbidden(
            "Only company admins can invite recruiters".to_string(),
        ));
    }
    let email = normalize_email(email);
    if !is_plausible_email(&email) {
        return Err(AppError::Validation(format!("'{email}' is not a valid email")));
    }

    let row = sqlx::query_as::<_, InvitationRow>(
        r#"
        INSERT INTO invitations (id, company_id, company_name, email, invited_by, status)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (company_id, email) WHERE status = 'pending' DO NOTHING
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(company.id)
    .bind(&company.name)
    .bind(&email)
    .bind(actor_id)
    .bind(InvitationStatus::Pending.as_str())
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::Conflict(format!("{email} already has a pending invitation")))?;

    info!("Recruiter invitation for company {company_id} created by {actor_id}");
    Ok(row.try_into()?)
}

pub async fn list_pending_for_email(
    db: &PgPool,
    email: &str,
) -> Result<Vec<RecruiterInvitation>, AppError> {
    let rows = sqlx::query_as::<_, InvitationRow>(
        "SELECT * FROM invitations WHERE email = $1 AND status = $2 ORDER BY created_at DESC",
    )
    .bind(normalize_email(email))
    .bind(InvitationStatus::Pending.as_str())
    .fetch_all(db)
    .await?;
    decode_all(rows)
}

fn check_can_accept(invitation: &RecruiterInvitation, user: &UserProfile) -> Result<(), AppError> {
    if invitation.status != InvitationStatus::Pending {
        return Err(already_accepted());
    }
    if normalize_email(&user.email) != invitation.email {
        return Err(AppError::Forbidden(
            "This invitation was sent to a different email".to_string(),
        ));
    }
    if user.role.is_admin_like() || !user.is_active() {
        return Err(AppError::Forbidden(
            "This account cannot join a company".to_string(),
        ));
    }
    match user.company_id {
        Some(current) if current != invitation.company_id => Err(AppError::Conflict(
            "You already belong to another company".to_string(),
        )),
        _ => Ok(()),
    }
}

fn already_accepted() -> AppError {
    AppError::Conflict("Invitation was already accepted".to_string())
}

/// Links the user to the company as a recruiter and marks the invitation accepted.
pub async fn accept_invitation(
    db: &PgPool,
    invitation_id: Uuid,
    user_id: Uuid,
) -> Result<RecruiterInvitation, AppError> {
    let row = sqlx::query_as::<_, InvitationRow>("SELECT * FROM invitations WHERE id = $1")
        .bind(invitation_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Invitation {invitation_id} not found")))?;
    let invitation: RecruiterInvitation = row.try_into()?;
    let user = get_user(db, user_id).await?;
    check_can_accept(&invitation, &user)?;

    let mut tx = db.begin().await?;
    // Claim first: a concurrent accept finds no pending row and rolls back.
    let row = sqlx::query_as::<_, InvitationRow>(
        r#"
        UPDATE invitations SET status = $2, accepted_at = now()
        WHERE id = $1 AND status = $3
        RETURNING *
        "#,
    )
    .bind(invitation_id)
    .bind(InvitationStatus::Accepted.as_str())
    .bind(InvitationStatus::Pending.as_str())
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(already_accepted)?;
    sqlx::query(
        "UPDATE users SET role = $2, company_id = $3, updated_at = now() WHERE id = $1",
    )
    .bind(user.id)
    .bind(UserRole::Employer.as_str())
    .bind(invitation.company_id)
    .execute(&mut *tx)
    .await?;
    sqlx::query(
        r#"
        UPDATE companies SET
            recruiter_uids = CASE WHEN $2 = ANY(recruiter_uids) THEN recruiter_uids
                                  ELSE array_append(recruiter_uids, $2) END,
            updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(invitation.company_id)
    .bind(user.id)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    info!("User {user_id} joined company {} as recruiter", invitation.company_id);
    Ok(row.try_into()?)
}
