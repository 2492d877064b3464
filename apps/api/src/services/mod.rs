//! Persistence and business rules for each collection.
//!
//! Services take the pool plus an `actor_id` for anything that needs a role.
//! Authentication is handled upstream; the actor id is trusted as given, and
//! only its role and company membership are checked here.

pub mod applications;
pub mod companies;
pub mod dashboard;
pub mod invitations;
pub mod jobs;
pub mod legal;
pub mod users;

use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::{UserProfile, UserRole};
use crate::models::ModelError;

/// Decodes sqlx rows into domain types, failing on the first unknown enum spelling.
pub(crate) fn decode_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, AppError>
where
    T: TryFrom<R, Error = ModelError>,
{
    rows.into_iter()
        .map(T::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(AppError::from)
}

/// Loads the acting user and checks that they are active and their role passes `allowed`.
pub async fn require_role(
    db: &PgPool,
    actor_id: Uuid,
    allowed: impl Fn(UserRole) -> bool,
    action: &str,
) -> Result<UserProfile, AppError> {
    let actor = users::find_user(db, actor_id)
        .await?
        .ok_or_else(|| AppError::Forbidden(format!("Unknown actor {actor_id}")))?;
    check_actor(&actor, &allowed, action)?;
    Ok(actor)
}

/// Admins, super admins and moderators.
pub async fn ensure_moderator(db: &PgPool, actor_id: Uuid, action: &str) -> Result<UserProfile, AppError> {
    require_role(db, actor_id, UserRole::can_moderate, action).await
}

pub(crate) fn check_actor(
    actor: &UserProfile,
    allowed: &impl Fn(UserRole) -> bool,
    action: &str,
) -> Result<(), AppError> {
    if !actor.is_active() {
        return Err(AppError::Forbidden(format!(
            "Account is {} and cannot {action}",
            actor.status
        )));
    }
    if !allowed(actor.role) {
        return Err(AppError::Forbidden(format!(
            "Role {} cannot {action}",
            actor.role
        )));
    }
    Ok(())
}

/// Rejects blank required text, returning the trimmed value.
pub(crate) fn required_text(value: &str, field: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}
