use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::company::{Company, CompanyRow, CompanyStatus};
use crate::models::user::{UserProfile, UserRole};
use crate::services::{decode_all, ensure_moderator, require_role, required_text};

/// Counters are derived at read time, never stored.
const COMPANY_SELECT: &str = r#"
    SELECT c.*,
        (SELECT COUNT(*) FROM jobs j WHERE j.company_id = c.id) AS job_count,
        (SELECT COUNT(*) FROM applications a WHERE a.company_id = c.id) AS application_count
    FROM companies c
"#;

pub async fn find_company(db: &PgPool, company_id: Uuid) -> Result<Option<Company>, AppError> {
    let row = sqlx::query_as::<_, CompanyRow>(&format!("{COMPANY_SELECT} WHERE c.id = $1"))
        .bind(company_id)
        .fetch_optional(db)
        .await?;
    Ok(row.map(Company::try_from).transpose()?)
}

pub async fn get_company(db: &PgPool, company_id: Uuid) -> Result<Company, AppError> {
    find_company(db, company_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Company {company_id} not found")))
}

pub async fn list_companies(
    db: &PgPool,
    status: Option<CompanyStatus>,
) -> Result<Vec<Company>, AppError> {
    let rows = match status {
        Some(status) => {
            sqlx::query_as::<_, CompanyRow>(&format!(
                "{COMPANY_SELECT} WHERE c.status = $1 ORDER BY c.name"
            ))
            .bind(status.as_str())
            .fetch_all(db)
            .await?
        }
        None => {
            sqlx::query_as::<_, CompanyRow>(&format!("{COMPANY_SELECT} ORDER BY c.name"))
                .fetch_all(db)
                .await?
        }
    };
    decode_all(rows)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CompanyDetails {
    pub name: Option<String>,
    pub description: Option<String>,
    pub website_url: Option<String>,
    pub logo_url: Option<String>,
    pub location: Option<String>,
}

impl CompanyDetails {
    fn apply(self, company: &mut Company) -> Result<(), AppError> {
        if let Some(name) = self.name {
            company.name = required_text(&name, "Company name")?;
        }
        if let Some(description) = self.description {
            company.description = optional_text(description);
        }
        if let Some(url) = self.website_url {
            company.website_url = optional_url(url, "Website URL")?;
        }
        if let Some(url) = self.logo_url {
            company.logo_url = optional_url(url, "Logo URL")?;
        }
        if let Some(location) = self.location {
            company.location = optional_text(location);
        }
        Ok(())
    }
}

fn optional_text(value: String) -> Option<String> {
    Some(value.trim().to_string()).filter(|v| !v.is_empty())
}

fn optional_url(value: String, field: &str) -> Result<Option<String>, AppError> {
    match optional_text(value) {
        Some(url) if !(url.starts_with("https://") || url.starts_with("http://")) => Err(
            AppError::Validation(format!("{field} must start with http:// or https://")),
        ),
        other => Ok(other),
    }
}

/// Only employers without a company may register one.
fn check_can_register(actor: &UserProfile) -> Result<(), AppError> {
    if actor.company_id.is_some() {
        return Err(AppError::Conflict(
            "You already belong to a company".to_string(),
        ));
    }
    Ok(())
}

/// Registers a company in `pending` state. The creator becomes its first admin.
pub async fn create_company(
    db: &PgPool,
    actor_id: Uuid,
    details: CompanyDetails,
) -> Result<Company, AppError> {
    let actor = require_role(
        db,
        actor_id,
        |role| role == UserRole::Employer,
        "register a company",
    )
    .await?;
    check_can_register(&actor)?;

    let now = chrono::Utc::now();
    let mut company = Company {
        id: Uuid::new_v4(),
        name: String::new(),
        description: None,
        website_url: None,
        logo_url: None,
        location: None,
        admin_uids: vec![actor.id],
        recruiter_uids: vec![],
        status: CompanyStatus::Pending,
        moderation_reason: None,
        created_at: now,
        updated_at: now,
        job_count: 0,
        application_count: 0,
    };
    if details.name.is_none() {
        return Err(AppError::Validation("Company name is required".to_string()));
    }
    details.apply(&mut company)?;

    let mut tx = db.begin().await?;
    sqlx::query(
        r#"
        INSERT INTO companies
            (id, name, description, website_url, logo_url, location, admin_uids, recruiter_uids, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(company.id)
    .bind(&company.name)
    .bind(&company.description)
    .bind(&company.website_url)
    .bind(&company.logo_url)
    .bind(&company.location)
    .bind(&company.admin_uids)
    .bind(&company.recruiter_uids)
    .bind(company.status.as_str())
    .execute(&mut *tx)
    .await?;
    sqlx::query(
        "UPDATE users SET company_id = $2, is_company_admin = TRUE, updated_at = now() WHERE id = $1",
    )
    .bind(actor.id)
    .bind(company.id)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    info!("Company {} registered by {}", company.id, actor.id);
    get_company(db, company.id).await
}

/// Company admins edit their own profile; moderation state is untouched.
pub async fn update_company(
    db: &PgPool,
    actor_id: Uuid,
    company_id: Uuid,
    details: CompanyDetails,
) -> Result<Company, AppError> {
    let mut company = get_company(db, company_id).await?;
    if !company.is_admin(actor_id) {
        return Err(AppError::Forbidden(
            "Only company admins can edit the company profile".to_string(),
        ));
    }
    details.apply(&mut company)?;

    sqlx::query(
        r#"
        UPDATE companies SET
            name = $2, description = $3, website_url = $4, logo_url = $5, location = $6,
            updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(company.id)
    .bind(&company.name)
    .bind(&company.description)
    .bind(&company.website_url)
    .bind(&company.logo_url)
    .bind(&company.location)
    .execute(db)
    .await?;

    get_company(db, company_id).await
}

/// Rejections and suspensions must carry a reason the employer can read.
pub(crate) fn moderation_reason(
    needs_reason: bool,
    reason: Option<String>,
) -> Result<Option<String>, AppError> {
    let reason = reason.and_then(optional_text);
    if needs_reason && reason.is_none() {
        return Err(AppError::Validation(
            "A reason is required for this moderation decision".to_string(),
        ));
    }
    Ok(reason)
}

pub async fn moderate_company(
    db: &PgPool,
    actor_id: Uuid,
    company_id: Uuid,
    status: CompanyStatus,
    reason: Option<String>,
) -> Result<Company, AppError> {
    ensure_moderator(db, actor_id, "moderate companies").await?;
    let reason = moderation_reason(
        matches!(status, CompanyStatus::Rejected | CompanyStatus::Suspended),
        reason,
    )?;

    let updated = sqlx::query(
        "UPDATE companies SET status = $2, moderation_reason = $3, updated_at = now() WHERE id = $1",
    )
    .bind(company_id)
    .bind(status.as_str())
    .bind(&reason)
    .execute(db)
    .await?;
    if updated.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Company {company_id} not found")));
    }

    info!("Company {company_id} moderated to {status} by {actor_id}");
    get_company(db, company_id).await
}
