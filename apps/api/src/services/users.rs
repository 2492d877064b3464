use chrono::Utc;
use serde::Deserialize;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::filters::jobs::JobFilters;
use crate::models::invitation::normalize_email;
use crate::models::user::{
    Availability, EducationEntry, ExperienceEntry, JobSearchStatus, LanguageEntry, SavedSearch,
    UserProfile, UserRole, UserRow, UserStatus,
};
use crate::services::{decode_all, ensure_moderator, required_text};

pub async fn find_user(db: &PgPool, user_id: Uuid) -> Result<Option<UserProfile>, AppError> {
    let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(db)
        .await?;
    Ok(row.map(UserProfile::try_from).transpose()?)
}

pub async fn get_user(db: &PgPool, user_id: Uuid) -> Result<UserProfile, AppError> {
    find_user(db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))
}

pub async fn list_users(db: &PgPool) -> Result<Vec<UserProfile>, AppError> {
    let rows = sqlx::query_as::<_, UserRow>("SELECT * FROM users ORDER BY created_at DESC")
        .fetch_all(db)
        .await?;
    decode_all(rows)
}

/// Active job seekers who opted into being found by employers.
pub async fn list_searchable_candidates(db: &PgPool) -> Result<Vec<UserProfile>, AppError> {
    let rows = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT * FROM users
        WHERE role = $1 AND status = $2 AND is_profile_searchable
        ORDER BY last_active DESC NULLS LAST
        "#,
    )
    .bind(UserRole::JobSeeker.as_str())
    .bind(UserStatus::Active.as_str())
    .fetch_all(db)
    .await?;
    decode_all(rows)
}

#[derive(Debug, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<UserRole>,
}

/// Self sign-up only creates job seekers or employers. Back-office roles are granted in the database.
fn validate_new_user(input: &NewUser) -> Result<(String, String, UserRole), AppError> {
    let name = required_text(&input.name, "Name")?;
    let email = normalize_email(&input.email);
    if !is_plausible_email(&email) {
        return Err(AppError::Validation(format!("'{}' is not a valid email", input.email)));
    }
    let role = input.role.unwrap_or(UserRole::JobSeeker);
    if role.is_admin_like() {
        return Err(AppError::Forbidden(format!("Cannot sign up as {role}")));
    }
    Ok((name, email, role))
}

pub(crate) fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.contains('@'),
        None => false,
    }
}

fn email_taken(email: &str) -> AppError {
    AppError::Conflict(format!("An account for {email} already exists"))
}

pub async fn create_user(db: &PgPool, input: NewUser) -> Result<UserProfile, AppError> {
    let (name, email, role) = validate_new_user(&input)?;

    let id = Uuid::new_v4();
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users (id, name, email, role, status, last_active)
        VALUES ($1, $2, $3, $4, $5, now())
        ON CONFLICT (email) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&name)
    .bind(&email)
    .bind(role.as_str())
    .bind(UserStatus::Active.as_str())
    .fetch_optional(db)
    .await?
    .ok_or_else(|| email_taken(&email))?;

    info!("Created {role} account {id}");
    Ok(row.try_into()?)
}

/// Partial profile edit. Absent fields are left untouched.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub headline: Option<String>,
    pub location: Option<String>,
    pub skills: Option<Vec<String>>,
    pub experiences: Option<Vec<ExperienceEntry>>,
    pub educations: Option<Vec<EducationEntry>>,
    pub languages: Option<Vec<LanguageEntry>>,
    pub total_years_experience: Option<i32>,
    pub expected_salary: Option<i64>,
    pub availability: Option<Availability>,
    pub job_search_status: Option<JobSearchStatus>,
    pub is_profile_searchable: Option<bool>,
}

impl ProfileUpdate {
    pub fn apply(self, profile: &mut UserProfile) -> Result<(), AppError> {
        if let Some(name) = self.name {
            profile.name = required_text(&name, "Name")?;
        }
        if let Some(headline) = self.headline {
            profile.headline = Some(headline.trim().to_string()).filter(|h| !h.is_empty());
        }
        if let Some(location) = self.location {
            profile.location = Some(location.trim().to_string()).filter(|l| !l.is_empty());
        }
        if let Some(skills) = self.skills {
            profile.skills = crate::flows::dedup_case_insensitive(skills);
        }
        if let Some(experiences) = self.experiences {
            for e in &experiences {
                if let (Some(start), Some(end)) = (e.start_date, e.end_date) {
                    if end < start {
                        return Err(AppError::Validation(format!(
                            "Experience at {} ends before it starts",
                            e.company_name
                        )));
                    }
                }
            }
            profile.experiences = experiences;
        }
        if let Some(educations) = self.educations {
            profile.educations = educations;
        }
        if let Some(languages) = self.languages {
            profile.languages = languages;
        }
        if let Some(years) = self.total_years_experience {
            if years < 0 {
                return Err(AppError::Validation(
                    "Total years of experience cannot be negative".to_string(),
                ));
            }
            profile.total_years_experience = Some(years);
        }
        if let Some(salary) = self.expected_salary {
            if salary < 0 {
                return Err(AppError::Validation(
                    "Expected salary cannot be negative".to_string(),
                ));
            }
            profile.expected_salary = Some(salary);
        }
        if let Some(availability) = self.availability {
            profile.availability = Some(availability);
        }
        if let Some(status) = self.job_search_status {
            profile.job_search_status = Some(status);
        }
        if let Some(searchable) = self.is_profile_searchable {
            profile.is_profile_searchable = searchable;
        }
        Ok(())
    }
}

pub async fn update_profile(
    db: &PgPool,
    user_id: Uuid,
    update: ProfileUpdate,
) -> Result<UserProfile, AppError> {
    let mut profile = get_user(db, user_id).await?;
    update.apply(&mut profile)?;

    let row = sqlx::query_as::<_, UserRow>(
        r#"
        UPDATE users SET
            name = $2, headline = $3, location = $4, skills = $5,
            experiences = $6, educations = $7, languages = $8,
            total_years_experience = $9, expected_salary = $10,
            availability = $11, job_search_status = $12,
            is_profile_searchable = $13, last_active = now(), updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(&profile.name)
    .bind(&profile.headline)
    .bind(&profile.location)
    .bind(&profile.skills)
    .bind(Json(&profile.experiences))
    .bind(Json(&profile.educations))
    .bind(Json(&profile.languages))
    .bind(profile.total_years_experience)
    .bind(profile.expected_salary)
    .bind(profile.availability.map(|a| a.as_str()))
    .bind(profile.job_search_status.map(|s| s.as_str()))
    .bind(profile.is_profile_searchable)
    .fetch_one(db)
    .await?;

    Ok(row.try_into()?)
}

/// Suspends, reactivates or soft-deletes an account.
pub async fn set_user_status(
    db: &PgPool,
    actor_id: Uuid,
    user_id: Uuid,
    status: UserStatus,
) -> Result<UserProfile, AppError> {
    let actor = ensure_moderator(db, actor_id, "change account status").await?;
    if actor.id == user_id {
        return Err(AppError::Forbidden(
            "Moderators cannot change their own account status".to_string(),
        ));
    }
    let target = get_user(db, user_id).await?;
    if target.role == UserRole::SuperAdmin && actor.role != UserRole::SuperAdmin {
        return Err(AppError::Forbidden(
            "Only a super admin can change another super admin".to_string(),
        ));
    }

    let row = sqlx::query_as::<_, UserRow>(
        "UPDATE users SET status = $2, updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(user_id)
    .bind(status.as_str())
    .fetch_one(db)
    .await?;

    info!("User {user_id} set to {status} by {actor_id}");
    Ok(row.try_into()?)
}

pub async fn save_job(db: &PgPool, user_id: Uuid, job_id: Uuid) -> Result<UserProfile, AppError> {
    crate::services::jobs::get_job(db, job_id).await?;
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        UPDATE users SET
            saved_job_ids = CASE WHEN $2 = ANY(saved_job_ids) THEN saved_job_ids
                                 ELSE array_append(saved_job_ids, $2) END,
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(job_id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;
    Ok(row.try_into()?)
}

pub async fn unsave_job(db: &PgPool, user_id: Uuid, job_id: Uuid) -> Result<UserProfile, AppError> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        UPDATE users SET saved_job_ids = array_remove(saved_job_ids, $2), updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(job_id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;
    Ok(row.try_into()?)
}

#[derive(Debug, Deserialize)]
pub struct NewSavedSearch {
    pub name: String,
    #[serde(default)]
    pub filters: JobFilters,
}

/// Saved search names are unique per user, ignoring case.
fn push_saved_search(profile: &mut UserProfile, input: NewSavedSearch) -> Result<SavedSearch, AppError> {
    let name = required_text(&input.name, "Search name")?;
    if profile
        .saved_searches
        .iter()
        .any(|s| s.name.eq_ignore_ascii_case(&name))
    {
        return Err(AppError::Conflict(format!("A saved search named '{name}' already exists")));
    }
    let search = SavedSearch {
        id: Uuid::new_v4(),
        name,
        filters: input.filters,
        created_at: Utc::now(),
    };
    profile.saved_searches.push(search.clone());
    Ok(search)
}

pub async fn add_saved_search(
    db: &PgPool,
    user_id: Uuid,
    input: NewSavedSearch,
) -> Result<SavedSearch, AppError> {
    let mut profile = get_user(db, user_id).await?;
    let search = push_saved_search(&mut profile, input)?;
    store_saved_searches(db, &profile).await?;
    Ok(search)
}

pub async fn remove_saved_search(
    db: &PgPool,
    user_id: Uuid,
    search_id: Uuid,
) -> Result<UserProfile, AppError> {
    let mut profile = get_user(db, user_id).await?;
    let before = profile.saved_searches.len();
    profile.saved_searches.retain(|s| s.id != search_id);
    if profile.saved_searches.len() == before {
        return Err(AppError::NotFound(format!("Saved search {search_id} not found")));
    }
    store_saved_searches(db, &profile).await?;
    Ok(profile)
}

async fn store_saved_searches(db: &PgPool, profile: &UserProfile) -> Result<(), AppError> {
    sqlx::query("UPDATE users SET saved_searches = $2, updated_at = now() WHERE id = $1")
        .bind(profile.id)
        .bind(Json(&profile.saved_searches))
        .execute(db)
        .await?;
    Ok(())
}
