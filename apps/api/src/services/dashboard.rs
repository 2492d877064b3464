use std::collections::BTreeMap;

use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::UserRole;
use crate::services::require_role;

#[derive(Debug, FromRow)]
struct CountRow {
    key: String,
    count: i64,
}

#[derive(Debug, Default, Serialize)]
pub struct DashboardStats {
    pub users_by_role: BTreeMap<String, i64>,
    pub companies_by_status: BTreeMap<String, i64>,
    pub jobs_by_status: BTreeMap<String, i64>,
    pub total_users: i64,
    pub total_applications: i64,
}

fn tally(rows: Vec<CountRow>) -> BTreeMap<String, i64> {
    rows.into_iter().map(|r| (r.key, r.count)).collect()
}

async fn grouped(db: &PgPool, sql: &str) -> Result<BTreeMap<String, i64>, AppError> {
    let rows = sqlx::query_as::<_, CountRow>(sql).fetch_all(db).await?;
    Ok(tally(rows))
}

/// Platform-wide counts for any back-office role.
pub async fn dashboard_stats(db: &PgPool, actor_id: Uuid) -> Result<DashboardStats, AppError> {
    require_role(db, actor_id, UserRole::is_admin_like, "view the dashboard").await?;

    let users_by_role =
        grouped(db, "SELECT role AS key, COUNT(*) AS count FROM users GROUP BY role").await?;
    let companies_by_status = grouped(
        db,
        "SELECT status AS key, COUNT(*) AS count FROM companies GROUP BY status",
    )
    .await?;
    let jobs_by_status =
        grouped(db, "SELECT status AS key, COUNT(*) AS count FROM jobs GROUP BY status").await?;
    let total_applications: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM applications")
        .fetch_one(db)
        .await?;

    Ok(DashboardStats {
        total_users: users_by_role.values().sum(),
        users_by_role,
        companies_by_status,
        jobs_by_status,
        total_applications,
    })
}
