//! `filter_jobs`: the job search predicate.
//!
//! A job passes iff it satisfies every active criterion. Inactive criteria are
//! blank strings, `"all"`, `false`, `RecentActivity::Any`, `None` or zero.
//! Input order is preserved.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::filters::{is_all, RecentActivity};
use crate::models::job::Job;
use crate::search::SearchQuery;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobFilters {
    pub search_term: String,
    pub location: String,
    /// A `JobType` spelling such as `"Full-time"`, or `"all"`.
    pub role_type: Option<String>,
    pub is_remote: bool,
    pub recent_activity: RecentActivity,
    pub industry: String,
    /// An `ExperienceLevel` spelling such as `"Mid-Level"`, or `"all"`.
    pub experience_level: Option<String>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    /// Years of experience the seeker has; jobs asking for more are excluded.
    pub min_experience_years: Option<i32>,
}

impl JobFilters {
    fn salary_bounds(&self) -> (Option<i64>, Option<i64>) {
        (
            self.salary_min.filter(|v| *v > 0),
            self.salary_max.filter(|v| *v > 0),
        )
    }
}

/// Returns the jobs matching every active filter, in input order.
pub fn filter_jobs<'a>(jobs: &'a [Job], filters: &JobFilters, now: DateTime<Utc>) -> Vec<&'a Job> {
    let query = SearchQuery::parse(&filters.search_term);
    jobs.iter()
        .filter(|job| job_matches(job, filters, &query, now))
        .collect()
}

/// Newest postings first. Stable for equal timestamps.
pub fn sort_by_posted_date(jobs: &mut [Job]) {
    jobs.sort_by(|a, b| b.posted_date.cmp(&a.posted_date));
}

fn job_matches(job: &Job, filters: &JobFilters, query: &SearchQuery, now: DateTime<Utc>) -> bool {
    matches_search(job, query)
        && contains_ci(&job.location, &filters.location)
        && matches_role_type(job, filters.role_type.as_deref())
        && (!filters.is_remote || job.is_remote)
        && filters.recent_activity.includes(job.posted_date, now)
        && contains_ci(job.industry.as_deref().unwrap_or_default(), &filters.industry)
        && matches_experience_level(job, filters.experience_level.as_deref())
        && matches_salary(job, filters)
        && matches_min_experience(job, filters.min_experience_years)
}

fn matches_search(job: &Job, query: &SearchQuery) -> bool {
    if query.is_empty() {
        return true;
    }
    let skills = job.skills.join(", ");
    query.matches_any_field([
        job.title.as_str(),
        job.company_name.as_str(),
        job.description.as_str(),
        skills.as_str(),
        job.industry.as_deref().unwrap_or_default(),
        job.department.as_deref().unwrap_or_default(),
        job.location.as_str(),
    ])
}

/// Case-insensitive substring; a blank needle always matches.
pub(crate) fn contains_ci(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim();
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn matches_role_type(job: &Job, role_type: Option<&str>) -> bool {
    match role_type {
        Some(wanted) if !is_all(wanted) => job.job_type.as_str().eq_ignore_ascii_case(wanted.trim()),
        _ => true,
    }
}

fn matches_experience_level(job: &Job, level: Option<&str>) -> bool {
    match level {
        Some(wanted) if !is_all(wanted) => job
            .experience_level
            .is_some_and(|l| l.as_str().eq_ignore_ascii_case(wanted.trim())),
        _ => true,
    }
}

/// Salary bounds require disclosed pay and containment of the job's range:
/// `job.salary_min >= filter.salary_min` and `job.salary_max <= filter.salary_max`.
fn matches_salary(job: &Job, filters: &JobFilters) -> bool {
    let (wanted_min, wanted_max) = filters.salary_bounds();
    if wanted_min.is_none() && wanted_max.is_none() {
        return true;
    }
    if !job.pay_transparency {
        return false;
    }
    let min_ok = match wanted_min {
        Some(floor) => job.salary_min.is_some_and(|s| s >= floor),
        None => true,
    };
    let max_ok = match wanted_max {
        Some(ceiling) => job.salary_max.is_some_and(|s| s <= ceiling),
        None => true,
    };
    min_ok && max_ok
}

fn matches_min_experience(job: &Job, seeker_years: Option<i32>) -> bool {
    match seeker_years {
        Some(years) => job.min_experience_years.unwrap_or(0) <= years,
        None => true,
    }
}
