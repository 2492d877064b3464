//! Candidate search for employers. Same conjunctive semantics as `filter_jobs`,
//! over job seekers who are active and have opted into being searchable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::filters::jobs::contains_ci;
use crate::filters::{is_all, RecentActivity};
use crate::models::user::{UserProfile, UserRole};
use crate::search::SearchQuery;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateFilters {
    pub search_term: String,
    pub location: String,
    /// An `Availability` spelling or `"all"`.
    pub availability: Option<String>,
    /// A `JobSearchStatus` spelling or `"all"`.
    pub job_search_status: Option<String>,
    /// Candidates expecting more are excluded; candidates without an expectation are kept.
    pub desired_salary_max: Option<i64>,
    /// Compared against the candidate's `last_active`.
    pub recent_activity: RecentActivity,
    pub min_experience_years: Option<i32>,
}

pub fn filter_candidates<'a>(
    candidates: &'a [UserProfile],
    filters: &CandidateFilters,
    now: DateTime<Utc>,
) -> Vec<&'a UserProfile> {
    let query = SearchQuery::parse(&filters.search_term);
    candidates
        .iter()
        .filter(|c| is_discoverable(c) && candidate_matches(c, filters, &query, now))
        .collect()
}

fn is_discoverable(candidate: &UserProfile) -> bool {
    candidate.role == UserRole::JobSeeker && candidate.is_active() && candidate.is_profile_searchable
}

fn candidate_matches(
    candidate: &UserProfile,
    filters: &CandidateFilters,
    query: &SearchQuery,
    now: DateTime<Utc>,
) -> bool {
    matches_search(candidate, query)
        && contains_ci(candidate.location.as_deref().unwrap_or_default(), &filters.location)
        && matches_choice(
            candidate.availability.map(|a| a.as_str()),
            filters.availability.as_deref(),
        )
        && matches_choice(
            candidate.job_search_status.map(|s| s.as_str()),
            filters.job_search_status.as_deref(),
        )
        && match filters.desired_salary_max.filter(|v| *v > 0) {
            Some(ceiling) => candidate.expected_salary.map_or(true, |s| s <= ceiling),
            None => true,
        }
        && match candidate.last_active {
            Some(seen) => filters.recent_activity.includes(seen, now),
            None => filters.recent_activity == RecentActivity::Any,
        }
        && match filters.min_experience_years {
            Some(years) => candidate.total_years_experience.unwrap_or(0) >= years,
            None => true,
        }
}

fn matches_search(candidate: &UserProfile, query: &SearchQuery) -> bool {
    if query.is_empty() {
        return true;
    }
    let skills = candidate.skills.join(", ");
    let experience = candidate
        .experiences
        .iter()
        .map(|e| format!("{} {}", e.job_role, e.company_name))
        .collect::<Vec<_>>()
        .join("\n");
    query.matches_any_field([
        candidate.name.as_str(),
        candidate.headline.as_deref().unwrap_or_default(),
        skills.as_str(),
        experience.as_str(),
    ])
}

fn matches_choice(actual: Option<&str>, wanted: Option<&str>) -> bool {
    match wanted {
        Some(w) if !is_all(w) => actual.is_some_and(|a| a.eq_ignore_ascii_case(w.trim())),
        _ => true,
    }
}
