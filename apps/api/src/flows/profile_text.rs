//! Plain-text renderings of profiles and jobs for prompt interpolation.

use std::fmt::Write as _;

use crate::flows::matching::{CandidateForMatching, JobForMatching};
use crate::models::job::Job;
use crate::models::user::UserProfile;

/// Multi-line description of a job seeker. Empty sections are omitted.
pub fn describe_profile(profile: &UserProfile) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Name: {}", profile.name);
    if let Some(headline) = non_empty(profile.headline.as_deref()) {
        let _ = writeln!(out, "Headline: {headline}");
    }
    if let Some(location) = non_empty(profile.location.as_deref()) {
        let _ = writeln!(out, "Location: {location}");
    }
    if !profile.skills.is_empty() {
        let _ = writeln!(out, "Skills: {}", profile.skills.join(", "));
    }
    if let Some(years) = profile.total_years_experience {
        let _ = writeln!(out, "Total experience: {years} years");
    }
    if !profile.experiences.is_empty() {
        out.push_str("Experience:\n");
        for e in &profile.experiences {
            let start = e
                .start_date
                .map(|d| d.format("%b %Y").to_string())
                .unwrap_or_else(|| "?".to_string());
            let end = if e.currently_working {
                "Present".to_string()
            } else {
                e.end_date
                    .map(|d| d.format("%b %Y").to_string())
                    .unwrap_or_else(|| "?".to_string())
            };
            let _ = write!(out, "- {} at {} ({start} - {end})", e.job_role, e.company_name);
            if let Some(description) = non_empty(e.description.as_deref()) {
                let _ = write!(out, ": {description}");
            }
            out.push('\n');
        }
    }
    if !profile.educations.is_empty() {
        out.push_str("Education:\n");
        for e in &profile.educations {
            let _ = write!(out, "- {} ({}), {}", e.degree_name, e.level, e.institute_name);
            if let Some(year) = e.end_year {
                let _ = write!(out, ", {year}");
            }
            out.push('\n');
        }
    }
    if !profile.languages.is_empty() {
        let languages = profile
            .languages
            .iter()
            .map(|l| format!("{} ({})", l.language_name, l.proficiency))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(out, "Languages: {languages}");
    }
    if let Some(salary) = profile.expected_salary {
        let _ = writeln!(out, "Expected salary: {salary}");
    }
    if let Some(availability) = profile.availability {
        let _ = writeln!(out, "Availability: {availability}");
    }
    out.trim_end().to_string()
}

/// Multi-line description of a posting, used as the job side of candidate matching.
pub fn describe_job(job: &Job) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Title: {}", job.title);
    let _ = writeln!(out, "Company: {}", job.company_name);
    let remote = if job.is_remote { " (remote)" } else { "" };
    let _ = writeln!(out, "Location: {}{remote}", job.location);
    let _ = writeln!(out, "Type: {}", job.job_type);
    if let Some(level) = job.experience_level {
        let _ = writeln!(out, "Experience level: {level}");
    }
    match (job.min_experience_years, job.max_experience_years) {
        (Some(lo), Some(hi)) => {
            let _ = writeln!(out, "Experience: {lo}-{hi} years");
        }
        (Some(lo), None) => {
            let _ = writeln!(out, "Experience: {lo}+ years");
        }
        _ => {}
    }
    if !job.skills.is_empty() {
        let _ = writeln!(out, "Required skills: {}", job.skills.join(", "));
    }
    let _ = writeln!(out, "Description: {}", job.description.trim());
    if let Some(requirements) = non_empty(job.requirements.as_deref()) {
        let _ = writeln!(out, "Requirements:\n{requirements}");
    }
    if let Some(responsibilities) = non_empty(job.responsibilities.as_deref()) {
        let _ = writeln!(out, "Responsibilities:\n{responsibilities}");
    }
    out.trim_end().to_string()
}

/// Salary figures are only shared with the matcher when the employer discloses them.
pub fn job_for_matching(job: &Job) -> JobForMatching {
    let (salary_min, salary_max) = if job.pay_transparency {
        (job.salary_min, job.salary_max)
    } else {
        (None, None)
    };
    JobForMatching {
        id: job.id.to_string(),
        title: job.title.clone(),
        company: job.company_name.clone(),
        description: job.description.clone(),
        skills: job.skills.clone(),
        location: job.location.clone(),
        job_type: job.job_type.to_string(),
        is_remote: job.is_remote,
        salary_min,
        salary_max,
        experience_level: job.experience_level.map(|l| l.to_string()),
    }
}

pub fn candidate_for_matching(profile: &UserProfile) -> CandidateForMatching {
    CandidateForMatching {
        id: profile.id.to_string(),
        profile: describe_profile(profile),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
