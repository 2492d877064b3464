// Sortable columns for each admin table. Column names match the JSON field names.

use crate::admin::table::{SortValue, Sortable};
use crate::models::application::Application;
use crate::models::company::Company;
use crate::models::job::Job;
use crate::models::user::UserProfile;

impl Sortable for UserProfile {
    fn sort_value(&self, column: &str) -> SortValue {
        match column {
            "name" => SortValue::text(&self.name),
            "email" => SortValue::text(&self.email),
            "role" => SortValue::text(self.role.as_str()),
            "status" => SortValue::text(self.status.as_str()),
            "location" => SortValue::opt_text(self.location.as_deref()),
            "last_active" => self.last_active.into(),
            "created_at" => self.created_at.into(),
            _ => SortValue::Missing,
        }
    }

    fn search_text(&self) -> String {
        format!("{} {} {}", self.name, self.email, self.role).to_lowercase()
    }
}

impl Sortable for Company {
    fn sort_value(&self, column: &str) -> SortValue {
        match column {
            "name" => SortValue::text(&self.name),
            "status" => SortValue::text(self.status.as_str()),
            "location" => SortValue::opt_text(self.location.as_deref()),
            "job_count" => self.job_count.into(),
            "application_count" => self.application_count.into(),
            "created_at" => self.created_at.into(),
            _ => SortValue::Missing,
        }
    }

    fn search_text(&self) -> String {
        format!(
            "{} {}",
            self.name,
            self.location.as_deref().unwrap_or_default()
        )
        .to_lowercase()
    }
}

impl Sortable for Job {
    fn sort_value(&self, column: &str) -> SortValue {
        match column {
            "title" => SortValue::text(&self.title),
            "company_name" => SortValue::text(&self.company_name),
            "location" => SortValue::text(&self.location),
            "status" => SortValue::text(self.status.as_str()),
            "job_type" => SortValue::text(self.job_type.as_str()),
            "applicant_count" => self.applicant_count.into(),
            "posted_date" => self.posted_date.into(),
            _ => SortValue::Missing,
        }
    }

    fn search_text(&self) -> String {
        format!("{} {} {}", self.title, self.company_name, self.location).to_lowercase()
    }
}

impl Sortable for Application {
    fn sort_value(&self, column: &str) -> SortValue {
        match column {
            "applicant_name" => SortValue::text(&self.applicant_name),
            "job_title" => SortValue::text(&self.job_title),
            "company_name" => SortValue::text(&self.company_name),
            "status" => SortValue::text(self.status.as_str()),
            "applied_at" => self.applied_at.into(),
            "updated_at" => self.updated_at.into(),
            _ => SortValue::Missing,
        }
    }

    fn search_text(&self) -> String {
        format!(
            "{} {} {}",
            self.applicant_name, self.job_title, self.company_name
        )
        .to_lowercase()
    }
}
