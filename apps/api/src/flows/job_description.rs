//! Job description parsing flow. Pre-fills the job posting form from an uploaded description.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::flows::document::extract_text;
use crate::flows::prompts::{JOB_DESCRIPTION_PARSE_PROMPT, JOB_DESCRIPTION_PARSE_SYSTEM};
use crate::flows::{dedup_case_insensitive, non_blank, NO_MODEL_OUTPUT};
use crate::llm_client::prompts::EXTRACTION_INSTRUCTION;
use crate::llm_client::{complete_json, CompletionModel};
use crate::models::job::{ExperienceLevel, JobType};

#[derive(Debug, Clone, Deserialize)]
pub struct ParseJobDescriptionInput {
    pub job_description_data_uri: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsedJobDescription {
    pub title: String,
    pub description: String,
    pub skills: Vec<String>,
    pub location: String,
    pub job_type: Option<String>,
    pub is_remote: bool,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub industry: Option<String>,
    pub department: Option<String>,
    pub experience_level: Option<String>,
    pub min_experience_years: Option<i32>,
    pub max_experience_years: Option<i32>,
    pub responsibilities: Option<String>,
    pub requirements: Option<String>,
    pub benefits: Option<String>,
    #[serde(skip_deserializing)]
    pub parsing_error: Option<String>,
}

impl ParsedJobDescription {
    fn failed(message: String) -> Self {
        ParsedJobDescription {
            parsing_error: Some(message),
            ..Default::default()
        }
    }

    /// Normalizes enum-like fields to canonical spellings and orders numeric ranges.
    fn sanitized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.description = self.description.trim().to_string();
        self.location = self.location.trim().to_string();
        self.skills = dedup_case_insensitive(self.skills);
        self.job_type = canonical(self.job_type, JobType::ALL.iter().map(|t| t.as_str()));
        self.experience_level = canonical(
            self.experience_level,
            ExperienceLevel::ALL.iter().map(|l| l.as_str()),
        );
        self.salary_min = self.salary_min.filter(|v| *v > 0);
        self.salary_max = self.salary_max.filter(|v| *v > 0);
        if let (Some(lo), Some(hi)) = (self.salary_min, self.salary_max) {
            if lo > hi {
                self.salary_min = Some(hi);
                self.salary_max = Some(lo);
            }
        }
        self.min_experience_years = self.min_experience_years.filter(|v| *v >= 0);
        self.max_experience_years = self.max_experience_years.filter(|v| *v >= 0);
        if let (Some(lo), Some(hi)) = (self.min_experience_years, self.max_experience_years) {
            if lo > hi {
                self.min_experience_years = Some(hi);
                self.max_experience_years = Some(lo);
            }
        }
        self.industry = non_blank(self.industry);
        self.department = non_blank(self.department);
        self.responsibilities = non_blank(self.responsibilities);
        self.requirements = non_blank(self.requirements);
        self.benefits = non_blank(self.benefits);
        self.parsing_error = None;
        self
    }
}

/// Maps `value` onto one of `allowed` ignoring case, punctuation and spacing; unknown values become `None`.
fn canonical<'a>(
    value: Option<String>,
    allowed: impl Iterator<Item = &'a str>,
) -> Option<String> {
    let squash = |s: &str| {
        s.chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect::<String>()
    };
    let wanted = squash(value.as_deref()?);
    allowed
        .into_iter()
        .find(|candidate| squash(candidate) == wanted)
        .map(str::to_string)
}

fn quoted_list<'a>(values: impl Iterator<Item = &'a str>) -> String {
    values
        .map(|v| format!("\"{v}\""))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Runs the job description flow. Never fails: errors come back in `parsing_error`.
pub async fn parse_job_description(
    model: &dyn CompletionModel,
    input: &ParseJobDescriptionInput,
) -> ParsedJobDescription {
    let document = match extract_text(&input.job_description_data_uri) {
        Ok(document) => document,
        Err(e) => {
            warn!("Job description rejected before model call: {e}");
            return ParsedJobDescription::failed(e.to_string());
        }
    };
    debug!(
        "Job description document accepted ({}, {} bytes)",
        document.mime_type,
        document.text.len()
    );

    let prompt = JOB_DESCRIPTION_PARSE_PROMPT
        .replace("{extraction_instruction}", EXTRACTION_INSTRUCTION)
        .replace("{job_types}", &quoted_list(JobType::ALL.iter().map(|t| t.as_str())))
        .replace(
            "{experience_levels}",
            &quoted_list(ExperienceLevel::ALL.iter().map(|l| l.as_str())),
        )
        .replace("{document_text}", &document.text);

    match complete_json::<ParsedJobDescription>(model, &prompt, JOB_DESCRIPTION_PARSE_SYSTEM).await
    {
        Ok(parsed) => {
            let parsed = parsed.sanitized();
            info!("Parsed job description '{}'", parsed.title);
            parsed
        }
        Err(e) => {
            warn!("Job description parsing returned no usable output: {e}");
            ParsedJobDescription::failed(NO_MODEL_OUTPUT.to_string())
        }
    }
}
