//! Resume parsing flow. Turns an uploaded text resume into profile fields.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::flows::document::extract_text;
use crate::flows::prompts::{RESUME_PARSE_PROMPT, RESUME_PARSE_SYSTEM};
use crate::flows::{dedup_case_insensitive, non_blank, NO_MODEL_OUTPUT};
use crate::llm_client::prompts::EXTRACTION_INSTRUCTION;
use crate::llm_client::{complete_json, CompletionModel};

#[derive(Debug, Clone, Deserialize)]
pub struct ParseResumeInput {
    /// `data:<mime>;base64,<payload>`
    pub resume_data_uri: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsedExperience {
    pub company_name: String,
    pub job_role: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub currently_working: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsedEducation {
    pub level: String,
    pub degree_name: String,
    pub institute_name: String,
    pub specialization: Option<String>,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsedLanguage {
    pub language_name: String,
    pub proficiency: String,
}

/// Output of the resume flow. On any failure every field is empty and
/// `parsing_error` carries the message to show the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsedResume {
    pub name: String,
    pub email: String,
    pub mobile_number: String,
    pub headline: String,
    pub skills: Vec<String>,
    pub experiences: Vec<ParsedExperience>,
    pub educations: Vec<ParsedEducation>,
    pub languages: Vec<ParsedLanguage>,
    pub total_years_experience: Option<i32>,
    pub portfolio_url: Option<String>,
    pub linkedin_url: Option<String>,
    #[serde(skip_deserializing)]
    pub parsing_error: Option<String>,
}

impl ParsedResume {
    fn failed(message: String) -> Self {
        ParsedResume {
            parsing_error: Some(message),
            ..Default::default()
        }
    }

    fn sanitized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.email = self.email.trim().to_lowercase();
        self.mobile_number = self.mobile_number.trim().to_string();
        self.headline = self.headline.trim().to_string();
        self.skills = dedup_case_insensitive(self.skills);
        self.experiences
            .retain(|e| !e.company_name.trim().is_empty() || !e.job_role.trim().is_empty());
        for experience in &mut self.experiences {
            if experience.currently_working {
                experience.end_date = None;
            }
            experience.start_date = non_blank(experience.start_date.take());
            experience.end_date = non_blank(experience.end_date.take());
            experience.description = non_blank(experience.description.take());
        }
        self.educations
            .retain(|e| !e.degree_name.trim().is_empty() || !e.institute_name.trim().is_empty());
        self.languages.retain(|l| !l.language_name.trim().is_empty());
        self.total_years_experience = self.total_years_experience.filter(|y| *y >= 0);
        self.portfolio_url = non_blank(self.portfolio_url);
        self.linkedin_url = non_blank(self.linkedin_url);
        self.parsing_error = None;
        self
    }
}

/// Runs the resume flow. Never fails: errors come back in `parsing_error`.
pub async fn parse_resume(model: &dyn CompletionModel, input: &ParseResumeInput) -> ParsedResume {
    let document = match extract_text(&input.resume_data_uri) {
        Ok(document) => document,
        Err(e) => {
            warn!("Resume rejected before model call: {e}");
            return ParsedResume::failed(e.to_string());
        }
    };
    debug!(
        "Resume document accepted ({}, {} bytes)",
        document.mime_type,
        document.text.len()
    );

    let prompt = RESUME_PARSE_PROMPT
        .replace("{extraction_instruction}", EXTRACTION_INSTRUCTION)
        .replace("{document_text}", &document.text);

    match complete_json::<ParsedResume>(model, &prompt, RESUME_PARSE_SYSTEM).await {
        Ok(parsed) => {
            let parsed = parsed.sanitized();
            info!(
                "Parsed resume: {} skills, {} experiences",
                parsed.skills.len(),
                parsed.experiences.len()
            );
            parsed
        }
        Err(e) => {
            warn!("Resume parsing returned no usable output: {e}");
            ParsedResume::failed(NO_MODEL_OUTPUT.to_string())
        }
    }
}
