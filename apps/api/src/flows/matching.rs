//! AI-powered matching in both directions: jobs for a seeker, candidates for a job.
//!
//! The model only ranks ids it was given. Ids it invents, repeats, or echoes
//! back with different spacing are dropped or normalized here.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::flows::prompts::{
    CANDIDATE_MATCHING_PROMPT, CANDIDATE_MATCHING_SYSTEM, JOB_MATCHING_PROMPT,
    JOB_MATCHING_SYSTEM,
};
use crate::flows::NO_MODEL_OUTPUT;
use crate::llm_client::prompts::MATCHING_INSTRUCTION;
use crate::llm_client::{complete_json, CompletionModel};

/// The slice of a job the matcher sees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobForMatching {
    pub id: String,
    pub title: String,
    pub company: String,
    pub description: String,
    pub skills: Vec<String>,
    pub location: String,
    pub job_type: String,
    pub is_remote: bool,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub experience_level: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobMatchInput {
    pub job_seeker_profile: String,
    pub available_jobs: Vec<JobForMatching>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobMatchOutput {
    pub relevant_job_ids: Vec<String>,
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateForMatching {
    pub id: String,
    pub profile: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CandidateMatchInput {
    pub job_description: String,
    pub candidate_profiles: Vec<CandidateForMatching>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateMatchOutput {
    pub relevant_candidate_ids: Vec<String>,
    pub reasoning: String,
}

/// Ranks `available_jobs` for the seeker. Returns an empty match on any failure.
pub async fn match_jobs(model: &dyn CompletionModel, input: &JobMatchInput) -> JobMatchOutput {
    if input.available_jobs.is_empty() {
        return JobMatchOutput {
            relevant_job_ids: vec![],
            reasoning: "There are no open jobs to match against.".to_string(),
        };
    }
    if input.job_seeker_profile.trim().is_empty() {
        return JobMatchOutput {
            relevant_job_ids: vec![],
            reasoning: "Complete your profile to get job recommendations.".to_string(),
        };
    }

    let jobs_json = match serde_json::to_string_pretty(&input.available_jobs) {
        Ok(json) => json,
        Err(e) => {
            warn!("Could not serialize jobs for matching: {e}");
            return JobMatchOutput::default();
        }
    };
    let prompt = JOB_MATCHING_PROMPT
        .replace("{matching_instruction}", MATCHING_INSTRUCTION)
        .replace("{jobs_json}", &jobs_json)
        .replace("{profile}", input.job_seeker_profile.trim());

    match complete_json::<JobMatchOutput>(model, &prompt, JOB_MATCHING_SYSTEM).await {
        Ok(output) => {
            let relevant_job_ids = retain_known_ids(
                output.relevant_job_ids,
                input.available_jobs.iter().map(|j| j.id.as_str()),
            );
            info!(
                "Job matching kept {} of {} jobs",
                relevant_job_ids.len(),
                input.available_jobs.len()
            );
            JobMatchOutput {
                relevant_job_ids,
                reasoning: output.reasoning.trim().to_string(),
            }
        }
        Err(e) => {
            warn!("Job matching returned no usable output: {e}");
            JobMatchOutput {
                relevant_job_ids: vec![],
                reasoning: NO_MODEL_OUTPUT.to_string(),
            }
        }
    }
}

/// Ranks `candidate_profiles` for the job. Returns an empty match on any failure.
pub async fn match_candidates(
    model: &dyn CompletionModel,
    input: &CandidateMatchInput,
) -> CandidateMatchOutput {
    if input.candidate_profiles.is_empty() {
        return CandidateMatchOutput {
            relevant_candidate_ids: vec![],
            reasoning: "There are no searchable candidates to match against.".to_string(),
        };
    }
    if input.job_description.trim().is_empty() {
        return CandidateMatchOutput {
            relevant_candidate_ids: vec![],
            reasoning: "The job description is empty.".to_string(),
        };
    }

    let candidates_json = match serde_json::to_string_pretty(&input.candidate_profiles) {
        Ok(json) => json,
        Err(e) => {
            warn!("Could not serialize candidates for matching: {e}");
            return CandidateMatchOutput::default();
        }
    };
    let prompt = CANDIDATE_MATCHING_PROMPT
        .replace("{matching_instruction}", MATCHING_INSTRUCTION)
        .replace("{candidates_json}", &candidates_json)
        .replace("{job_description}", input.job_description.trim());

    match complete_json::<CandidateMatchOutput>(model, &prompt, CANDIDATE_MATCHING_SYSTEM).await {
        Ok(output) => {
            let relevant_candidate_ids = retain_known_ids(
                output.relevant_candidate_ids,
                input.candidate_profiles.iter().map(|c| c.id.as_str()),
            );
            info!(
                "Candidate matching kept {} of {} candidates",
                relevant_candidate_ids.len(),
                input.candidate_profiles.len()
            );
            CandidateMatchOutput {
                relevant_candidate_ids,
                reasoning: output.reasoning.trim().to_string(),
            }
        }
        Err(e) => {
            warn!("Candidate matching returned no usable output: {e}");
            CandidateMatchOutput {
                relevant_candidate_ids: vec![],
                reasoning: NO_MODEL_OUTPUT.to_string(),
            }
        }
    }
}

/// Keeps the model's order, drops unknown and duplicate ids.
fn retain_known_ids<'a>(returned: Vec<String>, known: impl Iterator<Item = &'a str>) -> Vec<String> {
    let known: Vec<&str> = known.collect();
    let mut kept: Vec<String> = Vec::new();
    for id in returned {
        let id = id.trim();
        if known.contains(&id) && !kept.iter().any(|k| k == id) {
            kept.push(id.to_string());
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedModel;

    fn job(id: &str, title: &str) -> JobForMatching {
        JobForMatching {
            id: id.to_string(),
            title: title.to_string(),
            company: "Acme".to_string(),
            description: String::new(),
            skills: vec!["Rust".to_string()],
            location: "Remote".to_string(),
            job_type: "Full-time".to_string(),
            is_remote: true,
            salary_min: None,
            salary_max: None,
            experience_level: None,
        }
    }

    fn job_input() -> JobMatchInput {
        JobMatchInput {
            job_seeker_profile: "Name: Priya\nSkills: Rust, Go".to_string(),
            available_jobs: vec![job("j1", "Rust Engineer"), job("j2", "Go Engineer")],
        }
    }

    #[tokio::test]
    async fn test_match_jobs_drops_invented_and_duplicate_ids() {
        let model = ScriptedModel::answering(
            r#"{"relevant_job_ids": ["j2", "j9", " j1 ", "j2"], "reasoning": " Strong Rust overlap. "}"#,
        );
        let output = match_jobs(&model, &job_input()).await;
        assert_eq!(output.relevant_job_ids, vec!["j2", "j1"]);
        assert_eq!(output.reasoning, "Strong Rust overlap.");
    }

    #[tokio::test]
    async fn test_match_jobs_prompt_contains_jobs_and_profile() {
        let model = ScriptedModel::answering(r#"{"relevant_job_ids": [], "reasoning": ""}"#);
        match_jobs(&model, &job_input()).await;
        let prompt = model.last_prompt().unwrap();
        assert!(prompt.contains("\"id\": \"j1\""));
        assert!(prompt.ends_with("Skills: Rust, Go"));
    }

    #[tokio::test]
    async fn test_match_jobs_without_jobs_skips_model() {
        let model = ScriptedModel::answering("{}");
        let input = JobMatchInput {
            job_seeker_profile: "Skills: Rust".to_string(),
            available_jobs: vec![],
        };
        let output = match_jobs(&model, &input).await;
        assert_eq!(model.calls(), 0);
        assert!(output.relevant_job_ids.is_empty());
    }

    #[tokio::test]
    async fn test_match_jobs_blank_profile_skips_model() {
        let model = ScriptedModel::answering("{}");
        let input = JobMatchInput {
            job_seeker_profile: "   ".to_string(),
            ..job_input()
        };
        match_jobs(&model, &input).await;
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_match_jobs_failure_is_empty_default() {
        let model = ScriptedModel::failing();
        let output = match_jobs(&model, &job_input()).await;
        assert!(output.relevant_job_ids.is_empty());
        assert_eq!(output.reasoning, NO_MODEL_OUTPUT);
    }

    #[tokio::test]
    async fn test_match_candidates_sanitizes_ids() {
        let model = ScriptedModel::answering(
            r#"```json
            {"relevant_candidate_ids": ["c3", "c1"], "reasoning": "c1 knows Kafka"}
            ```"#,
        );
        let input = CandidateMatchInput {
            job_description: "Kafka engineer".to_string(),
            candidate_profiles: vec![
                CandidateForMatching {
                    id: "c1".to_string(),
                    profile: "Kafka, Java".to_string(),
                },
                CandidateForMatching {
                    id: "c2".to_string(),
                    profile: "Photoshop".to_string(),
                },
            ],
        };
        let output = match_candidates(&model, &input).await;
        assert_eq!(output.relevant_candidate_ids, vec!["c1"]);
    }

    #[tokio::test]
    async fn test_match_candidates_missing_fields_default() {
        let model = ScriptedModel::answering(r#"{"reasoning": "none fit"}"#);
        let input = CandidateMatchInput {
            job_description: "Kafka engineer".to_string(),
            candidate_profiles: vec![CandidateForMatching {
                id: "c1".to_string(),
                profile: "Kafka".to_string(),
            }],
        };
        let output = match_candidates(&model, &input).await;
        assert!(output.relevant_candidate_ids.is_empty());
        assert_eq!(output.reasoning, "none fit");
    }
}
