use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::flows::prompts::{PROFILE_SUMMARY_PROMPT, PROFILE_SUMMARY_SYSTEM};
use crate::llm_client::{complete_json, CompletionModel};

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileSummaryInput {
    pub profile_details: String,
    pub target_role: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileSummaryOutput {
    pub summary: String,
}

/// Generates a short first-person summary. An empty summary signals failure.
pub async fn generate_profile_summary(
    model: &dyn CompletionModel,
    input: &ProfileSummaryInput,
) -> ProfileSummaryOutput {
    if input.profile_details.trim().is_empty() {
        return ProfileSummaryOutput::default();
    }

    let target = match input.target_role.as_deref().map(str::trim) {
        Some(role) if !role.is_empty() => {
            format!("Tailor the summary towards this target role or company: {role}.")
        }
        _ => String::new(),
    };
    let prompt = PROFILE_SUMMARY_PROMPT
        .replace("{target}", &target)
        .replace("{profile}", input.profile_details.trim());

    match complete_json::<ProfileSummaryOutput>(model, &prompt, PROFILE_SUMMARY_SYSTEM).await {
        Ok(output) => ProfileSummaryOutput {
            summary: output.summary.trim().to_string(),
        },
        Err(e) => {
            warn!("Profile summary returned no usable output: {e}");
            ProfileSummaryOutput::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedModel;

    #[tokio::test]
    async fn test_summary_trimmed() {
        let model = ScriptedModel::answering(r#"{"summary": "  I build payment systems in Rust.  "}"#);
        let input = ProfileSummaryInput {
            profile_details: "Skills: Rust".to_string(),
            target_role: Some("Stripe".to_string()),
        };
        let output = generate_profile_summary(&model, &input).await;
        assert_eq!(output.summary, "I build payment systems in Rust.");
        assert!(model.last_prompt().unwrap().contains("target role or company: Stripe."));
    }

    #[tokio::test]
    async fn test_no_target_leaves_no_placeholder() {
        let model = ScriptedModel::answering(r#"{"summary": "x"}"#);
        let input = ProfileSummaryInput {
            profile_details: "Skills: Rust".to_string(),
            target_role: None,
        };
        generate_profile_summary(&model, &input).await;
        let prompt = model.last_prompt().unwrap();
        assert!(!prompt.contains("{target}"));
        assert!(!prompt.contains("Tailor"));
    }

    #[tokio::test]
    async fn test_empty_profile_skips_model() {
        let model = ScriptedModel::answering(r#"{"summary": "x"}"#);
        let input = ProfileSummaryInput {
            profile_details: String::new(),
            target_role: None,
        };
        let output = generate_profile_summary(&model, &input).await;
        assert_eq!(model.calls(), 0);
        assert!(output.summary.is_empty());
    }

    #[tokio::test]
    async fn test_failure_yields_empty_summary() {
        let model = ScriptedModel::failing();
        let input = ProfileSummaryInput {
            profile_details: "Skills: Rust".to_string(),
            target_role: None,
        };
        assert!(generate_profile_summary(&model, &input).await.summary.is_empty());
    }
}
