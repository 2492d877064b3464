// AI flows: resume parsing, job description parsing, job/candidate matching,
// profile summaries. Every model call goes through llm_client::CompletionModel.
// Flows never return errors; failures come back as empty defaults.

pub mod document;
pub mod handlers;
pub mod job_description;
pub mod matching;
pub mod profile_text;
pub mod prompts;
pub mod resume;
pub mod summary;

/// Shown when the model answered with nothing parseable.
pub const NO_MODEL_OUTPUT: &str =
    "The AI model did not return a usable result. Please try again or fill in the details manually.";

/// Trims, drops blanks and removes case-insensitive duplicates, keeping first spelling.
pub(crate) fn dedup_case_insensitive(values: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut kept = Vec::new();
    for value in values {
        let value = value.trim().to_string();
        let key = value.to_lowercase();
        if value.is_empty() || seen.contains(&key) {
            continue;
        }
        seen.push(key);
        kept.push(value);
    }
    kept
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
