// Prompt templates for every AI flow.
// Placeholders are `{name}` and are filled with `str::replace`; the untrusted
// document or profile text is always substituted last.

pub const RESUME_PARSE_SYSTEM: &str = "You are an expert resume parser for a job board. \
    Extract structured candidate information from resume text. \
    You MUST respond with valid JSON only. No markdown fences, no explanations.";

/// Replace: {extraction_instruction}, {document_text}
pub const RESUME_PARSE_PROMPT: &str = r#"Extract the candidate's details from the resume below.

Return a JSON object with this EXACT schema:
{
  "name": "string",
  "email": "string",
  "mobile_number": "string",
  "headline": "short professional headline, e.g. 'Senior Backend Engineer'",
  "skills": ["string"],
  "experiences": [
    {
      "company_name": "string",
      "job_role": "string",
      "start_date": "YYYY-MM-DD" | null,
      "end_date": "YYYY-MM-DD" | null,
      "currently_working": true | false,
      "description": "string" | null
    }
  ],
  "educations": [
    {
      "level": "Graduate" | "Post Graduate" | "Doctorate" | "Diploma" | "12th" | "10th",
      "degree_name": "string",
      "institute_name": "string",
      "specialization": "string" | null,
      "start_year": number | null,
      "end_year": number | null
    }
  ],
  "languages": [
    {"language_name": "string", "proficiency": "Beginner" | "Intermediate" | "Fluent" | "Native"}
  ],
  "total_years_experience": number | null,
  "portfolio_url": "string" | null,
  "linkedin_url": "string" | null
}

RULES:
1. Dates must be "YYYY-MM-DD". Use "YYYY-MM-01" if only month and year are known, "YYYY-01-01" if only the year is known.
2. List skills individually: split "Rust/Go/Python" into three entries.
3. total_years_experience is the sum of non-overlapping work periods, rounded down.
4. {extraction_instruction}

RESUME:
{document_text}"#;

pub const JOB_DESCRIPTION_PARSE_SYSTEM: &str =
    "You are an expert recruiter who turns job descriptions into structured postings. \
    You MUST respond with valid JSON only. No markdown fences, no explanations.";

/// Replace: {extraction_instruction}, {job_types}, {experience_levels}, {document_text}
pub const JOB_DESCRIPTION_PARSE_PROMPT: &str = r#"Extract a structured job posting from the job description below.

Return a JSON object with this EXACT schema:
{
  "title": "string",
  "description": "string: a concise overview of the role",
  "skills": ["string"],
  "location": "string",
  "job_type": one of {job_types} | null,
  "is_remote": true | false,
  "salary_min": number | null,
  "salary_max": number | null,
  "industry": "string" | null,
  "department": "string" | null,
  "experience_level": one of {experience_levels} | null,
  "min_experience_years": number | null,
  "max_experience_years": number | null,
  "responsibilities": "string" | null,
  "requirements": "string" | null,
  "benefits": "string" | null
}

RULES:
1. Salaries are annual amounts as plain numbers, without currency symbols or separators.
2. Responsibilities, requirements and benefits keep their bullet structure as newline-separated text.
3. {extraction_instruction}

JOB DESCRIPTION:
{document_text}"#;

pub const JOB_MATCHING_SYSTEM: &str =
    "You are a career advisor matching a job seeker to open positions. \
    You MUST respond with valid JSON only. No markdown fences, no explanations.";

/// Replace: {matching_instruction}, {jobs_json}, {profile}
pub const JOB_MATCHING_PROMPT: &str = r#"Identify the jobs that best fit the job seeker below.

Consider skills overlap, years and kind of experience, location and remote preference,
expected salary versus advertised pay, and seniority.

Return a JSON object:
{
  "relevant_job_ids": ["id"],
  "reasoning": "two or three sentences explaining the strongest matches"
}

{matching_instruction}

AVAILABLE JOBS:
{jobs_json}

JOB SEEKER PROFILE:
{profile}"#;

pub const CANDIDATE_MATCHING_SYSTEM: &str =
    "You are a technical recruiter shortlisting candidates for an open position. \
    You MUST respond with valid JSON only. No markdown fences, no explanations.";

/// Replace: {matching_instruction}, {candidates_json}, {job_description}
pub const CANDIDATE_MATCHING_PROMPT: &str = r#"Identify the candidates who best fit the job below.

Weigh required skills most heavily, then relevant experience, then location and availability.

Return a JSON object:
{
  "relevant_candidate_ids": ["id"],
  "reasoning": "two or three sentences explaining the strongest matches"
}

{matching_instruction}

CANDIDATES:
{candidates_json}

JOB DESCRIPTION:
{job_description}"#;

pub const PROFILE_SUMMARY_SYSTEM: &str =
    "You are a professional resume writer. Write in the first person, plainly, without buzzwords. \
    You MUST respond with valid JSON only. No markdown fences, no explanations.";

/// Replace: {target}, {profile}
pub const PROFILE_SUMMARY_PROMPT: &str = r#"Write a professional summary of 3 to 5 sentences for the job seeker below.
{target}
Only mention skills, employers and achievements present in the profile.

Return a JSON object:
{
  "summary": "string"
}

PROFILE:
{profile}"#;
