//! Prompt construction for the tailoring flows. One builder per request
//! kind; templates are consts with `{placeholder}` markers.
//!
//! Builders are deterministic: identical inputs produce byte-identical
//! prompts. No clock and no randomness go into a prompt; the cover letter's
//! date is written by the model, not by us. Hard constraints are repeated at
//! the end of every template because trailing instructions are the ones
//! models weigh most.

use crate::errors::AppError;
use crate::models::resume::ResumeRecord;
use crate::tailor::parse::ParseOutcome;

/// Tailor-resume prompt. Placeholders: {resume_json}, {job_description}.
const RESUME_PROMPT_TEMPLATE: &str = r#"Act as an expert resume writer. Rewrite the resume below so it speaks directly to the job description, without inventing anything.

CURRENT RESUME (JSON):
{resume_json}

JOB DESCRIPTION:
{job_description}

YOUR TASK:
1. Rewrite the summary to target this job. Keep it under 50 words.
2. Rewrite each experience entry's bullets to emphasize achievements relevant to this job, using the posting's vocabulary where it is honest to do so.
3. Reorganize the skills section so the categories and skills this job cares about stand out. Do not add skills the candidate does not have.
4. Leave education and projects exactly as given.
5. Write a short changeSummary describing what you changed and why.

OUTPUT SHAPE:
Respond with a single JSON object with exactly the same layout as the CURRENT RESUME above: name, title, location, email, phone, linkedin, github, summary, skills (object mapping category name to a list of skills), experience (list of objects with title, company, period, location, bullets), education, projects, changeSummary.

HARD RULES (these override everything above):
- Do NOT alter the field layout: same keys, same nesting, same types.
- Do NOT fabricate experience, employers, dates, tools, or numbers that are not in the current resume.
- Do NOT reorder, add, or remove experience entries: same count, same companies, same order.
- Write in the language of the job posting.
- Every experience entry keeps at least 3 bullets.
- Keep the summary under 50 words.
- Output the JSON object only: no prose, no markdown code fences."#;

/// Tailor-cover-letter prompt. Placeholders: {resume_json}, {job_description}.
/// The resume block may be a structured record or a raw-response fallback
/// from a failed resume parse; either way it is context, not output.
const COVER_LETTER_PROMPT_TEMPLATE: &str = r#"Act as an expert cover letter writer. Write a cover letter for the candidate below, tailored to the job description.

CANDIDATE RESUME (JSON):
{resume_json}

JOB DESCRIPTION:
{job_description}

YOUR TASK:
1. Address the letter to the hiring contact if the job description names one, otherwise to "Hiring Manager".
2. Open with the role being applied for and one sentence on why the candidate fits.
3. In one or two body paragraphs, connect the candidate's strongest relevant experience to the posting's stated needs. Use only facts from the resume.
4. Close with a short, confident paragraph inviting next steps.
5. Set date to today's date in YYYY-MM-DD format.

OUTPUT SHAPE:
Respond with a single JSON object: {"recipientName": "...", "recipientTitle": "...", "companyName": "...", "content": "...", "date": "YYYY-MM-DD"}.
Separate paragraphs inside content with a blank line ("\n\n").

HARD RULES (these override everything above):
- Do NOT invent employers, achievements, or qualifications that are not in the resume.
- Write in the language of the job posting.
- Keep the letter between 150 and 300 words.
- content holds the letter body only: no JSON, no markdown, no signature block beyond the candidate's name.
- Output the JSON object only: no prose, no markdown code fences."#;

/// Get-recommendations prompt. Placeholder: {resume_json}.
const RECOMMENDATIONS_PROMPT_TEMPLATE: &str = r#"Act as a hiring manager reviewing the resume below. Identify what would make it stronger.

RESUME (JSON):
{resume_json}

YOUR TASK:
1. Judge the resume the way a hiring manager screening candidates would: clarity, evidence of impact, and how well the skills section reads.
2. List concrete, actionable improvements: wording to tighten, achievements to quantify, gaps to address.
3. Summarize your overall assessment in changeSummary.

OUTPUT SHAPE:
Respond with a single JSON object: {"changeSummary": "...", "recommendations": ["...", "..."]}.

HARD RULES (these override everything above):
- Each recommendation is one specific, self-contained sentence.
- Give between 3 and 8 recommendations.
- Do NOT rewrite the resume; only recommend.
- Output the JSON object only: no prose, no markdown code fences."#;

/// Builds the tailor-resume prompt from the base resume and the job
/// description (inlined verbatim).
pub fn build_resume_prompt(
    resume: &ResumeRecord,
    job_description: &str,
) -> Result<String, AppError> {
    let resume_json = to_pretty_json(resume)?;
    Ok(RESUME_PROMPT_TEMPLATE
        .replace("{resume_json}", &resume_json)
        .replace("{job_description}", job_description))
}

/// Builds the cover-letter prompt. `resume_context` is whatever the resume
/// step produced, so a raw-response fallback still flows through as context.
pub fn build_cover_letter_prompt(
    resume_context: &ParseOutcome<ResumeRecord>,
    job_description: &str,
) -> Result<String, AppError> {
    let resume_json = to_pretty_json(resume_context)?;
    Ok(COVER_LETTER_PROMPT_TEMPLATE
        .replace("{resume_json}", &resume_json)
        .replace("{job_description}", job_description))
}

/// Builds the get-recommendations prompt from the resume alone.
pub fn build_recommendations_prompt(resume: &ResumeRecord) -> Result<String, AppError> {
    let resume_json = to_pretty_json(resume)?;
    Ok(RECOMMENDATIONS_PROMPT_TEMPLATE.replace("{resume_json}", &resume_json))
}

fn to_pretty_json<T: serde::Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize prompt context: {e}")))
}
