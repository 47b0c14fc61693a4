//! Flow orchestration: validate input, build the prompt, call the model,
//! sanitize, parse with fallback, return a typed record.
//!
//! Flows never surface a parse failure. A malformed model reply degrades to
//! the documented fallback and the call still succeeds; only missing input
//! (a client error) and a failed generation call (a server error) abort.

use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::TextGenerator;
use crate::models::resume::{CoverLetterRecord, RecommendationReport, ResumeRecord};
use crate::tailor::parse::{fallback_cover_letter, parse_or_fallback, raw_fallback, ParseOutcome};
use crate::tailor::prompts::{
    build_cover_letter_prompt, build_recommendations_prompt, build_resume_prompt,
};
use crate::tailor::sanitize::sanitize;

/// Extra attempts when a parsed resume violates the experience contract.
const MAX_ORDER_RETRIES: u32 = 2;

/// Minimum bullets per experience entry after tailoring. Enforced by the
/// prompt; violations are logged, not rejected.
const MIN_BULLETS: usize = 3;

/// Output of the chained flow: both documents, produced in order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationBundle {
    pub resume: ParseOutcome<ResumeRecord>,
    pub cover_letter: CoverLetterRecord,
}

// ────────────────────────────────────────────────────────────────────────────
// Flows
// ────────────────────────────────────────────────────────────────────────────

/// Tailors `resume` to `job_description`.
///
/// The parsed reply must keep the experience list unchanged in count and
/// company order. A reply that restructures it is discarded and retried; if
/// the model keeps violating the contract the flow degrades to the raw
/// fallback rather than returning a silently reshaped resume.
pub async fn tailor_resume(
    generator: &dyn TextGenerator,
    resume: Option<&ResumeRecord>,
    job_description: &str,
) -> Result<ParseOutcome<ResumeRecord>, AppError> {
    let resume = require_resume(resume)?;
    require_job_description(job_description)?;

    info!(
        "Tailoring resume ({} experience entries) to a {}-char job description",
        resume.experience.len(),
        job_description.len()
    );

    let prompt = build_resume_prompt(resume, job_description)?;

    let mut last_clean = String::new();
    for attempt in 0..=MAX_ORDER_RETRIES {
        let raw = generator
            .generate(&prompt, true)
            .await
            .map_err(|e| AppError::Generation(format!("Resume tailoring call failed: {e}")))?;
        let clean = sanitize(&raw);

        match parse_or_fallback(&clean, raw_fallback(&clean)) {
            ParseOutcome::Structured(tailored) => {
                if preserves_experience_order(resume, &tailored) {
                    warn_on_thin_bullets(&tailored);
                    return Ok(ParseOutcome::Structured(tailored));
                }
                warn!(
                    "Tailored resume changed the experience list (attempt {}/{})",
                    attempt + 1,
                    MAX_ORDER_RETRIES + 1
                );
            }
            raw_outcome @ ParseOutcome::Raw { .. } => return Ok(raw_outcome),
        }
        last_clean = clean;
    }

    warn!("Experience order still violated after retries; returning raw reply");
    Ok(raw_fallback(&last_clean))
}

/// Writes a cover letter for `job_description` from `resume`.
pub async fn tailor_cover_letter(
    generator: &dyn TextGenerator,
    resume: Option<&ResumeRecord>,
    job_description: &str,
) -> Result<CoverLetterRecord, AppError> {
    let resume = require_resume(resume)?;
    let context = ParseOutcome::Structured(resume.clone());
    cover_letter_with_context(generator, &context, job_description).await
}

/// Runs the chained flow: tailor the resume, then write the cover letter
/// from whatever the resume step produced. A resume parse fallback does not
/// abort the letter; the raw text is still usable context. Only a failed
/// generation call aborts the chain.
pub async fn tailor_application(
    generator: &dyn TextGenerator,
    resume: Option<&ResumeRecord>,
    job_description: &str,
) -> Result<ApplicationBundle, AppError> {
    let tailored = tailor_resume(generator, resume, job_description).await?;
    if tailored.is_raw() {
        info!("Resume step fell back to raw text; writing cover letter from raw context");
    }
    let cover_letter = cover_letter_with_context(generator, &tailored, job_description).await?;
    Ok(ApplicationBundle {
        resume: tailored,
        cover_letter,
    })
}

/// Reviews `resume` and returns improvement recommendations.
pub async fn recommend_improvements(
    generator: &dyn TextGenerator,
    resume: Option<&ResumeRecord>,
) -> Result<ParseOutcome<RecommendationReport>, AppError> {
    let resume = require_resume(resume)?;

    let prompt = build_recommendations_prompt(resume)?;
    let raw = generator
        .generate(&prompt, true)
        .await
        .map_err(|e| AppError::Generation(format!("Recommendations call failed: {e}")))?;
    let clean = sanitize(&raw);

    Ok(parse_or_fallback(&clean, raw_fallback(&clean)))
}

async fn cover_letter_with_context(
    generator: &dyn TextGenerator,
    resume_context: &ParseOutcome<ResumeRecord>,
    job_description: &str,
) -> Result<CoverLetterRecord, AppError> {
    require_job_description(job_description)?;

    let prompt = build_cover_letter_prompt(resume_context, job_description)?;
    let raw = generator
        .generate(&prompt, true)
        .await
        .map_err(|e| AppError::Generation(format!("Cover letter call failed: {e}")))?;
    let clean = sanitize(&raw);

    Ok(parse_or_fallback(&clean, fallback_cover_letter()))
}

// ────────────────────────────────────────────────────────────────────────────
// Validation and contract checks
// ────────────────────────────────────────────────────────────────────────────

fn require_resume(resume: Option<&ResumeRecord>) -> Result<&ResumeRecord, AppError> {
    let resume =
        resume.ok_or_else(|| AppError::Validation("resumeData is required".to_string()))?;
    if resume.is_empty() {
        return Err(AppError::Validation("resumeData is empty".to_string()));
    }
    Ok(resume)
}

fn require_job_description(job_description: &str) -> Result<(), AppError> {
    if job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "jobDescription cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// The experience contract: same entry count, same companies, same order.
/// Titles, bullets, and wording may change; the list itself may not.
fn preserves_experience_order(base: &ResumeRecord, tailored: &ResumeRecord) -> bool {
    base.experience.len() == tailored.experience.len()
        && base
            .experience
            .iter()
            .zip(tailored.experience.iter())
            .all(|(b, t)| b.company == t.company)
}

fn warn_on_thin_bullets(tailored: &ResumeRecord) {
    for entry in &tailored.experience {
        if entry.bullets.len() < MIN_BULLETS {
            warn!(
                "Tailored entry for '{}' has {} bullets, below the {} the prompt asks for",
                entry.company,
                entry.bullets.len(),
                MIN_BULLETS
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Scripted generator double: hands out canned replies in order and
    /// counts calls. An exhausted script fails like a dead API.
    struct ScriptedGenerator {
        replies: Mutex<Vec<String>>,
        calls: AtomicUsize,
    }

    impl ScriptedGenerator {
        fn new(replies: Vec<String>) -> Self {
            Self {
                replies: Mutex::new(replies),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, _prompt: &str, _structured: bool) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                return Err(LlmError::EmptyContent);
            }
            Ok(replies.remove(0))
        }
    }

    fn base_resume() -> ResumeRecord {
        use crate::models::resume::Experience;
        ResumeRecord {
            name: "Ada Lovelace".to_string(),
            title: "Backend Engineer".to_string(),
            summary: "Engineer with a systems background.".to_string(),
            experience: vec![
                Experience {
                    title: "Senior Engineer".to_string(),
                    company: "Acme Corp".to_string(),
                    period: "2022 - Present".to_string(),
                    location: "Remote".to_string(),
                    bullets: vec![
                        "Built internal services".to_string(),
                        "Ran the on-call rotation".to_string(),
                        "Mentored juniors".to_string(),
                    ],
                },
                Experience {
                    title: "Engineer".to_string(),
                    company: "Initech".to_string(),
                    period: "2019 - 2022".to_string(),
                    location: "Austin, TX".to_string(),
                    bullets: vec![
                        "Maintained the billing system".to_string(),
                        "Migrated reports to the new stack".to_string(),
                        "Wrote integration tests".to_string(),
                    ],
                },
            ],
            ..Default::default()
        }
    }

    /// A well-formed tailored reply: same companies in the same order,
    /// three bullets each, changeSummary filled in.
    fn tailored_reply() -> String {
        let mut tailored = base_resume();
        tailored.summary = "Backend engineer focused on reliable services in Rust.".to_string();
        for entry in &mut tailored.experience {
            entry.bullets = vec![
                "Designed fault-tolerant backend services".to_string(),
                "Cut deploy times in half".to_string(),
                "Led incident reviews".to_string(),
            ];
        }
        tailored.change_summary = "Rewrote summary and bullets for the backend role.".to_string();
        serde_json::to_string(&tailored).unwrap()
    }

    /// Same content, but with the two experience entries swapped.
    fn reordered_reply() -> String {
        let mut tailored: ResumeRecord = serde_json::from_str(&tailored_reply()).unwrap();
        tailored.experience.reverse();
        serde_json::to_string(&tailored).unwrap()
    }

    fn cover_letter_reply() -> String {
        serde_json::to_string(&CoverLetterRecord {
            recipient_name: "Jane Smith".to_string(),
            recipient_title: "Engineering Manager".to_string(),
            company_name: "Acme Corp".to_string(),
            content: "Dear Jane,\n\nI am excited to apply.\n\nSincerely".to_string(),
            date: "2026-08-12".to_string(),
        })
        .unwrap()
    }

    const JD: &str = "Senior Backend Engineer at Acme Corp. Rust, Postgres, and Kubernetes.";

    #[tokio::test]
    async fn test_missing_resume_short_circuits_without_calling_model() {
        let generator = ScriptedGenerator::new(vec![tailored_reply()]);
        let result = tailor_resume(&generator, None, JD).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_job_description_short_circuits() {
        let generator = ScriptedGenerator::new(vec![tailored_reply()]);
        let resume = base_resume();
        let result = tailor_resume(&generator, Some(&resume), "   \n  ").await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_resume_record_is_rejected() {
        let generator = ScriptedGenerator::new(vec![tailored_reply()]);
        let resume = ResumeRecord::default();
        let result = tailor_resume(&generator, Some(&resume), JD).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_tailor_resume_end_to_end() {
        let generator = ScriptedGenerator::new(vec![tailored_reply()]);
        let resume = base_resume();

        let outcome = tailor_resume(&generator, Some(&resume), JD).await.unwrap();

        match outcome {
            ParseOutcome::Structured(tailored) => {
                assert_eq!(tailored.experience.len(), 2);
                for entry in &tailored.experience {
                    assert!(entry.bullets.len() >= 3);
                }
                assert!(!tailored.change_summary.is_empty());
            }
            ParseOutcome::Raw { .. } => panic!("well-formed reply must parse"),
        }
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_malformed_reply_degrades_to_raw_fallback() {
        let generator =
            ScriptedGenerator::new(vec!["I am sorry, I cannot help with that.".to_string()]);
        let resume = base_resume();

        let outcome = tailor_resume(&generator, Some(&resume), JD).await.unwrap();

        assert_eq!(
            outcome,
            ParseOutcome::Raw {
                raw_response: "I am sorry, I cannot help with that.".to_string()
            }
        );
        // Parse failures are not retried; the fallback is the answer.
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_fenced_reply_is_sanitized_before_parsing() {
        let fenced = format!("```json\n{}\n```", tailored_reply());
        let generator = ScriptedGenerator::new(vec![fenced]);
        let resume = base_resume();

        let outcome = tailor_resume(&generator, Some(&resume), JD).await.unwrap();
        assert!(!outcome.is_raw());
    }

    #[tokio::test]
    async fn test_reordered_experience_is_retried_then_recovers() {
        let generator = ScriptedGenerator::new(vec![reordered_reply(), tailored_reply()]);
        let resume = base_resume();

        let outcome = tailor_resume(&generator, Some(&resume), JD).await.unwrap();

        match outcome {
            ParseOutcome::Structured(tailored) => {
                assert_eq!(tailored.experience[0].company, "Acme Corp");
                assert_eq!(tailored.experience[1].company, "Initech");
            }
            ParseOutcome::Raw { .. } => panic!("second reply was valid"),
        }
        assert_eq!(generator.call_count(), 2);
    }

    #[tokio::test]
    async fn test_persistent_reordering_degrades_to_raw() {
        let reordered = reordered_reply();
        let generator =
            ScriptedGenerator::new(vec![reordered.clone(), reordered.clone(), reordered]);
        let resume = base_resume();

        let outcome = tailor_resume(&generator, Some(&resume), JD).await.unwrap();

        assert!(outcome.is_raw());
        assert_eq!(generator.call_count(), 1 + MAX_ORDER_RETRIES as usize);
    }

    #[tokio::test]
    async fn test_generation_failure_aborts_flow() {
        // Empty script: every call errors like a dead API.
        let generator = ScriptedGenerator::new(vec![]);
        let resume = base_resume();

        let result = tailor_resume(&generator, Some(&resume), JD).await;
        assert!(matches!(result, Err(AppError::Generation(_))));
    }

    #[tokio::test]
    async fn test_cover_letter_flow_parses_reply() {
        let generator = ScriptedGenerator::new(vec![cover_letter_reply()]);
        let resume = base_resume();

        let letter = tailor_cover_letter(&generator, Some(&resume), JD)
            .await
            .unwrap();
        assert_eq!(letter.recipient_name, "Jane Smith");
        assert_eq!(letter.company_name, "Acme Corp");
    }

    #[tokio::test]
    async fn test_cover_letter_falls_back_to_template() {
        let generator = ScriptedGenerator::new(vec!["no json here".to_string()]);
        let resume = base_resume();

        let letter = tailor_cover_letter(&generator, Some(&resume), JD)
            .await
            .unwrap();
        assert_eq!(letter.recipient_name, "Hiring Manager");
        assert!(!letter.content.is_empty());
        assert!(!letter.date.is_empty());
    }

    #[tokio::test]
    async fn test_chained_flow_happy_path() {
        let generator = ScriptedGenerator::new(vec![tailored_reply(), cover_letter_reply()]);
        let resume = base_resume();

        let bundle = tailor_application(&generator, Some(&resume), JD)
            .await
            .unwrap();

        assert!(!bundle.resume.is_raw());
        assert_eq!(bundle.cover_letter.recipient_name, "Jane Smith");
        assert_eq!(generator.call_count(), 2);
    }

    #[tokio::test]
    async fn test_chained_flow_survives_resume_fallback() {
        // Resume reply is garbage; the letter is still written, from the raw
        // context, and still comes back structurally complete.
        let generator = ScriptedGenerator::new(vec!["garbled".to_string(), cover_letter_reply()]);
        let resume = base_resume();

        let bundle = tailor_application(&generator, Some(&resume), JD)
            .await
            .unwrap();

        assert!(bundle.resume.is_raw());
        assert_eq!(bundle.cover_letter.company_name, "Acme Corp");
        assert_eq!(generator.call_count(), 2);
    }

    #[tokio::test]
    async fn test_chained_flow_complete_under_double_failure() {
        let generator =
            ScriptedGenerator::new(vec!["garbled".to_string(), "also garbled".to_string()]);
        let resume = base_resume();

        let bundle = tailor_application(&generator, Some(&resume), JD)
            .await
            .unwrap();

        assert!(bundle.resume.is_raw());
        let letter = &bundle.cover_letter;
        assert!(!letter.recipient_name.is_empty());
        assert!(!letter.recipient_title.is_empty());
        assert!(!letter.company_name.is_empty());
        assert!(!letter.content.is_empty());
        assert!(!letter.date.is_empty());
    }

    #[tokio::test]
    async fn test_recommendations_flow() {
        let report = serde_json::json!({
            "changeSummary": "Solid base",
            "recommendations": [
                "Quantify the billing migration",
                "Add a metrics bullet",
                "Tighten the summary"
            ]
        })
        .to_string();
        let generator = ScriptedGenerator::new(vec![report]);
        let resume = base_resume();

        let outcome = recommend_improvements(&generator, Some(&resume))
            .await
            .unwrap();

        match outcome {
            ParseOutcome::Structured(report) => {
                assert_eq!(report.recommendations.len(), 3);
                assert_eq!(report.change_summary, "Solid base");
            }
            ParseOutcome::Raw { .. } => panic!("valid report must parse"),
        }
    }

    #[tokio::test]
    async fn test_recommendations_require_resume() {
        let generator = ScriptedGenerator::new(vec![]);
        let result = recommend_improvements(&generator, None).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(generator.call_count(), 0);
    }

    #[test]
    fn test_experience_order_check() {
        let base = base_resume();

        let same = base.clone();
        assert!(preserves_experience_order(&base, &same));

        let mut swapped = base.clone();
        swapped.experience.reverse();
        assert!(!preserves_experience_order(&base, &swapped));

        let mut truncated = base.clone();
        truncated.experience.pop();
        assert!(!preserves_experience_order(&base, &truncated));

        // Retitled entries at the same companies are fine.
        let mut retitled = base.clone();
        retitled.experience[0].title = "Staff Engineer".to_string();
        assert!(preserves_experience_order(&base, &retitled));
    }
}
