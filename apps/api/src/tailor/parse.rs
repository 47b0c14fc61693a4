//! Parsing of sanitized model output into typed records, with the documented
//! fallback substitution when the reply does not deserialize. Parsing never
//! fails a flow: a malformed reply degrades, it does not error.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::resume::CoverLetterRecord;

/// Either the parsed target record or the raw-preserving fallback.
///
/// Serialization is untagged: a parsed value serializes as the record itself
/// and the fallback as `{"rawResponse": "..."}`, which is exactly what API
/// callers receive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParseOutcome<T> {
    Structured(T),
    #[serde(rename_all = "camelCase")]
    Raw { raw_response: String },
}

impl<T> ParseOutcome<T> {
    /// True when this outcome is the raw-response fallback.
    pub fn is_raw(&self) -> bool {
        matches!(self, ParseOutcome::Raw { .. })
    }
}

/// Deserializes `sanitized` as `T`, substituting `fallback` when it does not
/// parse. Shape mismatches count as parse failures: a reply that is valid
/// JSON but not the target record also falls back.
pub fn parse_or_fallback<T: DeserializeOwned>(sanitized: &str, fallback: T) -> T {
    match serde_json::from_str(sanitized) {
        Ok(value) => value,
        Err(e) => {
            warn!("Model reply did not parse as the target shape ({e}); using fallback");
            fallback
        }
    }
}

/// The raw-preserving fallback for resume and recommendation parses. The
/// text is kept verbatim so a human can still recover what the model said.
pub fn raw_fallback<T>(sanitized: &str) -> ParseOutcome<T> {
    ParseOutcome::Raw {
        raw_response: sanitized.to_string(),
    }
}

/// The fixed fallback for cover letter parses: a generic but structurally
/// complete letter with today's date and placeholder recipient fields.
/// Letter consumers render every field, so unlike resumes the fallback is a
/// usable template rather than a raw blob.
pub fn fallback_cover_letter() -> CoverLetterRecord {
    CoverLetterRecord {
        recipient_name: "Hiring Manager".to_string(),
        recipient_title: "Talent Acquisition".to_string(),
        company_name: "your company".to_string(),
        content: GENERIC_LETTER_BODY.to_string(),
        date: Utc::now().format("%Y-%m-%d").to_string(),
    }
}

const GENERIC_LETTER_BODY: &str = "Dear Hiring Manager,\n\n\
    I am writing to express my strong interest in the open position at your \
    company. My background and experience align closely with what the role \
    calls for, and I am confident I can contribute from day one.\n\n\
    I would welcome the chance to discuss how my skills match your needs in \
    more detail. Thank you for your time and consideration.\n\n\
    Sincerely";
