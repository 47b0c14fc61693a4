//! Wire-facing resume, cover letter, and recommendation records.
//!
//! These shapes are shared verbatim with the generative model (embedded in
//! prompts, parsed back out of replies) and with API callers, so the
//! camelCase JSON layout is part of the contract. Deserialization is lenient
//! where a missing field still leaves a usable record, and strict where it
//! does not: see the field notes below.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The canonical resume representation flowing through the tailoring
/// pipeline: API input, prompt context, and parsed model output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub linkedin: String,
    #[serde(default)]
    pub github: String,
    #[serde(default)]
    pub summary: String,
    /// Category name mapped to an ordered skill list. Map semantics keep
    /// category names unique; list order within a category is preserved.
    #[serde(default)]
    pub skills: BTreeMap<String, Vec<String>>,
    /// Entry order is meaningful and must survive tailoring verbatim.
    /// Deliberately not defaulted: a model reply without an experience array
    /// is not a usable resume and must take the raw-response fallback path.
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub projects: Vec<Project>,
    /// Model-written note describing what the tailoring changed.
    #[serde(default)]
    pub change_summary: String,
}

impl ResumeRecord {
    /// True when the record carries nothing a tailoring prompt could use.
    pub fn is_empty(&self) -> bool {
        self.name.trim().is_empty()
            && self.summary.trim().is_empty()
            && self.experience.is_empty()
            && self.skills.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub school: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub year: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub link: Link,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub href: String,
}

/// A generated cover letter. Parsing is strict: letter consumers render
/// every field, so a reply missing any of them falls back to the generic
/// template instead of producing a half-empty letter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverLetterRecord {
    pub recipient_name: String,
    pub recipient_title: String,
    pub company_name: String,
    /// Letter body; paragraphs separated by a blank line (`\n\n`).
    pub content: String,
    /// ISO date, `YYYY-MM-DD`.
    pub date: String,
}

/// Improvement recommendations for a resume, as reviewed by the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationReport {
    #[serde(default)]
    pub change_summary: String,
    /// Required on deserialize so an arbitrary JSON object is not mistaken
    /// for a report.
    pub recommendations: Vec<String>,
}
