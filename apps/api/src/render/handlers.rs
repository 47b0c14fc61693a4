//! The PDF export endpoint: forward a document payload to the render service
//! and stream the PDF back with a download filename derived from the
//! document's subject.

use axum::{extract::State, http::header, response::IntoResponse};
use serde::Deserialize;
use serde_json::Value;

use crate::errors::AppError;
use crate::extract::Json;
use crate::render::client::{DocumentKind, RenderRequest};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExportPdfRequest {
    #[serde(rename = "type")]
    pub doc_type: DocumentKind,
    pub data: Value,
    pub template: Option<String>,
}

/// POST /api/v1/export/pdf
pub async fn handle_export_pdf(
    State(state): State<AppState>,
    Json(request): Json<ExportPdfRequest>,
) -> Result<impl IntoResponse, AppError> {
    if request.data.is_null() {
        return Err(AppError::Validation("data is required".to_string()));
    }

    let pdf = state
        .renderer
        .render(&RenderRequest {
            doc_type: request.doc_type,
            data: &request.data,
            template: request.template.as_deref(),
        })
        .await?;

    let filename = export_filename(&subject_name(&request.data), request.doc_type);
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ),
    ];
    Ok((headers, pdf))
}

/// Pulls the display name out of the document payload: resumes carry `name`,
/// cover letters carry the company being applied to.
fn subject_name(data: &Value) -> String {
    for key in ["name", "companyName"] {
        if let Some(s) = data.get(key).and_then(|v| v.as_str()) {
            if !s.trim().is_empty() {
                return s.trim().to_string();
            }
        }
    }
    "document".to_string()
}

/// Builds the download filename: whitespace in the subject collapses to
/// single underscores, suffixed by the document kind.
fn export_filename(subject: &str, doc_type: DocumentKind) -> String {
    let stem = subject.split_whitespace().collect::<Vec<_>>().join("_");
    let stem = if stem.is_empty() { "document" } else { &stem };
    let suffix = match doc_type {
        DocumentKind::Resume => "Resume",
        DocumentKind::CoverLetter => "Cover_Letter",
    };
    format!("{stem}_{suffix}.pdf")
}
