//! Client for the external PDF render service (a headless-browser renderer).
//! It receives a document payload and returns the finished PDF bytes.

use bytes::Bytes;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::errors::AppError;

/// Cap on a single render round-trip. A wedged renderer must surface as a
/// render error, not hang the export request.
const RENDER_TIMEOUT_SECS: u64 = 30;

/// Document kinds the renderer accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentKind {
    Resume,
    CoverLetter,
}

/// Payload posted to the render service.
#[derive(Debug, Serialize)]
pub struct RenderRequest<'a> {
    #[serde(rename = "type")]
    pub doc_type: DocumentKind,
    pub data: &'a Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<&'a str>,
}

#[derive(Clone)]
pub struct RenderClient {
    client: Client,
    base_url: String,
}

impl RenderClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(RENDER_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            base_url,
        }
    }

    /// Renders a document to PDF. A non-success reply or an empty body is a
    /// render error.
    pub async fn render(&self, request: &RenderRequest<'_>) -> Result<Bytes, AppError> {
        let url = format!("{}/render", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::Render(format!("Render service unreachable: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Render(format!(
                "Render service returned {status}: {body}"
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::Render(format!("Failed to read rendered PDF: {e}")))?;
        if bytes.is_empty() {
            return Err(AppError::Render(
                "Render service returned an empty document".to_string(),
            ));
        }

        debug!("Rendered {} bytes of PDF", bytes.len());
        Ok(bytes)
    }
}
