use std::sync::Arc;

use sqlx::PgPool;

use crate::jobs::queue::JobQueue;
use crate::llm_client::TextGenerator;
use crate::render::client::RenderClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Queue handoff to the external tailoring worker, on one shared
    /// connection established at startup.
    pub queue: Arc<dyn JobQueue>,
    /// Generation client behind the trait seam so tests can script replies.
    pub generator: Arc<dyn TextGenerator>,
    pub renderer: RenderClient,
}
