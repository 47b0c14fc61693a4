pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::jobs::handlers as jobs;
use crate::render::handlers as render;
use crate::state::AppState;
use crate::tailor::handlers as tailor;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Tailoring pipeline
        .route("/api/v1/tailor/resume", post(tailor::handle_tailor_resume))
        .route(
            "/api/v1/tailor/cover-letter",
            post(tailor::handle_tailor_cover_letter),
        )
        .route(
            "/api/v1/tailor/application",
            post(tailor::handle_tailor_application),
        )
        .route(
            "/api/v1/tailor/recommendations",
            post(tailor::handle_recommendations),
        )
        // Jobs API (worker handoff)
        .route(
            "/api/v1/jobs",
            post(jobs::handle_create_job).get(jobs::handle_list_jobs),
        )
        .route(
            "/api/v1/jobs/:id",
            get(jobs::handle_get_job).patch(jobs::handle_update_job),
        )
        .route("/api/v1/jobs/:id/requeue", post(jobs::handle_requeue_job))
        // PDF export
        .route("/api/v1/export/pdf", post(render::handle_export_pdf))
        .with_state(state)
}
