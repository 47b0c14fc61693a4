mod config;
mod db;
mod errors;
mod extract;
mod jobs;
mod llm_client;
mod models;
mod render;
mod routes;
mod state;
mod tailor;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::jobs::queue::RedisQueue;
use crate::llm_client::LlmClient;
use crate::render::client::RenderClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (aborts on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Tailor API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL and apply migrations
    let db = create_pool(&config.database_url).await?;

    // Initialize the Redis queue (worker handoff); connects once, up front
    let queue = RedisQueue::connect(&config.redis_url).await?;
    info!("Redis queue connection established");

    // Initialize generation client
    let llm = LlmClient::new(
        config.anthropic_api_key.clone(),
        config.anthropic_model.clone(),
        config.generation_timeout_secs,
    );
    info!("Generation client initialized (model: {})", llm.model());

    // Initialize PDF render client
    let renderer = RenderClient::new(config.render_service_url.clone());
    info!("Render client initialized ({})", config.render_service_url);

    // Build app state
    let state = AppState {
        db,
        queue: Arc::new(queue),
        generator: Arc::new(llm),
        renderer,
    };

    // Build router
    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()), // TODO: tighten CORS in production
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
