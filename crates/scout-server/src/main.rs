//! ArXiv Paper Scout HTTP Server
//!
//! Axum server in front of the scout orchestrator.

mod config;
mod handlers;
mod state;

use axum::{routing::{get, post}, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;
use crate::handlers::{health_check, research_handler, welcome_handler};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    let config = ServerConfig::from_env()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_filter))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let state = AppState::from_config(&config)?;

    // Verify the primary provider
    match state.provider.health_check().await {
        Ok(true) => tracing::info!("✓ Connected to {}", state.provider.name()),
        Ok(false) | Err(_) => {
            tracing::warn!("⚠ {} not reachable - research requests will fail", state.provider.name());
        }
    }

    let app = router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 ArXiv Paper Scout running on http://{}", config.bind_addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health        - Health check");
    tracing::info!("  GET  /api/welcome   - Welcome message and example prompts");
    tracing::info!("  POST /api/research  - Ask the scout (text/plain)");

    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/welcome", get(welcome_handler))
        .route("/api/research", post(research_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
