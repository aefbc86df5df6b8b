//! HTTP Handlers

use axum::{body::Bytes, extract::State, Json};
use serde::Serialize;

use arxiv_scout::Welcome;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub primary_provider: String,
    pub extraction_mode: String,
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        primary_provider: state.provider_kind.to_string(),
        extraction_mode: state.extraction_mode.to_string(),
    })
}

/// Discovery metadata with example prompts
pub async fn welcome_handler() -> Json<Welcome> {
    Json(arxiv_scout::welcome())
}

/// Plain-text query in, plain-text answer out. Always 200: failures become
/// the apology text. Invalid UTF-8 is decoded lossily.
pub async fn research_handler(State(state): State<AppState>, body: Bytes) -> String {
    let query = String::from_utf8_lossy(&body);
    tracing::debug!(bytes = body.len(), "Research request");
    state.scout.handle(&query).await
}
