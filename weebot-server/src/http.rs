//! WeeBot HTTP API
//!
//! Axum-based HTTP server exposing the interview gateway.
//!
//! Architecture: each endpoint has a thin axum handler that delegates to a pure
//! inner function (see [`crate::gateway`]). The inner functions are directly
//! testable without axum dispatch machinery. Body rejections are answered with
//! the endpoint's own JSON failure body rather than axum's plain-text default.
//!
//! Endpoints:
//! - GET  /health                — liveness plus generator info
//! - GET  /version               — server version info
//! - POST /generate-question     — next behavioral interview question
//! - POST /analyze-response      — score one answer against its question
//! - POST /analyze-communication — communication metrics for a transcript
//! - POST /analyze-code          — code review scores and suggestions
//! - POST /generate-tips         — improvement tips for a category

use std::sync::Arc;

use anyhow::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use weebot_core::{TextGenerator, WeebotConfig};

use crate::gateway::{
    self, AnalyzeCodeRequest, AnalyzeCommunicationRequest, AnalyzeResponseRequest, Endpoint,
    GenerateQuestionRequest, GenerateTipsRequest,
};

/// Shared state for all HTTP handlers
#[derive(Clone)]
pub struct HttpState {
    pub generator: Arc<dyn TextGenerator>,
    pub config: WeebotConfig,
}

/// Build the Axum router with all endpoints
pub fn build_router(state: Arc<HttpState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/version", get(version_handler))
        .route("/generate-question", post(generate_question_handler))
        .route("/analyze-response", post(analyze_response_handler))
        .route("/analyze-communication", post(analyze_communication_handler))
        .route("/analyze-code", post(analyze_code_handler))
        .route("/generate-tips", post(generate_tips_handler))
        .with_state(state)
}

/// Start the HTTP server on the configured address.
/// Gracefully shuts down when the broadcast shutdown signal fires.
pub async fn start_http_server(
    state: Arc<HttpState>,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let addr = format!("{}:{}", state.config.http.host, state.config.http.port);

    let app = build_router(state);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("WeeBot HTTP API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            tracing::info!("HTTP server shutting down...");
        })
        .await?;

    Ok(())
}

// ============================================================================
// Inner (directly testable) functions
// ============================================================================

/// Inner health — reports which generator backs the gateway (pure, no IO).
pub fn health_inner(state: &HttpState) -> serde_json::Value {
    serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "generator": state.generator.name(),
        "model": state.config.llm.model,
    })
}

/// Inner version — returns version info (pure, no IO).
pub fn version_inner() -> serde_json::Value {
    serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "protocol": "weebot/1",
    })
}

// ============================================================================
// Axum handler wrappers (thin — delegate to inner functions)
// ============================================================================

pub async fn health_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    (StatusCode::OK, Json(health_inner(&state)))
}

pub async fn version_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(version_inner()))
}

pub async fn generate_question_handler(
    State(state): State<Arc<HttpState>>,
    payload: Result<Json<GenerateQuestionRequest>, JsonRejection>,
) -> impl IntoResponse {
    let (status, body) = match payload {
        Ok(Json(req)) => gateway::generate_question_inner(state.generator.as_ref(), req).await,
        Err(rejection) => gateway::unreadable_body(Endpoint::GenerateQuestion, &rejection.body_text()),
    };
    (status, Json(body))
}

pub async fn analyze_response_handler(
    State(state): State<Arc<HttpState>>,
    payload: Result<Json<AnalyzeResponseRequest>, JsonRejection>,
) -> impl IntoResponse {
    let (status, body) = match payload {
        Ok(Json(req)) => gateway::analyze_response_inner(state.generator.as_ref(), req).await,
        Err(rejection) => gateway::unreadable_body(Endpoint::AnalyzeResponse, &rejection.body_text()),
    };
    (status, Json(body))
}

pub async fn analyze_communication_handler(
    State(state): State<Arc<HttpState>>,
    payload: Result<Json<AnalyzeCommunicationRequest>, JsonRejection>,
) -> impl IntoResponse {
    let (status, body) = match payload {
        Ok(Json(req)) => gateway::analyze_communication_inner(state.generator.as_ref(), req).await,
        Err(rejection) => gateway::unreadable_body(Endpoint::AnalyzeCommunication, &rejection.body_text()),
    };
    (status, Json(body))
}

pub async fn analyze_code_handler(
    State(state): State<Arc<HttpState>>,
    payload: Result<Json<AnalyzeCodeRequest>, JsonRejection>,
) -> impl IntoResponse {
    let (status, body) = match payload {
        Ok(Json(req)) => gateway::analyze_code_inner(state.generator.as_ref(), req).await,
        Err(rejection) => gateway::unreadable_body(Endpoint::AnalyzeCode, &rejection.body_text()),
    };
    (status, Json(body))
}

pub async fn generate_tips_handler(
    State(state): State<Arc<HttpState>>,
    payload: Result<Json<GenerateTipsRequest>, JsonRejection>,
) -> impl IntoResponse {
    let (status, body) = match payload {
        Ok(Json(req)) => gateway::generate_tips_inner(state.generator.as_ref(), req).await,
        Err(rejection) => gateway::unreadable_body(Endpoint::GenerateTips, &rejection.body_text()),
    };
    (status, Json(body))
}
