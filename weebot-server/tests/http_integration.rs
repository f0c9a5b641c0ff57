//! HTTP integration tests for the WeeBot gateway
//!
//! Full router dispatch via `oneshot`, with the Gemini API replaced by a
//! wiremock server so the real `GeminiTextClient` is exercised end to end.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;
use weebot_core::config::LlmConfig;
use weebot_core::{GeminiTextClient, TextGenerator, UnavailableGenerator, WeebotConfig};
use weebot_server::http::{build_router, HttpState};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GENERATE_PATH: &str = "/models/gemini-2.5-flash:generateContent";

fn gemini_text(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{ "content": { "parts": [{ "text": text }], "role": "model" } }]
    })
}

fn state_with(generator: Arc<dyn TextGenerator>) -> Arc<HttpState> {
    Arc::new(HttpState {
        generator,
        config: WeebotConfig::default(),
    })
}

fn gemini_state(mock_server: &MockServer) -> Arc<HttpState> {
    let llm = LlmConfig {
        request_timeout_seconds: 5,
        ..LlmConfig::default()
    };
    let client = GeminiTextClient::with_base_url("test-api-key".into(), &llm, mock_server.uri())
        .expect("Failed to create test client");
    state_with(Arc::new(client))
}

async fn post_json(
    state: Arc<HttpState>,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let app = build_router(state);
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap();

    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

// ===========================================================================
// GET endpoints
// ===========================================================================

#[tokio::test]
async fn test_version_endpoint() {
    let app = build_router(state_with(Arc::new(UnavailableGenerator)));
    let req = Request::builder()
        .method("GET")
        .uri("/version")
        .body(Body::empty())
        .unwrap();

    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json["version"].is_string());
    assert_eq!(json["protocol"], "weebot/1");
}

#[tokio::test]
async fn test_health_endpoint_names_generator() {
    let mock_server = MockServer::start().await;
    let app = build_router(gemini_state(&mock_server));
    let req = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["generator"], "gemini");
}

// ===========================================================================
// Validation never reaches the provider
// ===========================================================================

#[tokio::test]
async fn test_analyze_communication_missing_transcript_is_400_without_provider_call() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_text("{}")))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (status, body) = post_json(
        gemini_state(&mock_server),
        "/analyze-communication",
        json!({}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    // MockServer verifies `.expect(0)` on drop
}

#[tokio::test]
async fn test_generate_tips_missing_category_is_400() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_text("[]")))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (status, body) = post_json(
        gemini_state(&mock_server),
        "/generate-tips",
        json!({ "skillLevel": "beginner" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Category is required");
}

// ===========================================================================
// Provider success paths
// ===========================================================================

#[tokio::test]
async fn test_generate_question_roundtrip() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(gemini_text("Describe a project you are proud of.\n")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let (status, body) = post_json(
        gemini_state(&mock_server),
        "/generate-question",
        json!({ "context": "", "questionNumber": 1, "totalQuestions": 3 }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["question"], "Describe a project you are proud of.");
}

#[tokio::test]
async fn test_analyze_code_roundtrip() {
    let mock_server = MockServer::start().await;
    let model_output = "```json\n{\"codeQuality\": 81, \"efficiency\": 74, \"readability\": 90, \
        \"suggestions\": [\"a\", \"b\", \"c\"], \"optimizations\": [\"x\", \"y\", \"z\"]}\n```";
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_text(model_output)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (status, body) = post_json(
        gemini_state(&mock_server),
        "/analyze-code",
        json!({
            "code": "function add(a, b) { return a + b }",
            "language": "javascript",
            "problemDescription": "Add two numbers"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.get("error").is_none());
    assert_eq!(body["analysis"]["codeQuality"], 81);
    assert_eq!(body["analysis"]["readability"], 90);
}

// ===========================================================================
// Provider failure paths
// ===========================================================================

#[tokio::test]
async fn test_analyze_code_provider_500_serves_fallback() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": { "code": 500, "message": "Internal error" }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (status, body) = post_json(
        gemini_state(&mock_server),
        "/analyze-code",
        json!({ "code": "x = 1", "language": "python", "problemDescription": "noop" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"], "Failed to analyze code");
    assert_eq!(body["analysis"]["codeQuality"], 70);
    assert_eq!(body["analysis"]["efficiency"], 65);
    assert_eq!(body["analysis"]["readability"], 75);
    assert!(body["analysis"]["suggestions"].as_array().unwrap().len() >= 3);
    assert!(body["analysis"]["optimizations"].as_array().unwrap().len() >= 3);
}

#[tokio::test]
async fn test_analyze_response_provider_error_is_500() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": { "code": 403, "message": "API key not valid" }
        })))
        .mount(&mock_server)
        .await;

    let (status, body) = post_json(
        gemini_state(&mock_server),
        "/analyze-response",
        json!({ "question": "Why?", "transcript": "Because." }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Failed to analyze response");
}

#[tokio::test]
async fn test_unavailable_generator_serves_every_fallback() {
    let state = state_with(Arc::new(UnavailableGenerator));

    let (status, body) = post_json(
        state.clone(),
        "/analyze-communication",
        json!({ "transcript": "Hello" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["metrics"]["clarity"], 72);

    let (status, body) = post_json(
        state.clone(),
        "/generate-tips",
        json!({ "category": "coding", "skillLevel": "beginner" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tips"].as_array().unwrap().len(), 5);

    let (status, body) = post_json(
        state,
        "/generate-question",
        json!({ "questionNumber": 1, "totalQuestions": 3 }),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
}

// ===========================================================================
// Unreadable request bodies get the endpoint's JSON failure body
// ===========================================================================

async fn post_raw(
    state: Arc<HttpState>,
    uri: &str,
    content_type: Option<&str>,
    body: &str,
) -> (StatusCode, String, serde_json::Value) {
    let app = build_router(state);
    let mut builder = Request::builder().method("POST").uri(uri);
    if let Some(ct) = content_type {
        builder = builder.header("content-type", ct);
    }
    let req = builder.body(Body::from(body.to_string())).unwrap();

    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let response_type = resp
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, response_type, json)
}

async fn silent_provider() -> MockServer {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_text("{}")))
        .expect(0)
        .mount(&mock_server)
        .await;
    mock_server
}

#[tokio::test]
async fn test_analyze_code_non_json_body_serves_fallback() {
    let mock_server = silent_provider().await;
    let (status, content_type, body) = post_raw(
        gemini_state(&mock_server),
        "/analyze-code",
        Some("application/json"),
        "not json",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.starts_with("application/json"));
    assert_eq!(body["error"], "Failed to analyze code");
    assert_eq!(body["analysis"]["codeQuality"], 70);
}

#[tokio::test]
async fn test_analyze_communication_wrong_field_type_serves_fallback() {
    let mock_server = silent_provider().await;
    let (status, content_type, body) = post_raw(
        gemini_state(&mock_server),
        "/analyze-communication",
        Some("application/json"),
        r#"{"transcript": 42}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.starts_with("application/json"));
    assert_eq!(body["metrics"]["clarity"], 72);
}

#[tokio::test]
async fn test_generate_question_wrong_field_type_is_json_500() {
    let mock_server = silent_provider().await;
    let (status, content_type, body) = post_raw(
        gemini_state(&mock_server),
        "/generate-question",
        Some("application/json"),
        r#"{"questionNumber": "2"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(content_type.starts_with("application/json"));
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Failed to generate question");
}

#[tokio::test]
async fn test_generate_tips_without_content_type_serves_fallback() {
    let mock_server = silent_provider().await;
    let (status, content_type, body) = post_raw(
        gemini_state(&mock_server),
        "/generate-tips",
        None,
        r#"{"category": "coding"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.starts_with("application/json"));
    assert_eq!(body["error"], "Failed to generate tips");
    assert_eq!(body["tips"].as_array().unwrap().len(), 5);
}
