//! Gateway handlers — one prompt, one generator call, one parse per endpoint.
//!
//! Each `*_inner` function takes the generator and a request DTO and returns
//! `(status, json_body)`. Missing required fields short-circuit with 400 before
//! the generator is touched. Generator or parse failures are logged and turned
//! into the endpoint's failure body: an explicit `success:false` for
//! question/response (callers substitute their own content), or a canned
//! payload for the advisory analysis and tips endpoints.

use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use weebot_core::llm::{parse_json_output, LlmError, TextGenerator};
use weebot_core::models::{
    fallback_tips, tips_from_value, CodeAnalysis, CommunicationMetrics, ResponseAnalysis,
};
use weebot_core::prompts::{self, TipCategory};

/// Skill level used when a tips request omits one.
pub const DEFAULT_SKILL_LEVEL: &str = "intermediate";

/// The five gateway endpoints, keyed to their failure bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    GenerateQuestion,
    AnalyzeResponse,
    AnalyzeCommunication,
    AnalyzeCode,
    GenerateTips,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::GenerateQuestion => "generate-question",
            Endpoint::AnalyzeResponse => "analyze-response",
            Endpoint::AnalyzeCommunication => "analyze-communication",
            Endpoint::AnalyzeCode => "analyze-code",
            Endpoint::GenerateTips => "generate-tips",
        }
    }

    /// Body served when no result can be produced.
    pub fn failure(&self) -> (StatusCode, Value) {
        match self {
            Endpoint::GenerateQuestion => critical_failure("Failed to generate question"),
            Endpoint::AnalyzeResponse => critical_failure("Failed to analyze response"),
            Endpoint::AnalyzeCommunication => (
                StatusCode::OK,
                json!({
                    "error": "Failed to analyze communication",
                    "metrics": CommunicationMetrics::fallback(),
                }),
            ),
            Endpoint::AnalyzeCode => (
                StatusCode::OK,
                json!({
                    "error": "Failed to analyze code",
                    "analysis": CodeAnalysis::fallback(),
                }),
            ),
            Endpoint::GenerateTips => (
                StatusCode::OK,
                json!({
                    "error": "Failed to generate tips",
                    "tips": fallback_tips(),
                }),
            ),
        }
    }
}

/// A request body that could not be read as the endpoint's DTO (not JSON,
/// wrong field types, wrong content type). Served like any other failure of
/// that endpoint; the generator is never called.
pub fn unreadable_body(endpoint: Endpoint, reason: &str) -> (StatusCode, Value) {
    tracing::error!(
        endpoint = endpoint.as_str(),
        error = reason,
        "Unreadable request body"
    );
    endpoint.failure()
}

// ============================================================================
// Request DTOs
// ============================================================================

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuestionRequest {
    pub context: Option<String>,
    pub question_number: Option<u32>,
    pub total_questions: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
pub struct AnalyzeResponseRequest {
    pub question: Option<String>,
    pub transcript: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct AnalyzeCommunicationRequest {
    pub transcript: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeCodeRequest {
    pub code: Option<String>,
    pub language: Option<String>,
    pub problem_description: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTipsRequest {
    pub category: Option<String>,
    pub skill_level: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn generate_question_inner(
    generator: &dyn TextGenerator,
    req: GenerateQuestionRequest,
) -> (StatusCode, Value) {
    let (question_number, total_questions) = match (req.question_number, req.total_questions) {
        (Some(n), Some(t)) => (n, t),
        _ => return bad_request("questionNumber and totalQuestions are required"),
    };

    let prompt = prompts::generate_question_prompt(
        req.context.as_deref().unwrap_or_default(),
        question_number,
        total_questions,
    );

    match generator.generate(&prompt).await {
        Ok(text) => {
            let question = text.trim();
            if question.is_empty() {
                log_failure(generator, Endpoint::GenerateQuestion, &LlmError::EmptyResponse);
                return Endpoint::GenerateQuestion.failure();
            }
            (
                StatusCode::OK,
                json!({ "question": question, "success": true }),
            )
        }
        Err(e) => {
            log_failure(generator, Endpoint::GenerateQuestion, &e);
            Endpoint::GenerateQuestion.failure()
        }
    }
}

pub async fn analyze_response_inner(
    generator: &dyn TextGenerator,
    req: AnalyzeResponseRequest,
) -> (StatusCode, Value) {
    let (question, transcript) = match (required(req.question), required(req.transcript)) {
        (Some(q), Some(t)) => (q, t),
        _ => return bad_request("Question and transcript are required"),
    };

    let prompt = prompts::analyze_response_prompt(&question, &transcript);

    let result = match generator.generate(&prompt).await {
        Ok(text) => parse_json_output::<ResponseAnalysis>(&text),
        Err(e) => Err(e),
    };

    match result {
        Ok(analysis) => (
            StatusCode::OK,
            json!({ "analysis": analysis, "success": true }),
        ),
        Err(e) => {
            log_failure(generator, Endpoint::AnalyzeResponse, &e);
            Endpoint::AnalyzeResponse.failure()
        }
    }
}

pub async fn analyze_communication_inner(
    generator: &dyn TextGenerator,
    req: AnalyzeCommunicationRequest,
) -> (StatusCode, Value) {
    let Some(transcript) = required(req.transcript) else {
        return bad_request("Transcript is required");
    };

    let prompt = prompts::analyze_communication_prompt(&transcript);

    let result = match generator.generate(&prompt).await {
        Ok(text) => parse_json_output::<CommunicationMetrics>(&text),
        Err(e) => Err(e),
    };

    match result {
        Ok(metrics) => (StatusCode::OK, json!({ "metrics": metrics })),
        Err(e) => {
            log_failure(generator, Endpoint::AnalyzeCommunication, &e);
            Endpoint::AnalyzeCommunication.failure()
        }
    }
}

pub async fn analyze_code_inner(
    generator: &dyn TextGenerator,
    req: AnalyzeCodeRequest,
) -> (StatusCode, Value) {
    let (code, language) = match (required(req.code), required(req.language)) {
        (Some(c), Some(l)) => (c, l),
        _ => return bad_request("Code and language are required"),
    };

    let prompt = prompts::analyze_code_prompt(
        &code,
        &language,
        req.problem_description.as_deref().unwrap_or_default(),
    );

    let result = match generator.generate(&prompt).await {
        Ok(text) => parse_json_output::<CodeAnalysis>(&text),
        Err(e) => Err(e),
    };

    match result {
        Ok(analysis) => (StatusCode::OK, json!({ "analysis": analysis })),
        Err(e) => {
            log_failure(generator, Endpoint::AnalyzeCode, &e);
            Endpoint::AnalyzeCode.failure()
        }
    }
}

pub async fn generate_tips_inner(
    generator: &dyn TextGenerator,
    req: GenerateTipsRequest,
) -> (StatusCode, Value) {
    let Some(category) = required(req.category) else {
        return bad_request("Category is required");
    };
    let Some(category) = TipCategory::parse(&category) else {
        return bad_request("Category must be communication or coding");
    };

    let skill_level = required(req.skill_level).unwrap_or_else(|| DEFAULT_SKILL_LEVEL.to_string());
    let prompt = prompts::generate_tips_prompt(category, &skill_level);

    let result = match generator.generate(&prompt).await {
        Ok(text) => parse_json_output::<Value>(&text).and_then(|v| {
            tips_from_value(v)
                .ok_or_else(|| LlmError::Parse("expected a JSON array of tips".to_string()))
        }),
        Err(e) => Err(e),
    };

    match result {
        Ok(tips) => (StatusCode::OK, json!({ "tips": tips })),
        Err(e) => {
            log_failure(generator, Endpoint::GenerateTips, &e);
            Endpoint::GenerateTips.failure()
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// A present, non-empty string field.
fn required(field: Option<String>) -> Option<String> {
    field.filter(|s| !s.is_empty())
}

fn bad_request(msg: &str) -> (StatusCode, Value) {
    (StatusCode::BAD_REQUEST, json!({ "error": msg }))
}

fn critical_failure(msg: &str) -> (StatusCode, Value) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": msg, "success": false }),
    )
}

fn log_failure(generator: &dyn TextGenerator, endpoint: Endpoint, error: &LlmError) {
    tracing::error!(
        endpoint = endpoint.as_str(),
        generator = generator.name(),
        error = %error,
        "Gateway call failed"
    );
}

// ============================================================================
// Unit Tests — drive the inner functions with an in-process generator
// ============================================================================
