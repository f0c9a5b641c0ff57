//! Text generation for the interview gateway.
//!
//! Provides a `TextGenerator` trait with implementations for:
//! - **Gemini** — `generateContent` on the Gemini API, single attempt
//! - **Unavailable** — stands in when no API key is configured; every call fails
//!
//! Plus helpers for turning model text into structured values.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::LlmConfig;

// ============================================================================
// TextGenerator trait
// ============================================================================

/// Abstraction over text-generation providers.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Run one prompt and return the model's text output.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

// ============================================================================
// Error types
// ============================================================================

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Model returned no text")]
    EmptyResponse,

    #[error("Missing API key")]
    MissingApiKey,

    #[error("Unparseable model output: {0}")]
    Parse(String),
}

// ============================================================================
// Gemini API structs (private)
// ============================================================================

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: Option<GeminiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    code: u16,
    message: String,
}

// ============================================================================
// GeminiTextClient
// ============================================================================

#[derive(Debug, Clone)]
pub struct GeminiTextClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiTextClient {
    pub fn new(api_key: String, config: &LlmConfig) -> Result<Self, LlmError> {
        Self::with_base_url(api_key, config, config.base_url.clone())
    }

    /// Create a client with a custom base URL (for testing / proxies)
    pub fn with_base_url(
        api_key: String,
        config: &LlmConfig,
        base_url: String,
    ) -> Result<Self, LlmError> {
        if api_key.is_empty() {
            return Err(LlmError::MissingApiKey);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextGenerator for GeminiTextClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let request = GenerateRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: Some(prompt.to_string()),
                }],
            }],
        };

        let response = self.client.post(&url).json(&request).send().await?;
        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            let error_detail = serde_json::from_str::<GeminiErrorResponse>(&error_body)
                .ok()
                .and_then(|e| e.error);

            let (code, message) = error_detail
                .map(|e| (e.code, e.message))
                .unwrap_or((status.as_u16(), error_body));

            tracing::error!(code = code, message = %message, "Gemini API error");

            return Err(LlmError::Api { code, message });
        }

        let body: GenerateResponse = response.json().await?;

        let text = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }

        Ok(text)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

// ============================================================================
// UnavailableGenerator
// ============================================================================

/// Generator used when no credentials are configured. Lets the gateway keep
/// serving: advisory endpoints return their canned payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableGenerator;

#[async_trait]
impl TextGenerator for UnavailableGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
        Err(LlmError::MissingApiKey)
    }

    fn name(&self) -> &str {
        "unavailable"
    }
}

/// Build the configured generator. Falls back to [`UnavailableGenerator`]
/// (with a warning) when the API key variable is unset.
pub fn create_generator(config: &LlmConfig) -> Result<Box<dyn TextGenerator>, LlmError> {
    match config.api_key() {
        Some(key) => Ok(Box::new(GeminiTextClient::new(key, config)?)),
        None => {
            tracing::warn!(
                env = %config.api_key_env,
                "No Gemini API key set — gateway will serve fallback payloads only"
            );
            Ok(Box::new(UnavailableGenerator))
        }
    }
}

// ============================================================================
// Output parsing
// ============================================================================

/// Strip markdown code fences from model output if present.
/// Models without a strict JSON mode often wrap JSON in ```json ... ```.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }
    // Drop the opening fence line, including any language tag
    let body = match trimmed.find('\n') {
        Some(pos) => &trimmed[pos + 1..],
        None => {
            let rest = trimmed.trim_start_matches('`');
            match rest.split_once(char::is_whitespace) {
                Some((tag, body))
                    if !tag.is_empty() && tag.chars().all(|c| c.is_ascii_alphanumeric()) =>
                {
                    body
                }
                _ => rest,
            }
        }
    };
    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Decode model output as `T`, tolerating code fences.
pub fn parse_json_output<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    serde_json::from_str(strip_code_fences(text)).map_err(|e| LlmError::Parse(e.to_string()))
}

// ============================================================================
// TESTS
// ============================================================================
