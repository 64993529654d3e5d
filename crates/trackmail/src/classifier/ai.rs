//! AI classification path.
//!
//! One bounded outbound request per classification attempt against an
//! OpenAI-compatible chat completions endpoint. Every failure mode
//! (missing key, transport error, timeout, malformed JSON) is an
//! [`AiError`] the dispatcher converts into a fallback run; callers of
//! the classifier never observe these errors.

use std::time::Duration;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classifier::{ApplicationStatus, ClassificationMethod, ClassificationResult, Urgency};
use crate::config::AiConfig;
use crate::email::EmailContent;

/// Body text sent to the provider is truncated to keep requests bounded.
const MAX_BODY_CHARS: usize = 4000;

const SYSTEM_PROMPT: &str = "\
You classify job-application emails. Respond with a single JSON object and \
nothing else, using exactly these keys: \
{\"status\", \"confidence\", \"indicators\", \"reasoning\", \"isJobRelated\"}. \
\"status\" must be one of: applied, interview_scheduled, interview_completed, \
offer_received, rejected, withdrawn, not_job_related. \
\"confidence\" is an integer from 0 to 100. \
\"indicators\" is a list of short phrases from the email that support the \
status. \"reasoning\" is one sentence. \"isJobRelated\" is a boolean that is \
false only for emails unrelated to a specific job application.";

#[derive(Debug, Error)]
pub enum AiError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

pub struct AiClassifier {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
    timeout: Duration,
}

impl AiClassifier {
    /// Builds the classifier, or `None` when the AI path is disabled or
    /// no API key is present in the configured environment variable.
    pub fn from_config(config: &AiConfig) -> Option<Self> {
        if !config.enabled {
            info!("AI classification disabled by configuration");
            return None;
        }
        let api_key = match std::env::var(&config.api_key_env) {
            Ok(key) if !key.trim().is_empty() => key,
            _ => {
                info!(
                    "AI classification unavailable: {} is not set",
                    config.api_key_env
                );
                return None;
            }
        };
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = match reqwest::Client::builder().timeout(timeout).build() {
            Ok(client) => client,
            Err(err) => {
                warn!("Failed to build HTTP client for AI classification: {err}");
                return None;
            }
        };
        Some(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key,
            timeout,
        })
    }

    pub async fn classify(
        &self,
        email: &EmailContent,
        company: Option<&str>,
        position: Option<&str>,
        body: &str,
    ) -> Result<ClassificationResult, AiError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt(email, company, position, body),
                },
            ],
            temperature: 0.0,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        let send = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send();
        let response = tokio::time::timeout(self.timeout, send)
            .await
            .map_err(|_| AiError::Timeout(self.timeout))??
            .error_for_status()?;

        let chat: ChatResponse = response.json().await?;
        let content = chat
            .choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .ok_or_else(|| AiError::MalformedResponse("empty choices".to_string()))?;

        parse_payload(content)
    }
}

fn user_prompt(
    email: &EmailContent,
    company: Option<&str>,
    position: Option<&str>,
    body: &str,
) -> String {
    let truncated: String = body.chars().take(MAX_BODY_CHARS).collect();
    format!(
        "Subject: {}\nSender: {}\nCompany: {}\nPosition: {}\n\nBody:\n{}",
        email.subject,
        email.sender,
        company.unwrap_or("unknown"),
        position.unwrap_or("unknown"),
        truncated,
    )
}

/// Parses the provider's JSON payload into a result. Tolerates markdown
/// code fences around the object.
fn parse_payload(content: &str) -> Result<ClassificationResult, AiError> {
    let trimmed = content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let payload: AiPayload = serde_json::from_str(trimmed)
        .map_err(|err| AiError::MalformedResponse(err.to_string()))?;

    let mut status = ApplicationStatus::parse(&payload.status)
        .ok_or_else(|| AiError::MalformedResponse(format!("unknown status {:?}", payload.status)))?;

    let is_job_related = payload.is_job_related.unwrap_or_else(|| status.is_job_related());
    if !is_job_related {
        status = ApplicationStatus::NotJobRelated;
    }

    let confidence = payload.confidence.unwrap_or(50.0).clamp(0.0, 100.0) as u8;

    Ok(ClassificationResult {
        status,
        confidence,
        indicators: payload.indicators.unwrap_or_default(),
        reasoning: payload.reasoning.unwrap_or_default(),
        is_job_related,
        urgency: Urgency::for_status(status),
        method: ClassificationMethod::Ai,
    })
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Deserialize)]
struct AiPayload {
    status: String,
    confidence: Option<f64>,
    indicators: Option<Vec<String>>,
    reasoning: Option<String>,
    #[serde(rename = "isJobRelated", alias = "is_job_related")]
    is_job_related: Option<bool>,
}
