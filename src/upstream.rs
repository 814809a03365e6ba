//! Upstream generative-model client (Gemini `generateContent` REST shape).
//!
//! The model is treated as an opaque text-completion capability: one prompt
//! in, one text reply out. Failure classification happens here so handlers
//! only ever see domain error codes.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::ServerConfig;
use crate::protocol::{CoachErrorCode, CoachErrorResponse};

/// Candidate finish reasons that mean the model declined to answer.
const REFUSAL_FINISH_REASONS: &[&str] = &["SAFETY", "RECITATION", "PROHIBITED_CONTENT"];

/// Client for the upstream generative-model endpoint.
///
/// Built once at startup from read-only configuration and shared by all
/// requests on the stdio session.
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

// -- wire types -------------------------------------------------------------

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<RequestContent>,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    role: String,
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
    prompt_feedback: Option<PromptFeedback>,
    error: Option<UpstreamErrorDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpstreamErrorDetail {
    message: String,
    status: Option<String>,
}

// -- client -----------------------------------------------------------------

impl GeminiClient {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.upstream_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            timeout: config.request_timeout,
        }
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }

    /// Send one prompt to the model and return its raw text reply.
    ///
    /// Each attempt runs under the configured deadline. Transient failures
    /// (`upstream_error`, `upstream_timeout`) are retried exactly once, so a
    /// persistently unreachable endpoint costs at most twice the deadline.
    /// Refusals and malformed replies are surfaced immediately.
    pub async fn generate(&self, prompt: &str) -> Result<String, CoachErrorResponse> {
        let mut last_err = None;
        for attempt in 0..2 {
            let outcome = match tokio::time::timeout(self.timeout, self.attempt(prompt)).await {
                Ok(result) => result,
                Err(_) => {
                    log::warn!(
                        "Upstream attempt {} timed out after {}s",
                        attempt + 1,
                        self.timeout.as_secs()
                    );
                    Err(CoachErrorResponse::canonical(CoachErrorCode::UpstreamTimeout))
                }
            };

            match outcome {
                Ok(text) => return Ok(text),
                Err(err) if err.error.code.is_retryable() && attempt == 0 => {
                    log::warn!("Upstream attempt failed ({}), retrying once", err.error.message);
                    last_err = Some(err);
                }
                Err(err) => return Err(err),
            }
        }
        Err(last_err.expect("retry loop exits with an error"))
    }

    async fn attempt(&self, prompt: &str) -> Result<String, CoachErrorResponse> {
        let request = GenerateRequest {
            contents: vec![RequestContent {
                role: "user".to_string(),
                parts: vec![RequestPart {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .client
            .post(self.generate_url())
            .json(&request)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(classify_transport_error)?;

        if !status.is_success() {
            // Surface the upstream's own message when its error envelope parses.
            if let Ok(parsed) = serde_json::from_str::<GenerateResponse>(&body) {
                if let Some(detail) = parsed.error {
                    let status_tag = detail.status.as_deref().unwrap_or("");
                    return Err(CoachErrorResponse::new(
                        CoachErrorCode::UpstreamError,
                        format!("Upstream rejected the request ({status_tag}): {}", detail.message),
                    ));
                }
            }
            return Err(CoachErrorResponse::new(
                CoachErrorCode::UpstreamError,
                format!("Upstream returned HTTP {status}"),
            ));
        }

        let parsed: GenerateResponse = serde_json::from_str(&body).map_err(|e| {
            log::warn!("Upstream success body is not valid JSON: {e}");
            CoachErrorResponse::canonical(CoachErrorCode::MalformedUpstreamResponse)
        })?;

        extract_text(parsed)
    }
}

/// Classify a reqwest transport failure into a domain error.
fn classify_transport_error(err: reqwest::Error) -> CoachErrorResponse {
    if err.is_timeout() {
        CoachErrorResponse::canonical(CoachErrorCode::UpstreamTimeout)
    } else {
        CoachErrorResponse::new(
            CoachErrorCode::UpstreamError,
            format!("Upstream request failed: {err}"),
        )
    }
}

/// Pull the concatenated text parts out of a successful response.
///
/// A prompt-level block or a refusal finish reason maps to
/// `upstream_refusal`; a success body with no candidates at all is a
/// malformed reply.
fn extract_text(response: GenerateResponse) -> Result<String, CoachErrorResponse> {
    if let Some(feedback) = &response.prompt_feedback {
        if let Some(reason) = &feedback.block_reason {
            return Err(CoachErrorResponse::new(
                CoachErrorCode::UpstreamRefusal,
                format!("Upstream blocked the prompt ({reason})"),
            ));
        }
    }

    let Some(candidate) = response.candidates.and_then(|c| c.into_iter().next()) else {
        return Err(CoachErrorResponse::canonical(
            CoachErrorCode::MalformedUpstreamResponse,
        ));
    };

    if let Some(reason) = &candidate.finish_reason {
        if REFUSAL_FINISH_REASONS.contains(&reason.as_str()) {
            return Err(CoachErrorResponse::new(
                CoachErrorCode::UpstreamRefusal,
                format!("Upstream declined to answer ({reason})"),
            ));
        }
    }

    let mut text = String::new();
    if let Some(parts) = candidate.content.and_then(|c| c.parts) {
        for part in parts {
            if let Some(t) = part.text {
                text.push_str(&t);
            }
        }
    }

    Ok(text)
}
