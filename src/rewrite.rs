//! Request validation and upstream reply normalization.
//!
//! Everything here is request-scoped: a [`RewriteRequest`] is built from raw
//! tool arguments, handed to the prompt builder, and dropped when the call
//! returns. The upstream model does all of the actual analysis; this module
//! only enforces the input contract and the output schema.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::protocol::{CoachErrorCode, CoachErrorResponse, SuggestPromptParams};

/// Maximum number of alternative phrasings returned to the caller.
pub const MAX_ALTERNATIVES: usize = 2;

/// Confidence used when the model omits one or sends something unparsable.
const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Literal markers a rewritten prompt must never contain. A prompt that
/// references its own conversation is not self-contained; matching is
/// case-insensitive.
const BANNED_MARKERS: &[&str] = &["the user", "previous discussion"];

/// One prior turn of the conversation being analyzed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: String,
    pub text: String,
}

/// A validated, normalized rewrite request.
#[derive(Debug, Clone)]
pub struct RewriteRequest {
    pub window: Vec<ConversationTurn>,
    pub last_user_message: String,
    pub user_comment: Option<String>,
    pub task_hint: Option<String>,
}

/// The fixed output record of one `coach.suggest_better_prompt` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteResult {
    pub summary: String,
    pub root_causes: Vec<String>,
    pub suggested_prompt: String,
    pub alternatives: Vec<String>,
    pub confidence: f64,
}

/// Validate and normalize raw tool arguments.
///
/// Fails with `invalid_input` when the last user message is missing or
/// empty after trimming. The conversation window keeps only the
/// `window_turns` most recent turns, dropping turns with empty text so
/// they cannot pad the meta-prompt. Optional fields are trimmed and empty
/// strings are treated as absent.
pub fn validate(
    params: SuggestPromptParams,
    window_turns: usize,
) -> Result<RewriteRequest, CoachErrorResponse> {
    let last_user_message = params
        .last_user_message
        .as_deref()
        .map(str::trim)
        .unwrap_or("");
    if last_user_message.is_empty() {
        return Err(CoachErrorResponse::canonical(CoachErrorCode::InvalidInput));
    }

    let mut window: Vec<ConversationTurn> = params
        .conversation_window
        .into_iter()
        .filter_map(|turn| {
            let text = turn.text.trim();
            if text.is_empty() {
                return None;
            }
            Some(ConversationTurn {
                role: turn.role,
                text: text.to_string(),
            })
        })
        .collect();
    if window.len() > window_turns {
        window.drain(..window.len() - window_turns);
    }

    Ok(RewriteRequest {
        window,
        last_user_message: last_user_message.to_string(),
        user_comment: normalize_optional(params.user_comment),
        task_hint: normalize_optional(params.task_hint),
    })
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Parse the upstream model's reply into a [`RewriteResult`].
///
/// The reply is expected to be a strict-JSON object but models sometimes
/// wrap it in Markdown code fences; fences are stripped before parsing.
/// Fails with `malformed_upstream_response` when the reply is not a JSON
/// object, when no non-empty `suggested_prompt` can be extracted, or when
/// the extracted prompt contains a generic-reference marker.
///
/// Enforced on success: `alternatives` truncated to [`MAX_ALTERNATIVES`],
/// `confidence` clamped to [0.0, 1.0].
pub fn parse_rewrite_result(raw: &str) -> Result<RewriteResult, CoachErrorResponse> {
    let text = strip_code_fences(raw.trim());

    let value: Value = serde_json::from_str(text).map_err(|e| {
        log::warn!("Upstream reply is not valid JSON: {e}");
        CoachErrorResponse::canonical(CoachErrorCode::MalformedUpstreamResponse)
    })?;
    if !value.is_object() {
        return Err(CoachErrorResponse::canonical(
            CoachErrorCode::MalformedUpstreamResponse,
        ));
    }

    let suggested_prompt = value
        .get("suggested_prompt")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or("");
    if suggested_prompt.is_empty() {
        return Err(CoachErrorResponse::canonical(
            CoachErrorCode::MalformedUpstreamResponse,
        ));
    }
    if let Some(marker) = banned_marker(suggested_prompt) {
        // Rejected, not rephrased; the caller sees the violation.
        return Err(CoachErrorResponse::new(
            CoachErrorCode::MalformedUpstreamResponse,
            format!("Rewritten prompt is not self-contained (contains {marker:?})"),
        ));
    }

    let summary = value
        .get("summary")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("Unknown user goal.")
        .to_string();

    let root_causes = string_list(value.get("root_causes"));
    let mut alternatives = string_list(value.get("alternatives"));
    alternatives.truncate(MAX_ALTERNATIVES);

    let confidence = value
        .get("confidence")
        .and_then(Value::as_f64)
        .unwrap_or(DEFAULT_CONFIDENCE)
        .clamp(0.0, 1.0);

    Ok(RewriteResult {
        summary,
        root_causes,
        suggested_prompt: suggested_prompt.to_string(),
        alternatives,
        confidence,
    })
}

/// Return the first banned marker found in `prompt`, if any.
pub fn banned_marker(prompt: &str) -> Option<&'static str> {
    let lowered = prompt.to_lowercase();
    BANNED_MARKERS
        .iter()
        .copied()
        .find(|marker| lowered.contains(marker))
}

/// Coerce a JSON field into a list of non-blank strings.
///
/// Accepts either an array or a lone string; anything else yields an
/// empty list.
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

/// Strip a surrounding Markdown code fence, with or without a `json` tag.
fn strip_code_fences(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
