use serde::{Deserialize, Serialize};

use super::request::RpcId;

// ---------------------------------------------------------------------------
// JSON-RPC 2.0 response layer
// ---------------------------------------------------------------------------

/// JSON-RPC 2.0 response envelope.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RpcId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Option<RpcId>, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<RpcId>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// JSON-RPC 2.0 error object (protocol-level errors).
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl JsonRpcError {
    pub fn parse_error() -> Self {
        Self { code: -32700, message: "Parse error".into(), data: None }
    }

    pub fn invalid_request() -> Self {
        Self { code: -32600, message: "Invalid Request".into(), data: None }
    }

    pub fn invalid_request_with(detail: impl Into<String>) -> Self {
        Self { code: -32600, message: detail.into(), data: None }
    }

    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: format!("Method not found: {method}"),
            data: None,
        }
    }

    pub fn invalid_params(detail: impl Into<String>) -> Self {
        Self { code: -32602, message: detail.into(), data: None }
    }

    pub fn internal_error(detail: impl Into<String>) -> Self {
        Self { code: -32603, message: detail.into(), data: None }
    }
}

// ---------------------------------------------------------------------------
// MCP tool result layer (returned inside a *successful* JSON-RPC response)
// ---------------------------------------------------------------------------

/// MCP tool call result wrapper.
#[derive(Debug, Clone, Serialize)]
pub struct ToolResult {
    pub content: Vec<ToolResultContent>,
    #[serde(rename = "isError", skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

/// A single content block inside a tool result.
#[derive(Debug, Clone, Serialize)]
pub struct ToolResultContent {
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: String,
}

impl ToolResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolResultContent {
                content_type: "text".into(),
                text: text.into(),
            }],
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolResultContent {
                content_type: "text".into(),
                text: text.into(),
            }],
            is_error: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Coach domain-level error types
// ---------------------------------------------------------------------------

/// Coach error code (v0)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoachErrorCode {
    InvalidInput,
    UpstreamError,
    UpstreamTimeout,
    UpstreamRefusal,
    MalformedUpstreamResponse,
}

impl CoachErrorCode {
    /// Map to the corresponding JSON-RPC 2.0 error code.
    ///
    /// Client-caused input failures → -32602 (Invalid params)
    /// Upstream/server-side failures → -32603 (Internal error)
    pub fn json_rpc_code(&self) -> i32 {
        match self {
            Self::InvalidInput => -32602,
            Self::UpstreamError
            | Self::UpstreamTimeout
            | Self::UpstreamRefusal
            | Self::MalformedUpstreamResponse => -32603,
        }
    }

    /// Whether exactly one transparent retry of the upstream call is allowed.
    ///
    /// Only infrastructure failures are retried; a refusal or a malformed
    /// reply would just be replayed against the same model state.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::UpstreamError | Self::UpstreamTimeout)
    }
}

/// Coach error object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoachError {
    pub code: CoachErrorCode,
    pub message: String,
}

/// Coach error response (top-level)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoachErrorResponse {
    pub error: CoachError,
}

impl CoachErrorResponse {
    pub fn new(code: CoachErrorCode, message: impl Into<String>) -> Self {
        Self {
            error: CoachError {
                code,
                message: message.into(),
            },
        }
    }

    /// Construct with the canonical message for a given code.
    pub fn canonical(code: CoachErrorCode) -> Self {
        let message = match &code {
            CoachErrorCode::InvalidInput => "Last user message is missing or empty",
            CoachErrorCode::UpstreamError => "Upstream model request failed",
            CoachErrorCode::UpstreamTimeout => "Upstream model did not respond before the deadline",
            CoachErrorCode::UpstreamRefusal => "Upstream model declined to answer",
            CoachErrorCode::MalformedUpstreamResponse => {
                "Upstream model reply did not contain a usable rewritten prompt"
            }
        };
        Self::new(code, message)
    }
}

/// Convert a coach domain error into a JSON-RPC error.
///
/// The JSON-RPC `code` is derived from the coach error code.
/// The JSON-RPC `message` is the human-readable coach message.
/// The full coach error object is carried in `data` for structured clients.
impl From<CoachErrorResponse> for JsonRpcError {
    fn from(coach: CoachErrorResponse) -> Self {
        Self {
            code: coach.error.code.json_rpc_code(),
            message: coach.error.message.clone(),
            data: Some(
                serde_json::to_value(&coach).expect("CoachErrorResponse must serialize to JSON Value"),
            ),
        }
    }
}

/// Convert a coach domain error into a tool result with `isError: true`.
///
/// The text content is the JSON-serialized `CoachErrorResponse`, preserving
/// the structured error for clients that inspect tool output.
impl From<CoachErrorResponse> for ToolResult {
    fn from(coach: CoachErrorResponse) -> Self {
        let json =
            serde_json::to_string(&coach).expect("CoachErrorResponse must serialize to JSON string");
        Self::error(format!("{json}\n"))
    }
}
