pub mod health;
pub mod suggest_prompt;

use crate::config::ServerConfig;
use crate::protocol::{
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, SuggestPromptParams, ToolCallParams, ToolResult,
};
use crate::upstream::GeminiClient;

/// Dispatch a JSON-RPC request to the appropriate handler.
///
/// Returns `None` for notifications (no response required).
pub async fn dispatch(
    req: &JsonRpcRequest,
    config: &ServerConfig,
    upstream: &GeminiClient,
) -> Option<JsonRpcResponse> {
    match req.method.as_str() {
        "initialize" => {
            let result = serde_json::json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {
                    "tools": {}
                },
                "serverInfo": {
                    "name": "mcp-prompt-coach",
                    "version": env!("CARGO_PKG_VERSION")
                }
            });
            Some(JsonRpcResponse::success(req.id.clone(), result))
        }

        "notifications/initialized" => None,

        "ping" => Some(JsonRpcResponse::success(req.id.clone(), serde_json::json!({}))),

        "tools/list" => {
            let result = serde_json::json!({
                "tools": [
                    {
                        "name": "coach.suggest_better_prompt",
                        "description": "Analyze a disliked assistant answer and suggest one rewritten, self-contained prompt that would get a better one",
                        "inputSchema": {
                            "type": "object",
                            "required": ["last_user_message"],
                            "properties": {
                                "conversation_window": {
                                    "type": "array",
                                    "description": "Recent conversation turns, oldest first",
                                    "items": {
                                        "type": "object",
                                        "required": ["role", "text"],
                                        "properties": {
                                            "role": {
                                                "type": "string",
                                                "description": "Turn author, typically \"user\" or \"assistant\""
                                            },
                                            "text": {
                                                "type": "string",
                                                "description": "Turn content"
                                            }
                                        }
                                    }
                                },
                                "last_user_message": {
                                    "type": "string",
                                    "description": "The user's most recent message; must be non-empty"
                                },
                                "user_comment": {
                                    "type": "string",
                                    "description": "Optional free-text explanation of why the answer was disliked"
                                },
                                "task_hint": {
                                    "type": "string",
                                    "description": "Optional short hint about the task domain, e.g. \"coding\" or \"UI design\""
                                }
                            }
                        }
                    }
                ]
            });
            Some(JsonRpcResponse::success(req.id.clone(), result))
        }

        "tools/call" => {
            let params: ToolCallParams = match &req.params {
                Some(v) => match serde_json::from_value(v.clone()) {
                    Ok(p) => p,
                    Err(e) => {
                        return Some(JsonRpcResponse::error(
                            req.id.clone(),
                            JsonRpcError::invalid_params(format!(
                                "Invalid tools/call params: {e}"
                            )),
                        ));
                    }
                },
                None => {
                    return Some(JsonRpcResponse::error(
                        req.id.clone(),
                        JsonRpcError::invalid_params("Missing params for tools/call"),
                    ));
                }
            };

            let tool_result = dispatch_tool_call(&params, config, upstream).await;
            let result_json = serde_json::to_value(&tool_result)
                .expect("ToolResult must serialize to JSON Value");
            Some(JsonRpcResponse::success(req.id.clone(), result_json))
        }

        _ => Some(JsonRpcResponse::error(
            req.id.clone(),
            JsonRpcError::method_not_found(&req.method),
        )),
    }
}

async fn dispatch_tool_call(
    params: &ToolCallParams,
    config: &ServerConfig,
    upstream: &GeminiClient,
) -> ToolResult {
    match params.name.as_str() {
        "coach.suggest_better_prompt" => {
            let suggest_params: SuggestPromptParams = match &params.arguments {
                Some(v) => match serde_json::from_value(v.clone()) {
                    Ok(p) => p,
                    Err(e) => {
                        return ToolResult::error(format!(
                            "Invalid arguments for coach.suggest_better_prompt: {e}"
                        ));
                    }
                },
                None => {
                    return ToolResult::error(
                        "Missing arguments for coach.suggest_better_prompt",
                    );
                }
            };
            suggest_prompt::handle(suggest_params, config, upstream).await
        }

        "health" => health::handle(config).await,

        _ => ToolResult::error(format!("Unknown tool: {}", params.name)),
    }
}
