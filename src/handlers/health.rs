use crate::config::ServerConfig;
use crate::protocol::ToolResult;

/// Health check: reports the configured upstream model.
pub async fn handle(config: &ServerConfig) -> ToolResult {
    let payload = serde_json::json!({
        "status": "ok",
        "model": config.model,
    });
    ToolResult::text(payload.to_string())
}
