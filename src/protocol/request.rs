use serde::{Deserialize, Serialize};

use crate::rewrite::ConversationTurn;

/// JSON-RPC 2.0 ID — may be a number or string per spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcId {
    Number(i64),
    Str(String),
}

/// JSON-RPC 2.0 request envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Option<RpcId>,
    pub method: String,
    pub params: Option<serde_json::Value>,
}

/// Parameters for the `coach.suggest_better_prompt` tool.
///
/// `last_user_message` is deserialized as optional so a missing field
/// surfaces as a domain `invalid_input` error instead of a decode failure.
#[derive(Debug, Clone, Deserialize)]
pub struct SuggestPromptParams {
    #[serde(default)]
    pub conversation_window: Vec<ConversationTurn>,
    pub last_user_message: Option<String>,
    #[serde(default)]
    pub user_comment: Option<String>,
    #[serde(default)]
    pub task_hint: Option<String>,
}

/// MCP `initialize` params.
#[derive(Debug, Clone, Deserialize)]
pub struct InitializeParams {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: Option<String>,
    #[serde(rename = "clientInfo")]
    pub client_info: Option<ClientInfo>,
}

/// Client information sent during `initialize`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientInfo {
    pub name: Option<String>,
    pub version: Option<String>,
}

/// Parameters for `tools/call`.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    pub name: String,
    pub arguments: Option<serde_json::Value>,
}
