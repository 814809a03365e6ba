pub mod request;
pub mod response;

pub use request::{
    ClientInfo, InitializeParams, JsonRpcRequest, RpcId, SuggestPromptParams, ToolCallParams,
};
pub use response::{
    CoachError, CoachErrorCode, CoachErrorResponse, JsonRpcError, JsonRpcResponse, ToolResult,
    ToolResultContent,
};
