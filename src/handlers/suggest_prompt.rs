use crate::config::ServerConfig;
use crate::protocol::{SuggestPromptParams, ToolResult};
use crate::upstream::GeminiClient;
use crate::{prompt, rewrite};

/// Handle a `coach.suggest_better_prompt` tool call.
///
/// Linear flow: validate input, build the meta-prompt, invoke the upstream
/// model, normalize its reply into the fixed result shape. Validation
/// failures never reach the upstream.
pub async fn handle(
    params: SuggestPromptParams,
    config: &ServerConfig,
    upstream: &GeminiClient,
) -> ToolResult {
    let request = match rewrite::validate(params, config.window_turns) {
        Ok(r) => r,
        Err(err) => return err.into(),
    };

    let meta_prompt = prompt::build_meta_prompt(&request);

    let raw_reply = match upstream.generate(&meta_prompt).await {
        Ok(text) => text,
        Err(err) => return err.into(),
    };

    let result = match rewrite::parse_rewrite_result(&raw_reply) {
        Ok(r) => r,
        Err(err) => return err.into(),
    };

    let json = serde_json::to_string(&result).expect("RewriteResult must serialize to JSON string");
    ToolResult::text(format!("{json}\n"))
}
