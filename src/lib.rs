//! MCP server for the Prompt Coach.
//!
//! Exposes the `coach.suggest_better_prompt` tool over JSON-RPC 2.0 stdio
//! transport, compatible with any MCP-aware AI agent. The tool takes a recent
//! conversation window plus the user's last message and returns one rewritten,
//! self-contained prompt produced by an upstream generative model.

pub mod config;
pub mod handlers;
pub mod protocol;
pub mod server;

pub mod prompt;
pub mod rewrite;
pub mod schema;
pub mod upstream;
