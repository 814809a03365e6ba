use std::time::Duration;

/// Default deadline for one upstream attempt (30 seconds).
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of most recent conversation turns kept in the window.
const DEFAULT_WINDOW_TURNS: usize = 4;

/// Default upstream endpoint (Gemini REST API).
const DEFAULT_UPSTREAM_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default upstream model.
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Server configuration loaded from environment variables.
///
/// Read-only after startup; every request sees the same values.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub api_key: String,
    pub upstream_url: String,
    pub model: String,
    pub request_timeout: Duration,
    pub window_turns: usize,
}

impl ServerConfig {
    /// Load configuration from environment.
    ///
    /// - `GEMINI_API_KEY` (required) — upstream API key
    /// - `COACH_UPSTREAM_URL` (optional) — upstream base URL
    /// - `COACH_MODEL` (optional, default `gemini-2.0-flash`)
    /// - `COACH_TIMEOUT_SECS` (optional, default 30) — deadline per upstream attempt
    /// - `COACH_WINDOW_TURNS` (optional, default 4) — conversation turns kept
    pub fn from_env() -> Result<Self, String> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| "GEMINI_API_KEY environment variable is not set".to_string())?;

        let upstream_url = std::env::var("COACH_UPSTREAM_URL")
            .unwrap_or_else(|_| DEFAULT_UPSTREAM_URL.to_string());

        let model = std::env::var("COACH_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let timeout_secs = match std::env::var("COACH_TIMEOUT_SECS") {
            Ok(val) => val
                .parse::<u64>()
                .map_err(|_| "COACH_TIMEOUT_SECS must be a positive integer".to_string())?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        let window_turns = match std::env::var("COACH_WINDOW_TURNS") {
            Ok(val) => val
                .parse::<usize>()
                .map_err(|_| "COACH_WINDOW_TURNS must be a non-negative integer".to_string())?,
            Err(_) => DEFAULT_WINDOW_TURNS,
        };

        Ok(Self {
            api_key,
            upstream_url,
            model,
            request_timeout: Duration::from_secs(timeout_secs),
            window_turns,
        })
    }
}
