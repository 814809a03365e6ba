//! Unit-level tests for request validation, meta-prompt construction, and
//! upstream reply normalization.

use mcp_prompt_coach::prompt::build_meta_prompt;
use mcp_prompt_coach::protocol::{CoachErrorCode, SuggestPromptParams};
use mcp_prompt_coach::rewrite::{parse_rewrite_result, validate, ConversationTurn, MAX_ALTERNATIVES};

fn params(last: Option<&str>) -> SuggestPromptParams {
    SuggestPromptParams {
        conversation_window: Vec::new(),
        last_user_message: last.map(str::to_string),
        user_comment: None,
        task_hint: None,
    }
}

fn turn(role: &str, text: &str) -> ConversationTurn {
    ConversationTurn {
        role: role.to_string(),
        text: text.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Input validation
// ---------------------------------------------------------------------------

#[test]
fn missing_last_user_message_is_invalid_input() {
    let err = validate(params(None), 4).unwrap_err();
    assert_eq!(err.error.code, CoachErrorCode::InvalidInput);
}

#[test]
fn empty_last_user_message_is_invalid_input() {
    let err = validate(params(Some("")), 4).unwrap_err();
    assert_eq!(err.error.code, CoachErrorCode::InvalidInput);
}

#[test]
fn whitespace_last_user_message_is_invalid_input() {
    let err = validate(params(Some("   \n\t")), 4).unwrap_err();
    assert_eq!(err.error.code, CoachErrorCode::InvalidInput);
}

#[test]
fn window_keeps_only_most_recent_turns() {
    let mut p = params(Some("That didn't help"));
    p.conversation_window = vec![
        turn("user", "first"),
        turn("assistant", "second"),
        turn("user", "third"),
        turn("assistant", "fourth"),
        turn("user", "fifth"),
    ];

    let req = validate(p, 4).unwrap();
    assert_eq!(req.window.len(), 4);
    assert_eq!(req.window[0].text, "second");
    assert_eq!(req.window[3].text, "fifth");
}

#[test]
fn empty_text_turns_are_dropped_before_truncation() {
    let mut p = params(Some("help"));
    p.conversation_window = vec![
        turn("user", "keep me"),
        turn("assistant", "   "),
        turn("user", ""),
        turn("assistant", "also kept"),
    ];

    let req = validate(p, 4).unwrap();
    assert_eq!(req.window.len(), 2);
    assert_eq!(req.window[0].text, "keep me");
    assert_eq!(req.window[1].text, "also kept");
}

#[test]
fn optional_fields_are_trimmed_and_empty_treated_as_absent() {
    let mut p = params(Some("  help me  "));
    p.user_comment = Some("  too vague  ".to_string());
    p.task_hint = Some("   ".to_string());

    let req = validate(p, 4).unwrap();
    assert_eq!(req.last_user_message, "help me");
    assert_eq!(req.user_comment.as_deref(), Some("too vague"));
    assert!(req.task_hint.is_none());
}

// ---------------------------------------------------------------------------
// Meta-prompt construction
// ---------------------------------------------------------------------------

#[test]
fn meta_prompt_is_deterministic() {
    let mut p = params(Some("That didn't help"));
    p.conversation_window = vec![
        turn("user", "Explain quantum computing"),
        turn("assistant", "It's complicated."),
    ];
    p.user_comment = Some("too vague".to_string());

    let req = validate(p, 4).unwrap();
    let a = build_meta_prompt(&req);
    let b = build_meta_prompt(&req);
    assert_eq!(a, b, "identical requests must produce byte-identical prompts");
}

#[test]
fn meta_prompt_contains_context_sections() {
    let mut p = params(Some("That didn't help"));
    p.conversation_window = vec![
        turn("user", "Explain quantum computing"),
        turn("assistant", "It's complicated."),
    ];
    p.user_comment = Some("too vague".to_string());
    p.task_hint = Some("physics".to_string());

    let req = validate(p, 4).unwrap();
    let prompt = build_meta_prompt(&req);

    assert!(prompt.contains("USER: Explain quantum computing"));
    assert!(prompt.contains("ASSISTANT: It's complicated."));
    assert!(prompt.contains("Last user message (for focus):\nThat didn't help"));
    assert!(prompt.contains("User comment:\ntoo vague"));
    assert!(prompt.contains("Task hint:\nphysics"));
    assert!(prompt.contains("suggested_prompt"));
}

#[test]
fn meta_prompt_marks_absent_optionals() {
    let req = validate(params(Some("help")), 4).unwrap();
    let prompt = build_meta_prompt(&req);
    assert!(prompt.contains("User comment:\n(none)"));
    assert!(prompt.contains("Task hint:\n(none)"));
}

// ---------------------------------------------------------------------------
// Reply parsing and normalization
// ---------------------------------------------------------------------------

#[test]
fn well_formed_reply_parses() {
    let raw = r#"{
        "summary": "User wanted a concrete explanation",
        "root_causes": ["Answer was dismissive"],
        "suggested_prompt": "Explain quantum computing to me in simple terms with one analogy.",
        "alternatives": ["Walk me through quantum computing step by step."],
        "confidence": 0.8
    }"#;

    let result = parse_rewrite_result(raw).unwrap();
    assert_eq!(result.summary, "User wanted a concrete explanation");
    assert_eq!(result.root_causes.len(), 1);
    assert_eq!(result.alternatives.len(), 1);
    assert!((result.confidence - 0.8).abs() < f64::EPSILON);
}

#[test]
fn fenced_reply_parses() {
    let raw = "```json\n{\"suggested_prompt\": \"Explain closures to me with an example.\"}\n```";
    let result = parse_rewrite_result(raw).unwrap();
    assert_eq!(
        result.suggested_prompt,
        "Explain closures to me with an example."
    );
}

#[test]
fn untagged_fence_parses() {
    let raw = "```\n{\"suggested_prompt\": \"Show me a minimal flexbox layout.\"}\n```";
    assert!(parse_rewrite_result(raw).is_ok());
}

#[test]
fn alternatives_are_truncated_to_two() {
    let raw = r#"{
        "suggested_prompt": "Give me a CSS grid example.",
        "alternatives": ["a", "b", "c", "d", "e"]
    }"#;

    let result = parse_rewrite_result(raw).unwrap();
    assert_eq!(result.alternatives.len(), MAX_ALTERNATIVES);
    assert_eq!(result.alternatives, vec!["a", "b"]);
}

#[test]
fn confidence_is_clamped_to_unit_interval() {
    let high = parse_rewrite_result(r#"{"suggested_prompt": "x", "confidence": 3.5}"#).unwrap();
    assert_eq!(high.confidence, 1.0);

    let low = parse_rewrite_result(r#"{"suggested_prompt": "x", "confidence": -0.2}"#).unwrap();
    assert_eq!(low.confidence, 0.0);
}

#[test]
fn missing_confidence_defaults() {
    let result = parse_rewrite_result(r#"{"suggested_prompt": "x"}"#).unwrap();
    assert_eq!(result.confidence, 0.5);
}

#[test]
fn lone_string_root_cause_is_accepted() {
    let raw = r#"{"suggested_prompt": "x", "root_causes": "answer was too short"}"#;
    let result = parse_rewrite_result(raw).unwrap();
    assert_eq!(result.root_causes, vec!["answer was too short"]);
}

#[test]
fn non_json_reply_is_malformed() {
    let err = parse_rewrite_result("I'd be happy to help rewrite that prompt!").unwrap_err();
    assert_eq!(err.error.code, CoachErrorCode::MalformedUpstreamResponse);
}

#[test]
fn missing_suggested_prompt_is_malformed() {
    let err = parse_rewrite_result(r#"{"summary": "something"}"#).unwrap_err();
    assert_eq!(err.error.code, CoachErrorCode::MalformedUpstreamResponse);
}

#[test]
fn blank_suggested_prompt_is_malformed() {
    let err = parse_rewrite_result(r#"{"suggested_prompt": "   "}"#).unwrap_err();
    assert_eq!(err.error.code, CoachErrorCode::MalformedUpstreamResponse);
}

#[test]
fn generic_reference_markers_are_rejected() {
    let cases = [
        r#"{"suggested_prompt": "Explain Docker to the user in simple terms."}"#,
        r#"{"suggested_prompt": "Based on the previous discussion, expand the answer."}"#,
        r#"{"suggested_prompt": "Based on the Previous Discussion, expand the answer."}"#,
    ];

    for raw in cases {
        let err = parse_rewrite_result(raw).unwrap_err();
        assert_eq!(
            err.error.code,
            CoachErrorCode::MalformedUpstreamResponse,
            "marker should be rejected in {raw}"
        );
    }
}

#[test]
fn first_person_prompt_passes_marker_check() {
    let raw = r#"{"suggested_prompt": "Explain to me how users interact with my login page."}"#;
    assert!(parse_rewrite_result(raw).is_ok());
}

#[test]
fn parsing_is_stable_across_repeated_calls() {
    let raw = r#"{
        "summary": "s",
        "root_causes": ["r"],
        "suggested_prompt": "Explain lifetimes to me with a worked example.",
        "alternatives": [],
        "confidence": 0.6
    }"#;

    let a = serde_json::to_string(&parse_rewrite_result(raw).unwrap()).unwrap();
    let b = serde_json::to_string(&parse_rewrite_result(raw).unwrap()).unwrap();
    assert_eq!(a, b, "identical replies must normalize identically");
}
