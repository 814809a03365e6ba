//! Meta-prompt construction.
//!
//! Builds the single instruction sent to the upstream model. Construction is
//! deterministic: identical requests produce byte-identical prompts, so any
//! variability in results comes from the model alone.

use std::fmt::Write;

use crate::rewrite::RewriteRequest;

/// Fixed rewriter instructions sent ahead of the conversation context.
///
/// The model is told to produce exactly one first-person, self-contained
/// prompt (never several equally-weighted options), up to two minor
/// alternatives, and a confidence score, as strict JSON.
const REWRITER_INSTRUCTIONS: &str = r#"You are a PROMPT REWRITER for LLM chats.

You will receive:
- A short conversation between a USER and an ASSISTANT.
- The USER's most recent message.
- An optional user comment explaining why they disliked the last answer.
- An optional hint about the task domain.

Your job is to:
1. Infer what the user REALLY wanted, especially from the LAST user message.
2. Briefly understand why the last answer failed.
3. Produce a SINGLE, SELF-CONTAINED prompt that the user can send to the SAME assistant to get a much better answer.

CRITICAL RULES FOR "suggested_prompt":
- It MUST be written in the FIRST-PERSON perspective, as if the user is directly talking to the assistant.
  - Use "you" to refer to the assistant.
  - Use "I", "me", and "my" to refer to the user.
- Avoid generic phrases like "the user" or "users" when describing benefits.
  - Prefer phrasing such as "how it benefits me" or "how it improves my experience".
- It MUST NOT mention "the user", "the assistant", "previous discussion", "conversation above", "earlier answer", or thumbs-down feedback.
- It MUST be SELF-CONTAINED: it should make sense even if the assistant never saw the prior conversation.
- It MUST directly request the desired result (explanation, code, design, plan, etc.).
- It CAN add clarifying constraints based on context (e.g. "in simple terms", "with 3 concrete UX improvements", "step-by-step").
- It SHOULD be clear, concise, and specific.

Examples of BAD suggested_prompt (DO NOT WRITE THESE):
- "Based on the previous discussion, can you..."
- "Provide HTML/CSS for a login page for the user..."
- "Explain to the user how Docker works."
- "Explain how this improves the user's experience."

Examples of GOOD suggested_prompt (STYLE TO FOLLOW):
- "Explain Kubernetes pods to me in simple terms using a real-world analogy, and give me 3 concrete use cases."
- "Give me HTML/CSS for a simple login page, and include 3 specific modern UX improvements. Explain how each improvement helps me."
- "Explain how neural networks work to me in beginner-friendly language, using a clear analogy and a short example."

You will output STRICT JSON with these keys:
- "summary"
- "root_causes"
- "suggested_prompt"
- "alternatives" (at most 2 minor variations, may be empty)
- "confidence" (number between 0 and 1)"#;

/// Build the full instruction text for one validated request.
pub fn build_meta_prompt(request: &RewriteRequest) -> String {
    let mut convo = String::new();
    for turn in &request.window {
        let _ = writeln!(convo, "{}: {}", turn.role.to_uppercase(), turn.text);
    }
    let convo = convo.trim_end();

    format!(
        "{REWRITER_INSTRUCTIONS}\n\n\
         Full conversation:\n{convo}\n\n\
         Last user message (for focus):\n{last}\n\n\
         User comment:\n{comment}\n\n\
         Task hint:\n{hint}",
        last = request.last_user_message,
        comment = request.user_comment.as_deref().unwrap_or("(none)"),
        hint = request.task_hint.as_deref().unwrap_or("(none)"),
    )
}
