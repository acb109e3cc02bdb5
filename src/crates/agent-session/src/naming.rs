//! Short LLM-generated labels attached to `ReviewResult` events: an
//! `app_name` on the very first review, a `commit_message` on every
//! completion (§4.6 steps 4a/4c). Grounded on the same `llm::AsyncLLM`
//! contract the actors use, but with a tiny `max_tokens` budget since the
//! output is a few words.
//!
//! Failures here are never fatal to the session: a naming call that errors
//! or returns unusable text falls back to a fixed default rather than
//! aborting the request.

use llm::{AsyncLLM, CompletionRequest, Message};
use tracing::warn;

const NAMING_MAX_TOKENS: usize = 64;

pub async fn generate_app_name(user_prompt: &str, llm: &dyn AsyncLLM) -> String {
    let system = "Invent a short, lowercase, hyphen-separated project slug (2-4 words, no punctuation) \
        for the application described by the user. Reply with only the slug.";
    match complete_one_line(llm, system, user_prompt).await {
        Some(name) => name,
        None => {
            warn!("falling back to default app_name");
            "generated-app".to_string()
        }
    }
}

pub async fn generate_commit_message(user_prompt: &str, llm: &dyn AsyncLLM) -> String {
    let system = "Write a single-line, imperative-mood git commit message summarizing the change \
        the user asked for. Reply with only the commit message, no quotes.";
    match complete_one_line(llm, system, user_prompt).await {
        Some(message) => message,
        None => {
            warn!("falling back to default commit_message");
            "Update application".to_string()
        }
    }
}

async fn complete_one_line(llm: &dyn AsyncLLM, system: &str, user_prompt: &str) -> Option<String> {
    let request = CompletionRequest::new(vec![Message::user(user_prompt)], NAMING_MAX_TOKENS).with_system(system);
    let completion = match llm.completion(request).await {
        Ok(completion) => completion,
        Err(e) => {
            warn!(error = %e, "naming completion failed");
            return None;
        }
    };
    let text = completion.text();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.lines().next().unwrap_or(trimmed).to_string())
    }
}
