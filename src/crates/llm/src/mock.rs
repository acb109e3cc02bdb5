//! A scripted, in-memory `AsyncLLM` double for tests.
//!
//! Feed it a queue of [`Completion`]s up front; each call to `completion`
//! pops the next one. Panics if the queue runs dry, so a test that
//! under-scripts its agent fails loudly instead of hanging on a fake network
//! call.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::error::{LlmError, Result};
use crate::types::{AsyncLLM, Completion, CompletionRequest};

pub struct ScriptedLLM {
    queue: Mutex<Vec<Completion>>,
    recorded: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedLLM {
    /// `script` is consumed front-to-back: `script[0]` answers the first call.
    pub fn new(script: Vec<Completion>) -> Self {
        let mut queue = script;
        queue.reverse();
        Self {
            queue: Mutex::new(queue),
            recorded: Mutex::new(Vec::new()),
        }
    }

    /// Requests seen so far, in call order — lets a test assert on what the
    /// engine actually sent (message history, tool list, tool_choice).
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.recorded.lock().expect("recorded lock poisoned").clone()
    }
}

#[async_trait]
impl AsyncLLM for ScriptedLLM {
    async fn completion(&self, request: CompletionRequest) -> Result<Completion> {
        self.recorded
            .lock()
            .expect("recorded lock poisoned")
            .push(request);

        self.queue
            .lock()
            .expect("queue lock poisoned")
            .pop()
            .ok_or_else(|| LlmError::Provider("ScriptedLLM queue exhausted".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContentBlock, Message, StopReason, Usage};

    fn completion(text: &str) -> Completion {
        Completion {
            content: vec![ContentBlock::TextRaw { text: text.to_string() }],
            stop_reason: StopReason::EndTurn,
            usage: Usage::default(),
        }
    }

    #[tokio::test]
    async fn pops_scripted_completions_in_order() {
        let llm = ScriptedLLM::new(vec![completion("first"), completion("second")]);
        let request = CompletionRequest::new(vec![Message::user("hi")], 100);

        let first = llm.completion(request.clone()).await.unwrap();
        let second = llm.completion(request).await.unwrap();

        assert_eq!(first.text(), "first");
        assert_eq!(second.text(), "second");
        assert_eq!(llm.requests().len(), 2);
    }

    #[tokio::test]
    async fn errors_when_queue_exhausted() {
        let llm = ScriptedLLM::new(vec![]);
        let request = CompletionRequest::new(vec![Message::user("hi")], 100);
        assert!(llm.completion(request).await.is_err());
    }
}
