//! The LLM Adapter: an opaque collaborator given an ordered message list
//! that returns either a full text completion or a token stream plus an
//! `on_finish` callback carrying the final assembled assistant message.
//! Implementations must tolerate null/empty content and stringify
//! non-string assistant content.
//!
//! Grounded on `langgraph_core::llm::traits::ChatModel` (the `chat`/`stream`
//! async-trait pair) and `llm::error::LlmError`, generalized from a
//! multi-provider registry down to a single opaque trait. Ships two
//! implementations: [`claude::ClaudeAdapter`] (reshaped from
//! `llm/src/remote/claude.rs`) and [`null::NullAdapter`] (echoes the last
//! user message back, used by tests and the `echoGear` demo path so the
//! crate runs end-to-end without a configured API key).

pub mod claude;
pub mod config;
pub mod error;
pub mod null;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use config::RemoteLlmConfig;
pub use error::{LlmError, Result};

/// A message role. Unknown roles are coerced to `User` on ingress, matching
/// the Gear model's role-coercion rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single chat message. `content` is always a string by the time it
/// reaches an adapter — non-string assistant content is stringified by the
/// caller before constructing this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// A token chunk plus the final assembled response, modeling a "token
/// stream plus `onFinish`" shape without requiring a real streaming
/// transport: callers that only need the final text can ignore `chunks`
/// and read `finished`.
pub struct ChatStream {
    pub chunks: Vec<String>,
    pub finished: String,
}

/// The opaque LLM completion collaborator.
#[async_trait]
pub trait LlmAdapter: Send + Sync {
    /// Blocking completion: given the ordered message list, return the
    /// assistant's text response.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;

    /// Streaming completion. The default implementation calls [`complete`]
    /// and wraps the whole response as a single chunk — sufficient for
    /// adapters that don't support true token streaming.
    async fn stream(&self, messages: &[ChatMessage]) -> Result<ChatStream> {
        let text = self.complete(messages).await?;
        Ok(ChatStream { chunks: vec![text.clone()], finished: text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::null::NullAdapter;

    #[tokio::test]
    async fn default_stream_wraps_complete() {
        let adapter = NullAdapter;
        let messages = vec![ChatMessage::user("hi")];
        let stream = adapter.stream(&messages).await.unwrap();
        assert_eq!(stream.finished, "hi");
        assert_eq!(stream.chunks, vec!["hi".to_string()]);
    }
}
