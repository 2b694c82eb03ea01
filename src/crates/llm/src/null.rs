//! A no-op LLM adapter: echoes the last user message's content back as the
//! assistant response. Used in tests and as the default in development so
//! the engine runs end-to-end without a configured provider key.

use async_trait::async_trait;

use crate::error::Result;
use crate::{ChatMessage, LlmAdapter, Role};

pub struct NullAdapter;

#[async_trait]
impl LlmAdapter for NullAdapter {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let last_user = messages.iter().rev().find(|m| m.role == Role::User);
        Ok(last_user.map(|m| m.content.clone()).unwrap_or_default())
    }
}
