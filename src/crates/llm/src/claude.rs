//! Anthropic Claude adapter. Reshaped from `llm/src/remote/claude.rs`:
//! same request/response wire types and system-prompt-splitting logic, but
//! implemented against the local [`crate::LlmAdapter`] trait instead of
//! `langgraph_core::llm::ChatModel`, since this crate no longer depends on
//! the agent-framework crate that trait lived in.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::RemoteLlmConfig;
use crate::error::{LlmError, Result};
use crate::{ChatMessage, LlmAdapter, Role};

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Clone)]
pub struct ClaudeAdapter {
    config: RemoteLlmConfig,
    client: Client,
}

impl ClaudeAdapter {
    pub fn new(config: RemoteLlmConfig) -> Self {
        let client = Client::builder().timeout(config.timeout).build().expect("failed to build HTTP client");
        Self { config, client }
    }

    /// Claude requires system messages to be separated from the
    /// conversation; fold any number of `system` messages into one string
    /// and leave the rest as an ordered user/assistant turn sequence.
    fn split_system(&self, messages: &[ChatMessage]) -> (Option<String>, Vec<WireMessage>) {
        let mut system_prompt: Option<String> = None;
        let mut wire = Vec::new();

        for msg in messages {
            match msg.role {
                Role::System => {
                    let content = msg.content.as_str();
                    system_prompt = Some(match system_prompt {
                        Some(existing) => format!("{existing}\n\n{content}"),
                        None => content.to_string(),
                    });
                }
                Role::User => wire.push(WireMessage { role: "user".to_string(), content: msg.content.clone() }),
                Role::Assistant => {
                    wire.push(WireMessage { role: "assistant".to_string(), content: msg.content.clone() })
                }
            }
        }

        (system_prompt, wire)
    }
}

#[async_trait]
impl LlmAdapter for ClaudeAdapter {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let url = format!("{}/v1/messages", self.config.base_url);
        let (system, wire_messages) = self.split_system(messages);

        let request = WireRequest {
            model: self.config.model.clone(),
            messages: wire_messages,
            system,
            max_tokens: 4096,
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 => LlmError::Authentication(body),
                429 => LlmError::RateLimitExceeded(body),
                _ => LlmError::Provider(format!("Claude API error {status}: {body}")),
            });
        }

        let parsed: WireResponse =
            response.json().await.map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        // Content blocks tolerate null/empty text.
        let text = parsed
            .content
            .iter()
            .filter(|b| b.block_type == "text")
            .filter_map(|b| b.text.as_deref())
            .collect::<Vec<_>>()
            .join("");

        Ok(text)
    }
}

#[derive(Debug, Serialize)]
struct WireRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    max_tokens: usize,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    content: Vec<WireContentBlock>,
}

#[derive(Debug, Deserialize)]
struct WireContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RemoteLlmConfig {
        RemoteLlmConfig::new("test-key", "https://api.anthropic.com", "claude-3-5-sonnet-20241022")
    }

    #[test]
    fn splits_system_messages_from_conversation() {
        let adapter = ClaudeAdapter::new(config());
        let messages = vec![ChatMessage::system("be terse"), ChatMessage::user("hello")];
        let (system, wire) = adapter.split_system(&messages);
        assert_eq!(system, Some("be terse".to_string()));
        assert_eq!(wire.len(), 1);
        assert_eq!(wire[0].role, "user");
    }

    #[test]
    fn folds_multiple_system_messages() {
        let adapter = ClaudeAdapter::new(config());
        let messages = vec![ChatMessage::system("a"), ChatMessage::system("b")];
        let (system, wire) = adapter.split_system(&messages);
        assert_eq!(system, Some("a\n\nb".to_string()));
        assert!(wire.is_empty());
    }
}
