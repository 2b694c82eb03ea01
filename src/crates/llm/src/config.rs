//! Provider configuration, grounded on `llm::config::RemoteLlmConfig`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LlmError, Result};

fn default_timeout() -> Duration {
    Duration::from_secs(60)
}

/// Configuration for a remote LLM provider (API key, base URL, model id).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteLlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    #[serde(default = "default_timeout")]
    pub timeout: Duration,
}

impl RemoteLlmConfig {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self { api_key: api_key.into(), base_url: base_url.into(), model: model.into(), timeout: default_timeout() }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load from environment: `{env_var}` for the API key, with sane
    /// Anthropic defaults for base URL and model unless overridden.
    pub fn from_env(env_var: &str) -> Result<Self> {
        let api_key = std::env::var(env_var)
            .map_err(|_| LlmError::Config(format!("{env_var} is not set")))?;
        let base_url = std::env::var("ANTHROPIC_BASE_URL")
            .unwrap_or_else(|_| "https://api.anthropic.com".to_string());
        let model = std::env::var("ANTHROPIC_MODEL")
            .unwrap_or_else(|_| "claude-3-5-sonnet-20241022".to_string());
        Ok(Self::new(api_key, base_url, model))
    }
}
