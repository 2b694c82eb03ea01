//! Error types for LLM provider implementations. Trimmed from
//! `llm::error::LlmError` in the teacher crate down to the variants a
//! single-provider opaque adapter actually raises.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LlmError>;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error("invalid response from provider: {0}")]
    InvalidResponse(String),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl LlmError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, LlmError::Http(_) | LlmError::RateLimitExceeded(_))
    }
}
