//! Error type for gear processing and forwarding, covering not-found,
//! duplicate-id, LLM failure, and url-guard kinds surfaced by the
//! gear-to-gear message fabric. Mirrors the `EngineError` → `.code()` shape in
//! `engine-core::error` so both crates surface error kinds the same way at
//! the API boundary.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GearError>;

#[derive(Debug, Error)]
pub enum GearError {
    #[error("gear not found: {0}")]
    NotFound(String),

    #[error("duplicate gear id: {0}")]
    DuplicateId(String),

    #[error(transparent)]
    Url(#[from] engine_core::EngineError),

    #[error("LLM completion failed: {0}")]
    LlmFailure(#[from] llm::LlmError),

    #[error("storage error: {0}")]
    Storage(String),
}

impl GearError {
    pub fn code(&self) -> &'static str {
        match self {
            GearError::NotFound(_) => "NotFound",
            GearError::DuplicateId(_) => "DuplicateId",
            GearError::Url(inner) => inner.code(),
            GearError::LlmFailure(_) => "LLMFailure",
            GearError::Storage(_) => "StorageError",
        }
    }
}
