//! Error types for the patch execution engine.
//!
//! `EngineError` covers the error kinds named in the design: validation
//! failures that abort a run before it starts, cycle detection, the URL
//! guard's SSRF rejections, outbound timeouts, downstream HTTP status
//! failures, and missing local functions.

use thiserror::Error;

/// Convenience result type using [`EngineError`].
pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {
    /// The patch definition itself is malformed: duplicate node ids, an edge
    /// referencing an unknown node, or a non-array `nodes`/`edges` field.
    #[error("invalid patch: {0}")]
    InvalidPatch(String),

    /// The node/edge set contains a cycle; no topological order exists.
    #[error("cycle detected in patch graph")]
    CycleDetected,

    /// `validateHttpUrl` rejected a malformed URL or disallowed scheme.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// `validateHttpUrl` rejected a URL resolving to a loopback, link-local,
    /// or private host not on the allow-list.
    #[error("disallowed host: {0}")]
    DisallowedHost(String),

    /// An outbound call exceeded its deadline.
    #[error("operation timed out after {0}ms")]
    Timeout(u64),

    /// A downstream HTTP node responded with a non-2xx status.
    #[error("downstream returned HTTP {code}: {reason}")]
    HttpStatus { code: u16, reason: String },

    /// A `local` node named a function not present in the registry.
    #[error("local function not found: {0}")]
    LocalFnMissing(String),

    /// The node executor itself failed (propagated from a local function or
    /// a malformed HTTP response body).
    #[error("node execution failed: {0}")]
    NodeExecution(String),

    /// The outbound reqwest client returned an error that wasn't a clean
    /// timeout or non-2xx status (connection refused, DNS failure, etc).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EngineError {
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::InvalidPatch(_) => "InvalidPatch",
            EngineError::CycleDetected => "CycleDetected",
            EngineError::InvalidUrl(_) => "InvalidUrl",
            EngineError::DisallowedHost(_) => "DisallowedHost",
            EngineError::Timeout(_) => "Timeout",
            EngineError::HttpStatus { .. } => "HttpStatus",
            EngineError::LocalFnMissing(_) => "LocalFnMissing",
            EngineError::NodeExecution(_) => "NodeExecution",
            EngineError::Transport(_) => "Transport",
            EngineError::Serialization(_) => "Serialization",
        }
    }
}
