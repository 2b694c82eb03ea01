//! Environment-driven configuration, grounded on the `PORT`/`HOST`
//! env-var-reading half of `orchestrator-server.rs`'s `main()` — stripped of
//! the teacher's SSL/LDAP/database configuration file, since none of it has
//! a counterpart in this crate's scope.

use std::net::SocketAddr;
use std::time::Duration;

use engine_core::urlguard::AllowList;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    MissingEnv(&'static str),
    #[error("invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    /// Required secret: the LLM provider API key.
    pub llm_api_key: String,
    pub llm_base_url: String,
    pub llm_model: String,
    /// Optional: resolves relative `outputUrls`.
    pub public_origin: Option<String>,
    pub outbound_allow_list: AllowList,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let bind_addr = format!("{host}:{port}")
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT/HOST", format!("{host}:{port}")))?;

        let llm_api_key =
            std::env::var("ANTHROPIC_API_KEY").map_err(|_| ConfigError::MissingEnv("ANTHROPIC_API_KEY"))?;
        let llm_base_url =
            std::env::var("ANTHROPIC_BASE_URL").unwrap_or_else(|_| "https://api.anthropic.com".to_string());
        let llm_model =
            std::env::var("ANTHROPIC_MODEL").unwrap_or_else(|_| "claude-3-5-sonnet-20241022".to_string());

        let public_origin = std::env::var("PUBLIC_ORIGIN").ok();

        let outbound_allow_list = std::env::var("OUTBOUND_ALLOW_LIST")
            .map(|raw| AllowList::new(raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from).collect()))
            .unwrap_or_default();

        let http_timeout_secs: u64 = std::env::var("HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        Ok(Self {
            bind_addr,
            llm_api_key,
            llm_base_url,
            llm_model,
            public_origin,
            outbound_allow_list,
            http_timeout: Duration::from_secs(http_timeout_secs),
        })
    }

    /// Config suitable for tests: no real API key required, everything local.
    pub fn for_tests() -> Self {
        Self {
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            llm_api_key: "test-key".to_string(),
            llm_base_url: "https://api.anthropic.com".to_string(),
            llm_model: "claude-3-5-sonnet-20241022".to_string(),
            public_origin: Some("http://localhost:8080".to_string()),
            outbound_allow_list: AllowList::default(),
            http_timeout: Duration::from_secs(30),
        }
    }
}
