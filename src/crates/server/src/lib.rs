//! The HTTP surface for the patch/gear execution engine: the Inlet Endpoint
//! (§4.H), the Gear HTTP Endpoint (§4.F) and Status Event Bus subscription
//! (§4.G), Patch/Gear CRUD, and the Storage Adapter (§4.I) that backs all of
//! it. Routing and error handling are grounded on `orchestrator::api`'s
//! `routes`/`error`/`response` module split.

pub mod api;
pub mod config;
pub mod error;
pub mod patch_record;
pub mod state;
pub mod storage;

use std::sync::Arc;

use config::Config;
use engine_core::PatchEngine;
use engine_core::registry;
use gear::{GearProcessor, StatusBus};
use llm::claude::ClaudeAdapter;
use llm::{LlmAdapter, RemoteLlmConfig};
use state::{AppState, GearLocks};
use storage::{InMemoryStorage, Storage};

/// Assembles the default, in-process `AppState`: the global local function
/// registry, a `ClaudeAdapter` configured from `config`, and an
/// `InMemoryStorage` instance. Swap `storage` after construction (or extend
/// this function) to run against a different backend.
pub fn build_state(config: Config) -> AppState {
    let llm_config = RemoteLlmConfig::new(config.llm_api_key.clone(), config.llm_base_url.clone(), config.llm_model.clone());
    let llm_adapter = Arc::new(ClaudeAdapter::new(llm_config));
    build_state_with_llm(config, llm_adapter)
}

/// Same as [`build_state`] but with the LLM adapter supplied by the caller —
/// used by tests to swap in [`llm::null::NullAdapter`] so the HTTP surface
/// runs end-to-end without a configured provider key.
pub fn build_state_with_llm(config: Config, llm_adapter: Arc<dyn LlmAdapter>) -> AppState {
    let patch_engine = PatchEngine::new(Arc::new(registry::seeded()))
        .with_allow_list(config.outbound_allow_list.clone())
        .with_http_timeout(config.http_timeout);

    let mut gear_processor = GearProcessor::new(llm_adapter).with_allow_list(config.outbound_allow_list.clone());
    if let Some(origin) = &config.public_origin {
        gear_processor = gear_processor.with_public_origin(origin.clone());
    }

    let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::new());

    AppState {
        storage,
        patch_engine,
        gear_processor: Arc::new(gear_processor),
        status_bus: Arc::new(StatusBus::new()),
        gear_locks: Arc::new(GearLocks::new()),
        config: Arc::new(config),
    }
}
