//! Shared application state, grounded on `orchestrator::api::routes::AppState`
//! (a small `Clone` struct of `Arc`-wrapped collaborators threaded through
//! every handler via axum's `State` extractor).

use std::sync::Arc;

use dashmap::DashMap;
use engine_core::PatchEngine;
use gear::{GearProcessor, StatusBus};
use tokio::sync::Mutex;

use crate::config::Config;
use crate::storage::Storage;

/// Per-gear mutex registry enforcing at-most-one concurrent processing per
/// gear, serializing ingress at the storage layer rather than inside the
/// `Gear` value itself, so it can stay a plain `Clone`/`Serialize` data
/// type.
#[derive(Default)]
pub struct GearLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl GearLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock_for(&self, gear_id: &str) -> Arc<Mutex<()>> {
        self.locks.entry(gear_id.to_string()).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub patch_engine: PatchEngine,
    pub gear_processor: Arc<GearProcessor>,
    pub status_bus: Arc<StatusBus>,
    pub gear_locks: Arc<GearLocks>,
    pub config: Arc<Config>,
}
