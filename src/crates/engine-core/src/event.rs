//! `RunEvent` — the typed lifecycle record the DAG engine emits for every
//! run. Mirrors the tagged-enum streaming events the teacher crate emits
//! for workflow execution (`ExecutionEvent`/`StreamEvent`), generalized to
//! the five-variant shape spec.md §3 requires.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunEventError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl RunEventError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), stack: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum RunEvent {
    RunStart { run_id: Uuid, ts: DateTime<Utc> },
    NodeStart { node_id: String, ts: DateTime<Utc>, input: Value },
    NodeSuccess { node_id: String, ts: DateTime<Utc>, output: Value },
    NodeError { node_id: String, ts: DateTime<Utc>, error: RunEventError },
    RunComplete { run_id: Uuid, ts: DateTime<Utc> },
}

impl RunEvent {
    pub fn run_start(run_id: Uuid) -> Self {
        RunEvent::RunStart { run_id, ts: Utc::now() }
    }

    pub fn node_start(node_id: impl Into<String>, input: Value) -> Self {
        RunEvent::NodeStart { node_id: node_id.into(), ts: Utc::now(), input }
    }

    pub fn node_success(node_id: impl Into<String>, output: Value) -> Self {
        RunEvent::NodeSuccess { node_id: node_id.into(), ts: Utc::now(), output }
    }

    pub fn node_error(node_id: impl Into<String>, message: impl Into<String>) -> Self {
        RunEvent::NodeError {
            node_id: node_id.into(),
            ts: Utc::now(),
            error: RunEventError::new(message),
        }
    }

    pub fn run_complete(run_id: Uuid) -> Self {
        RunEvent::RunComplete { run_id, ts: Utc::now() }
    }
}

/// A startup failure that occurs before any `RunStart` is committed to the
/// stream (invalid patch load, invalid id). Callers of the inlet endpoint
/// surface these as a single `error` SSE frame rather than a `NodeError`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStartupError {
    pub error: String,
    pub code: String,
}
