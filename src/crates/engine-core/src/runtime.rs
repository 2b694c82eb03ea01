//! Patch Runtime (DAG Engine) — spec.md §4.D.
//!
//! Grounded on `orchestrator::execution::workflow_engine::WorkflowExecutionEngine`
//! (node/edge parsing from JSON, `execute_node` dispatch by kind) generalized
//! from the teacher's ad-hoc `"task"`/`"conditional"` node kinds to the
//! spec's `local`/`http` kinds, and from the teacher's flat
//! `WorkflowExecutionState` to the strict 0/1/N-incoming-edge input
//! resolution rule. The lazy event sequence is an `mpsc::Receiver<RunEvent>`
//! fed by a spawned task, grounded on
//! `orchestrator::execution::streaming::ExecutionStreamHandler`'s
//! `mpsc::Sender` + `send_*` helpers, wrapped as a `Stream` via
//! `tokio_stream::wrappers::ReceiverStream`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;

use crate::error::EngineError;
use crate::event::{RunEvent, RunStartupError};
use crate::model::{NodeInput, NodeKind, PatchDefinition};
use crate::registry::LocalFunctionRegistry;
use crate::topo::topo_sort;
use crate::urlguard::{validate_http_url, AllowList, DEFAULT_TIMEOUT};

/// The lazy, single-producer event stream a run produces.
pub type RunEventStream = ReceiverStream<RunEvent>;

/// Outcome of [`PatchEngine::try_run`]: either the live event stream, or a
/// startup failure that occurred before any `RunStart` was committed
/// (spec.md §4.D step 2-3, §7).
pub enum RunOutcome {
    Started(RunEventStream),
    StartupFailed(RunStartupError),
}

/// Executes patches against the local function registry and outbound HTTP.
/// Sequential within one run (spec.md §5); independent runs may execute
/// concurrently since each owns its own `outputs` map and channel.
#[derive(Clone)]
pub struct PatchEngine {
    registry: Arc<LocalFunctionRegistry>,
    http: reqwest::Client,
    allow_list: AllowList,
    http_timeout: Duration,
}

impl PatchEngine {
    pub fn new(registry: Arc<LocalFunctionRegistry>) -> Self {
        Self {
            registry,
            http: reqwest::Client::new(),
            allow_list: AllowList::default(),
            http_timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_allow_list(mut self, allow_list: AllowList) -> Self {
        self.allow_list = allow_list;
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    /// Run `patch` against `initial_input`. Validates the patch and computes
    /// a topological order before committing to a stream; a validation or
    /// cycle failure surfaces as [`RunOutcome::StartupFailed`] instead of a
    /// `NodeError` (spec.md §4.D step 2-3, §7).
    pub fn try_run(&self, patch: PatchDefinition, initial_input: Value) -> RunOutcome {
        if let Err(message) = patch.validate() {
            return RunOutcome::StartupFailed(RunStartupError {
                error: message,
                code: EngineError::InvalidPatch(String::new()).code().to_string(),
            });
        }

        let ids: Vec<String> = patch.nodes.iter().map(|n| n.id.clone()).collect();
        let order = match topo_sort(&ids, &patch.edges) {
            Ok(order) => order,
            Err(err) => {
                return RunOutcome::StartupFailed(RunStartupError {
                    error: err.to_string(),
                    code: err.code().to_string(),
                })
            }
        };

        let (tx, rx) = mpsc::channel(32);
        let engine = self.clone();
        tokio::spawn(async move {
            engine.drive(patch, order, initial_input, tx).await;
        });

        RunOutcome::Started(ReceiverStream::new(rx))
    }

    async fn drive(
        &self,
        patch: PatchDefinition,
        order: Vec<String>,
        initial_input: Value,
        tx: mpsc::Sender<RunEvent>,
    ) {
        let run_id = Uuid::new_v4();
        if tx.send(RunEvent::run_start(run_id)).await.is_err() {
            return;
        }

        let nodes_by_id: HashMap<&str, &crate::model::Node> =
            patch.nodes.iter().map(|n| (n.id.as_str(), n)).collect();
        let mut outputs: HashMap<String, Value> = HashMap::new();

        for node_id in &order {
            let node = nodes_by_id.get(node_id.as_str()).expect("order only contains known ids");
            let input = resolve_input(node_id, &patch, &outputs, &initial_input);

            if tx.send(RunEvent::node_start(node_id.clone(), input.clone())).await.is_err() {
                return;
            }

            match self.execute_node(node, input).await {
                Ok(output) => {
                    outputs.insert(node_id.clone(), output.clone());
                    if tx.send(RunEvent::node_success(node_id.clone(), output)).await.is_err() {
                        return;
                    }
                }
                Err(err) => {
                    let _ = tx.send(RunEvent::node_error(node_id.clone(), err.to_string())).await;
                    let _ = tx.send(RunEvent::run_complete(run_id)).await;
                    return;
                }
            }
        }

        let _ = tx.send(RunEvent::run_complete(run_id)).await;
    }

    async fn execute_node(&self, node: &crate::model::Node, input: Value) -> crate::error::Result<Value> {
        match node.kind {
            NodeKind::Local => {
                let name = node
                    .r#fn
                    .as_deref()
                    .ok_or_else(|| EngineError::InvalidPatch(format!("node '{}' missing fn", node.id)))?;
                let f = self.registry.lookup(name)?;
                f(input).await
            }
            NodeKind::Http => {
                let raw_url = node
                    .url
                    .as_deref()
                    .ok_or_else(|| EngineError::InvalidPatch(format!("node '{}' missing url", node.id)))?;
                let url = validate_http_url(raw_url, &self.allow_list)?;

                let response = tokio::time::timeout(
                    self.http_timeout,
                    self.http
                        .post(url)
                        .header("Content-Type", "application/json")
                        .header("Accept", "application/json")
                        .json(&input)
                        .send(),
                )
                .await
                .map_err(|_| EngineError::Timeout(self.http_timeout.as_millis() as u64))??;

                if !response.status().is_success() {
                    let code = response.status().as_u16();
                    let reason = response.status().canonical_reason().unwrap_or("unknown").to_string();
                    return Err(EngineError::HttpStatus { code, reason });
                }

                let body: Value = response.json().await?;
                Ok(body)
            }
        }
    }
}

/// Resolve a node's input per spec.md §4.D step 4a: zero incoming edges ->
/// the run's initial input; one incoming edge -> that source's output; two
/// or more -> an ordered list of source outputs, in edge-list order.
fn resolve_input(
    node_id: &str,
    patch: &PatchDefinition,
    outputs: &HashMap<String, Value>,
    initial_input: &Value,
) -> Value {
    let incoming: Vec<&crate::model::Edge> =
        patch.edges.iter().filter(|e| e.target == node_id).collect();

    match incoming.len() {
        0 => initial_input.clone(),
        1 => outputs.get(&incoming[0].source).cloned().unwrap_or(Value::Null),
        _ => {
            let values: Vec<Value> =
                incoming.iter().map(|e| outputs.get(&e.source).cloned().unwrap_or(Value::Null)).collect();
            NodeInput::FanIn(values).into_value()
        }
    }
}
