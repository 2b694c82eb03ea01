//! The Local Function Registry: a process-wide `name -> fn` map for
//! `kind=local` nodes. Grounded on `langgraph_core::tool::ToolRegistry`'s
//! `Arc<dyn Fn(Value, ...) -> Future>` executor shape, trimmed down to the
//! single `(Value) -> Value` signature spec.md §4.B calls for (no schema,
//! no runtime-context injection — local functions here are pure JSON
//! transforms, not tool calls with execution context).

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, OnceLock, RwLock};

use serde_json::{json, Value};

use crate::error::{EngineError, Result};

/// Future returned by a registered local function.
pub type LocalFnFuture = Pin<Box<dyn Future<Output = Result<Value>> + Send>>;

/// A registered local function: takes the resolved node input, returns the
/// node output (or fails, which surfaces as a `NodeError` in the run).
pub type LocalFn = Arc<dyn Fn(Value) -> LocalFnFuture + Send + Sync>;

/// Process-wide registry of local functions. Write-only at bootstrap,
/// read-only thereafter (spec.md §9 "Global mutable state").
#[derive(Default)]
pub struct LocalFunctionRegistry {
    functions: RwLock<HashMap<String, LocalFn>>,
}

impl LocalFunctionRegistry {
    pub fn new() -> Self {
        Self { functions: RwLock::new(HashMap::new()) }
    }

    /// Register a function under `name`, overwriting any existing entry.
    pub fn register(&self, name: impl Into<String>, f: LocalFn) {
        let mut functions = self.functions.write().expect("registry lock poisoned");
        functions.insert(name.into(), f);
    }

    /// Look up a function by name.
    pub fn lookup(&self, name: &str) -> Result<LocalFn> {
        let functions = self.functions.read().expect("registry lock poisoned");
        functions.get(name).cloned().ok_or_else(|| EngineError::LocalFnMissing(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.read().expect("registry lock poisoned").contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.functions.read().expect("registry lock poisoned").keys().cloned().collect()
    }
}

fn boxed<F, Fut>(f: F) -> LocalFn
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value>> + Send + 'static,
{
    Arc::new(move |input| Box::pin(f(input)))
}

/// `echoGear(input) = { echo: input.msg }` — the canonical built-in used
/// throughout spec.md §8's literal test scenarios.
fn echo_gear(input: Value) -> Value {
    let msg = input.get("msg").cloned();
    json!({ "echo": msg })
}

/// `identity(input) = input` — the trivial pass-through outlet.
fn identity_fn(input: Value) -> Value {
    input
}

/// `uploadBlob` — an outlet stub. Validates that the input names a `path`
/// and returns a content-addressed placeholder, standing in for a real
/// blob-storage side effect (out of scope per spec.md §1).
fn upload_blob(input: Value) -> Result<Value> {
    let path = input
        .get("path")
        .and_then(Value::as_str)
        .ok_or_else(|| EngineError::NodeExecution("uploadBlob requires a string `path`".into()))?;
    let hash = format!("{:x}", simple_hash(path.as_bytes()));
    Ok(json!({ "path": path, "blobId": format!("blob-{hash}") }))
}

/// `revalidate` — an outlet stub for cache-path invalidation. Accepts
/// `{ path: string }` and acknowledges it; a concrete deployment wires this
/// to a real cache-revalidation collaborator.
fn revalidate(input: Value) -> Result<Value> {
    let path = input
        .get("path")
        .and_then(Value::as_str)
        .ok_or_else(|| EngineError::NodeExecution("revalidate requires a string `path`".into()))?;
    Ok(json!({ "revalidated": path }))
}

fn simple_hash(bytes: &[u8]) -> u64 {
    // FNV-1a, good enough for a deterministic placeholder id.
    let mut hash: u64 = 0xcbf29ce484222325;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

/// Build a registry seeded with the built-ins spec.md §4.B and SPEC_FULL.md
/// §4.B name: `echoGear`, `revalidate`, `identity`, `uploadBlob`.
pub fn seeded() -> LocalFunctionRegistry {
    let registry = LocalFunctionRegistry::new();
    registry.register("echoGear", boxed(|input| async move { Ok(echo_gear(input)) }));
    registry.register("identity", boxed(|input| async move { Ok(identity_fn(input)) }));
    registry.register("revalidate", boxed(|input| async move { revalidate(input) }));
    registry.register("uploadBlob", boxed(|input| async move { upload_blob(input) }));
    registry
}

/// Process-wide singleton, seeded on first access.
static GLOBAL: OnceLock<LocalFunctionRegistry> = OnceLock::new();

pub fn global() -> &'static LocalFunctionRegistry {
    GLOBAL.get_or_init(seeded)
}
