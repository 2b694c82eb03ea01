//! Patch execution engine: the deterministic DAG scheduler (spec.md §4.D),
//! the topological sorter it depends on (§4.A), the local function registry
//! (§4.B), and the URL guard / timeout controller used for `http` nodes
//! (§4.C). This crate has no HTTP-server concerns of its own — it is the
//! pure, embeddable execution core that `server` wires up behind the inlet
//! endpoint.

pub mod error;
pub mod event;
pub mod model;
pub mod registry;
pub mod runtime;
pub mod topo;
pub mod urlguard;

pub use error::{EngineError, Result};
pub use event::{RunEvent, RunEventError, RunStartupError};
pub use model::{Edge, Node, NodeInput, NodeKind, PatchDefinition, PatchSummary};
pub use registry::LocalFunctionRegistry;
pub use runtime::{PatchEngine, RunEventStream, RunOutcome};
pub use topo::topo_sort;
pub use urlguard::{validate_http_url, AllowList};
