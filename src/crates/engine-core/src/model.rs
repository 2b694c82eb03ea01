//! Patch data model: nodes, edges, and the patch definition value object.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The kind of a node: either an in-process local function or a remote HTTP
/// gear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Local,
    Http,
}

/// A vertex in a patch. `kind=local` requires `fn` to be set and registered
/// in the local function registry; `kind=http` requires `url` to be set and
/// accepted by the URL guard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#fn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A directed dependency between two nodes. Both endpoints must exist in the
/// patch; the full edge set must induce a DAG.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
}

/// A patch is a value object: its execution produces no in-patch mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchDefinition {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PatchDefinition {
    /// Structural validation: `nodes` ids unique, every edge references a
    /// known node. Does not check for cycles — that is the topological
    /// sorter's job.
    pub fn validate(&self) -> Result<(), String> {
        let mut seen = std::collections::HashSet::new();
        for node in &self.nodes {
            if !seen.insert(node.id.as_str()) {
                return Err(format!("duplicate node id: {}", node.id));
            }
            match node.kind {
                NodeKind::Local if node.r#fn.is_none() => {
                    return Err(format!("node '{}' is local but has no fn", node.id));
                }
                NodeKind::Http if node.url.is_none() => {
                    return Err(format!("node '{}' is http but has no url", node.id));
                }
                _ => {}
            }
        }
        for edge in &self.edges {
            if !seen.contains(edge.source.as_str()) {
                return Err(format!("edge references unknown source: {}", edge.source));
            }
            if !seen.contains(edge.target.as_str()) {
                return Err(format!("edge references unknown target: {}", edge.target));
            }
        }
        Ok(())
    }
}

/// A lightweight projection of [`PatchDefinition`] for list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchSummary {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub node_count: usize,
    pub edge_count: usize,
    pub updated_at: DateTime<Utc>,
}

impl From<&PatchDefinition> for PatchSummary {
    fn from(p: &PatchDefinition) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            description: p.description.clone(),
            node_count: p.nodes.len(),
            edge_count: p.edges.len(),
            updated_at: p.updated_at,
        }
    }
}

/// Resolved input for a node, per spec.md §4.D step 4a:
/// zero incoming edges -> the run's initial input; one incoming edge -> that
/// source's output; two or more -> an ordered list of source outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeInput {
    Single(Value),
    FanIn(Vec<Value>),
}

impl NodeInput {
    pub fn into_value(self) -> Value {
        match self {
            NodeInput::Single(v) => v,
            NodeInput::FanIn(vs) => Value::Array(vs),
        }
    }
}
