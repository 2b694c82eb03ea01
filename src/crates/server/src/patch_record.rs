//! The stored patch aggregate: wraps `PatchDefinition` and adds an optional
//! `gearId` to each node so that deleting a patch can cascade into deleting
//! the gears it wires together. `engine_core::PatchDefinition` itself stays
//! a pure value object with no knowledge of gears — this wrapper is the
//! join, kept at the API boundary.

use chrono::{DateTime, Utc};
use engine_core::{Edge, Node, NodeKind, PatchDefinition};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredNode {
    pub id: String,
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#fn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Links a node to the gear it represents, for cascade delete. Not
    /// interpreted by the DAG engine itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gear_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredPatch {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub nodes: Vec<StoredNode>,
    pub edges: Vec<Edge>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl StoredPatch {
    /// The ids of every node wired to a gear, for cascade delete.
    pub fn gear_ids(&self) -> Vec<String> {
        self.nodes.iter().filter_map(|n| n.gear_id.clone()).collect()
    }

    /// Strips `gearId` linkage to produce the pure value the DAG engine runs.
    pub fn into_definition(self) -> PatchDefinition {
        PatchDefinition {
            id: self.id,
            name: self.name,
            description: self.description,
            nodes: self.nodes.into_iter().map(|n| Node { id: n.id, kind: n.kind, r#fn: n.r#fn, url: n.url }).collect(),
            edges: self.edges,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
