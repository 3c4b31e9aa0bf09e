//! Workspace graph validation and normalization.
//!
//! Diagram payloads arrive from the canvas UI either as structured JSON or as
//! a serialized text blob. Both forms are resolved here, once, at the input
//! boundary; downstream code only ever sees a fully-populated
//! [`WorkspaceGraph`]. Re-running the validator on its own output changes
//! nothing: ids are only generated for nodes/edges that lack one.

use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::models::graph::{
    DEFAULT_POSITION, Edge, Node, NodeData, Position, WorkspaceGraph,
};
use crate::storage::error::{FieldViolation, ProblemError};

/// Default node/edge type when the client omits one.
const DEFAULT_KIND: &str = "default";
/// Display label for nodes submitted without one.
const DEFAULT_LABEL: &str = "Component";

/// A graph as submitted by a client: either already structured, or a
/// serialized JSON string that must be parsed first.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum GraphPayload {
    Raw(String),
    Structured(Value),
}

#[derive(Debug, Default, Deserialize)]
struct RawGraph {
    #[serde(default)]
    nodes: Vec<RawNode>,
    #[serde(default)]
    edges: Vec<RawEdge>,
    #[serde(default)]
    notes: String,
}

#[derive(Debug, Deserialize)]
struct RawNode {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "type")]
    node_type: Option<String>,
    #[serde(default)]
    position: Option<Position>,
    #[serde(default)]
    data: Option<RawNodeData>,
}

#[derive(Debug, Default, Deserialize)]
struct RawNodeData {
    #[serde(default)]
    label: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawEdge {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    target: Option<String>,
    #[serde(default, rename = "type")]
    edge_type: Option<String>,
}

/// Normalize a possibly partial graph payload into a complete
/// [`WorkspaceGraph`], or fail with field-level validation errors.
pub fn validate_graph(payload: GraphPayload) -> Result<WorkspaceGraph, ProblemError> {
    let value = match payload {
        GraphPayload::Structured(value) => value,
        GraphPayload::Raw(text) => serde_json::from_str(&text).map_err(|e| {
            ProblemError::invalid("solutionWorkspace", format!("invalid format: {e}"))
        })?,
    };

    let raw: RawGraph = serde_json::from_value(value).map_err(|e| {
        ProblemError::invalid("solutionWorkspace", format!("invalid format: {e}"))
    })?;

    let nodes: Vec<Node> = raw
        .nodes
        .into_iter()
        .map(|n| Node {
            id: n.id.unwrap_or_else(|| generate_id("node")),
            node_type: n.node_type.unwrap_or_else(|| DEFAULT_KIND.to_string()),
            position: n.position.unwrap_or(DEFAULT_POSITION),
            data: NodeData {
                label: n
                    .data
                    .and_then(|d| d.label)
                    .unwrap_or_else(|| DEFAULT_LABEL.to_string()),
            },
        })
        .collect();

    let mut violations: Vec<FieldViolation> = Vec::new();
    let node_ids: std::collections::HashSet<&str> =
        nodes.iter().map(|n| n.id.as_str()).collect();

    let mut edges: Vec<Edge> = Vec::with_capacity(raw.edges.len());
    for (i, e) in raw.edges.into_iter().enumerate() {
        let source = match e.source {
            Some(s) => s,
            None => {
                violations.push(FieldViolation::new(format!("edges[{i}].source"), "is required"));
                continue;
            }
        };
        let target = match e.target {
            Some(t) => t,
            None => {
                violations.push(FieldViolation::new(format!("edges[{i}].target"), "is required"));
                continue;
            }
        };
        if !node_ids.contains(source.as_str()) {
            violations.push(FieldViolation::new(
                format!("edges[{i}].source"),
                format!("references unknown node id '{source}'"),
            ));
        }
        if !node_ids.contains(target.as_str()) {
            violations.push(FieldViolation::new(
                format!("edges[{i}].target"),
                format!("references unknown node id '{target}'"),
            ));
        }
        edges.push(Edge {
            id: e.id.unwrap_or_else(|| generate_id("edge")),
            source,
            target,
            edge_type: e.edge_type.unwrap_or_else(|| DEFAULT_KIND.to_string()),
        });
    }

    if !violations.is_empty() {
        return Err(ProblemError::Validation { fields: violations });
    }

    Ok(WorkspaceGraph {
        nodes,
        edges,
        notes: raw.notes,
    })
}

/// Validate an optional payload; `None` stays `None`.
pub fn validate_optional_graph(
    payload: Option<GraphPayload>,
) -> Result<Option<WorkspaceGraph>, ProblemError> {
    payload.map(validate_graph).transpose()
}

/// Generated ids follow the canvas UI's `<kind>_<millis>_<random>` shape.
fn generate_id(kind: &str) -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("{kind}_{}_{}", Utc::now().timestamp_millis(), &random[..9])
}
