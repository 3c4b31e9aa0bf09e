//! Workspace graph validator tests: defaulting, raw payload parsing,
//! idempotency and edge referential integrity.

use serde_json::json;
use system_design_api::models::WorkspaceGraph;
use system_design_api::services::graph_validator::{GraphPayload, validate_graph};
use system_design_api::storage::ProblemError;

#[test]
fn test_missing_collections_default_to_empty() {
    let graph = validate_graph(GraphPayload::Structured(json!({}))).unwrap();
    assert!(graph.nodes.is_empty());
    assert!(graph.edges.is_empty());
    assert_eq!(graph.notes, "");
}

#[test]
fn test_node_defaults_are_filled() {
    let graph = validate_graph(GraphPayload::Structured(json!({
        "nodes": [{}],
    })))
    .unwrap();

    let node = &graph.nodes[0];
    assert!(node.id.starts_with("node_"), "generated id: {}", node.id);
    assert_eq!(node.node_type, "default");
    assert_eq!(node.position.x, 100.0);
    assert_eq!(node.position.y, 100.0);
    assert_eq!(node.data.label, "Component");
}

#[test]
fn test_supplied_fields_pass_through_unchanged() {
    let graph = validate_graph(GraphPayload::Structured(json!({
        "nodes": [
            {"id": "n1", "type": "service", "position": {"x": 5.0, "y": 7.0}, "data": {"label": "API Gateway"}},
            {"id": "n2"}
        ],
        "edges": [{"id": "e1", "source": "n1", "target": "n2", "type": "smoothstep"}],
        "notes": "cache goes in front"
    })))
    .unwrap();

    assert_eq!(graph.nodes[0].id, "n1");
    assert_eq!(graph.nodes[0].node_type, "service");
    assert_eq!(graph.nodes[0].data.label, "API Gateway");
    assert_eq!(graph.edges[0].edge_type, "smoothstep");
    assert_eq!(graph.notes, "cache goes in front");
}

#[test]
fn test_edge_id_and_type_defaulted() {
    let graph = validate_graph(GraphPayload::Structured(json!({
        "nodes": [{"id": "a"}, {"id": "b"}],
        "edges": [{"source": "a", "target": "b"}],
    })))
    .unwrap();

    let edge = &graph.edges[0];
    assert!(edge.id.starts_with("edge_"));
    assert_eq!(edge.edge_type, "default");
}

#[test]
fn test_textual_payload_is_parsed() {
    let text = json!({"nodes": [{"id": "n1"}], "edges": [], "notes": ""}).to_string();
    let graph = validate_graph(GraphPayload::Raw(text)).unwrap();
    assert_eq!(graph.nodes.len(), 1);
    assert_eq!(graph.nodes[0].id, "n1");
}

#[test]
fn test_unparseable_text_fails_with_validation_error() {
    let result = validate_graph(GraphPayload::Raw("{not json".to_string()));
    match result {
        Err(ProblemError::Validation { fields }) => {
            assert_eq!(fields[0].field, "solutionWorkspace");
            assert!(fields[0].message.contains("invalid format"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn test_validator_is_idempotent_on_its_own_output() {
    let first = validate_graph(GraphPayload::Structured(json!({
        "nodes": [{}, {"id": "db", "data": {"label": "Database"}}],
        "edges": [],
        "notes": "n"
    })))
    .unwrap();

    let second = validate_graph(GraphPayload::Structured(
        serde_json::to_value(&first).unwrap(),
    ))
    .unwrap();

    // No ids regenerated, no fields altered.
    assert_eq!(first, second);
}

#[test]
fn test_edge_referencing_unknown_node_is_rejected() {
    let result = validate_graph(GraphPayload::Structured(json!({
        "nodes": [{"id": "a"}],
        "edges": [{"source": "a", "target": "ghost"}],
    })));

    match result {
        Err(ProblemError::Validation { fields }) => {
            assert_eq!(fields.len(), 1);
            assert_eq!(fields[0].field, "edges[0].target");
            assert!(fields[0].message.contains("ghost"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn test_edge_without_endpoints_is_rejected() {
    let result = validate_graph(GraphPayload::Structured(json!({
        "nodes": [{"id": "a"}],
        "edges": [{"target": "a"}],
    })));

    match result {
        Err(ProblemError::Validation { fields }) => {
            assert_eq!(fields[0].field, "edges[0].source");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn test_round_trips_through_model_serde() {
    let graph = validate_graph(GraphPayload::Structured(json!({
        "nodes": [{"id": "n1"}],
        "edges": [],
        "notes": "x"
    })))
    .unwrap();

    let value = serde_json::to_value(&graph).unwrap();
    // Wire format uses "type", not "node_type".
    assert_eq!(value["nodes"][0]["type"], "default");
    let back: WorkspaceGraph = serde_json::from_value(value).unwrap();
    assert_eq!(graph, back);
}
