//! Unit tests for backend API types serialization/deserialization.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use autoclick::types::{
    Boundary, Drawing, DrawingStatus, ErrorResponse, ExecuteRequest, MessageResponse,
};
use serde_json::json;

// =============================================================================
// DRAWING TESTS
// =============================================================================

#[test]
fn test_drawing_full_payload() {
    let body = json!({
        "id": "d-1",
        "name": "Login flow",
        "nodes": [
            {"id": "1", "action_type": "click", "params": {"x": 5, "y": 6},
             "x": 5, "y": 6, "connections": ["2"]},
            {"id": "2", "action_type": "wait", "params": {"duration": 2.0},
             "connections": []}
        ],
        "boundary": {"x": 0, "y": 0, "width": 1920, "height": 1080},
        "created_at": "2025-01-01T10:00:00",
        "last_executed": null,
        "execution_state": {
            "is_running": false, "current_node": null, "status": "idle",
            "progress": 0, "should_stop": false
        }
    });

    let drawing: Drawing = serde_json::from_value(body).unwrap();

    assert_eq!(drawing.name, "Login flow");
    assert_eq!(drawing.nodes.len(), 2);
    assert_eq!(drawing.nodes[0].connections[0].target_id, "2");
    assert_eq!(drawing.boundary.unwrap().width, 1920);
    assert!(drawing.last_executed.is_none());
    assert!(!drawing.execution_state.as_ref().unwrap().is_running);
    assert_eq!(drawing.document().nodes.len(), 2);
}

#[test]
fn test_drawing_minimal_payload() {
    let drawing: Drawing = serde_json::from_str(r#"{"id":"d-2","name":"Empty"}"#).unwrap();

    assert!(drawing.nodes.is_empty());
    assert!(drawing.boundary.is_none());
    assert!(drawing.execution_state.is_none());
}

#[test]
fn test_boundary_contains_is_inclusive() {
    let boundary = Boundary {
        x: 10,
        y: 10,
        width: 100,
        height: 50,
    };

    assert!(boundary.contains(10, 10));
    assert!(boundary.contains(110, 60));
    assert!(!boundary.contains(111, 60));
    assert!(!boundary.contains(9, 20));
}

#[test]
fn test_boundary_contains_does_not_overflow() {
    let boundary = Boundary {
        x: i64::MAX - 5,
        y: 0,
        width: 100,
        height: i64::MAX,
    };

    assert!(boundary.contains(i64::MAX, i64::MAX));
    assert!(!boundary.contains(0, 0));
}

#[test]
fn test_nodes_outside_boundary() {
    let drawing: Drawing = serde_json::from_value(json!({
        "id": "d-1",
        "name": "Bounded",
        "boundary": {"x": 0, "y": 0, "width": 800, "height": 600},
        "nodes": [
            {"id": "1", "action_type": "click", "params": {"x": 100, "y": 100}},
            {"id": "2", "action_type": "click", "params": {"x": 900, "y": 100}},
            {"id": "3", "action_type": "mousedown",
             "params": {"position_mode": "relative", "x": 5000, "y": 5000}},
            {"id": "4", "action_type": "move", "params": {"x": 100, "y": 600.4}},
            {"id": "5", "action_type": "wait", "params": {"duration": 1.0}},
            {"id": "6", "action_type": "mouseup",
             "params": {"position_mode": "absolute", "x": -1, "y": 0}}
        ]
    }))
    .unwrap();

    assert_eq!(drawing.nodes_outside_boundary(), vec!["2", "6"]);
}

#[test]
fn test_no_boundary_reports_nothing() {
    let drawing: Drawing = serde_json::from_value(json!({
        "id": "d-1",
        "name": "Unbounded",
        "nodes": [{"id": "1", "action_type": "click", "params": {"x": -50, "y": -50}}]
    }))
    .unwrap();

    assert!(drawing.nodes_outside_boundary().is_empty());
}

// =============================================================================
// EXECUTION TESTS
// =============================================================================

#[test]
fn test_execute_request_uses_loop_key() {
    let request = ExecuteRequest {
        repeat: true,
        speed: 0.5,
    };

    let value = serde_json::to_value(request).unwrap();
    assert_eq!(value, json!({"loop": true, "speed": 0.5}));
}

#[test]
fn test_execute_request_defaults() {
    let request: ExecuteRequest = serde_json::from_str("{}").unwrap();
    assert_eq!(request, ExecuteRequest::default());
    assert!(!request.repeat);
    assert_eq!(request.speed, 1.0);
}

#[test]
fn test_status_running() {
    let status: DrawingStatus = serde_json::from_value(json!({
        "drawing_id": "d-1", "name": "Login flow", "is_running": true,
        "status": "running", "progress": 40, "current_node": "2"
    }))
    .unwrap();

    assert!(status.is_running);
    assert_eq!(status.progress, 40.0);
    assert_eq!(status.current_node, Some(json!("2")));
    assert!(status.error.is_none());
}

#[test]
fn test_status_without_execution_state() {
    let status: DrawingStatus =
        serde_json::from_str(r#"{"error":"Execution state not found"}"#).unwrap();

    assert!(!status.is_running);
    assert_eq!(status.error.as_deref(), Some("Execution state not found"));
}

#[test]
fn test_status_serialization_omits_missing_error() {
    let json = serde_json::to_string(&DrawingStatus::default()).unwrap();
    assert!(!json.contains("\"error\""));
}

// =============================================================================
// GENERIC BODY TESTS
// =============================================================================

#[test]
fn test_message_and_error_bodies() {
    let ack: MessageResponse =
        serde_json::from_str(r#"{"message":"Drawing updated successfully"}"#).unwrap();
    assert_eq!(ack.message, "Drawing updated successfully");

    let err: ErrorResponse = serde_json::from_str(r#"{"error":"Drawing not found"}"#).unwrap();
    assert_eq!(err.error, "Drawing not found");
}
