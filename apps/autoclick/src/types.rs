//! # Backend API Types
//!
//! Request and response bodies of the drawing service's REST API
//! (`/api/drawings/...`).

use autoclick_core::{GraphDocument, NodeRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// DRAWING
// =============================================================================

/// Screen rectangle the backend confines pointer actions to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl Boundary {
    /// Inclusive containment, as the executor checks it.
    #[must_use]
    pub fn contains(&self, x: i64, y: i64) -> bool {
        self.x <= x
            && x <= self.x.saturating_add(self.width)
            && self.y <= y
            && y <= self.y.saturating_add(self.height)
    }
}

/// Execution state embedded in a drawing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionState {
    #[serde(default)]
    pub is_running: bool,
    /// Persisted id of the node being executed, if any.
    #[serde(default)]
    pub current_node: Option<Value>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub should_stop: bool,
}

/// `GET /drawings/{id}` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drawing {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub boundary: Option<Boundary>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub last_executed: Option<String>,
    #[serde(default)]
    pub execution_state: Option<ExecutionState>,
}

impl Drawing {
    /// The drawing's node graph as a Graph Document.
    #[must_use]
    pub fn document(&self) -> GraphDocument {
        GraphDocument::new(self.nodes.clone())
    }

    /// Ids of nodes whose absolute pointer target lies outside the boundary.
    ///
    /// The executor skips such actions. Nodes without numeric `x`/`y` params
    /// or in a relative position mode are never reported.
    #[must_use]
    pub fn nodes_outside_boundary(&self) -> Vec<String> {
        let Some(boundary) = self.boundary else {
            return Vec::new();
        };
        self.nodes
            .iter()
            .filter(|record| {
                let absolute = record
                    .params
                    .get("position_mode")
                    .and_then(Value::as_str)
                    .is_none_or(|mode| mode == "absolute");
                let coord = |key: &str| record.params.get(key).and_then(Value::as_f64);
                match (coord("x"), coord("y")) {
                    (Some(x), Some(y)) if absolute => {
                        !boundary.contains(x.round() as i64, y.round() as i64)
                    }
                    _ => false,
                }
            })
            .map(|record| record.id.clone())
            .collect()
    }
}

// =============================================================================
// EXECUTION
// =============================================================================

/// `POST /drawings/{id}/execute` body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExecuteRequest {
    /// Restart from the start nodes after the last one finishes.
    #[serde(rename = "loop", default)]
    pub repeat: bool,
    /// Delay multiplier applied by the executor.
    #[serde(default = "default_speed")]
    pub speed: f64,
}

fn default_speed() -> f64 {
    1.0
}

impl Default for ExecuteRequest {
    fn default() -> Self {
        Self {
            repeat: false,
            speed: default_speed(),
        }
    }
}

/// `GET /drawings/{id}/status` response.
///
/// The backend answers `{"error": ...}` with status 200 when a drawing has
/// never been executed, so every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrawingStatus {
    #[serde(default)]
    pub drawing_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_running: bool,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub current_node: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// =============================================================================
// GENERIC BODIES
// =============================================================================

/// `{"message": ...}` acknowledgement returned by write endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

/// `{"error": ...}` body returned with 4xx/5xx statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
