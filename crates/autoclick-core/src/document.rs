//! # Graph Document
//!
//! The transport-safe JSON form of a drawing, exchanged with the backend.
//!
//! ```json
//! {
//!   "nodes": [
//!     {
//!       "id": "3",
//!       "action_type": "click",
//!       "params": { "x": 100, "y": 200 },
//!       "x": 100, "y": 200,
//!       "connections": [ { "target_id": "5", "output_slot": 0, "input_slot": 0 } ]
//!     }
//!   ]
//! }
//! ```
//!
//! Decoding is lenient where older writers differ: identifiers may be JSON
//! strings or numbers, a connection may be a bare target identifier, and a
//! position may be given as `pos: [x, y]` or as top-level `x`/`y`.
//! Encoding always writes the full form.
//!
//! Bad data inside a record never fails the whole document. An id that is
//! not a string or number is kept as its JSON text and rejected by the
//! importer. A connection entry of any other shape is kept as a malformed
//! descriptor, which the resolver drops and counts, and which is never
//! written back out.

use crate::primitives::DEFAULT_ACTION_TAG;
use crate::types::{AutoclickError, Params, Point, Size};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// A persisted identifier as it may appear on the wire.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

/// Record ids of any JSON type. Non-string values keep their JSON text.
fn id_from_any<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        other => other.to_string(),
    })
}

/// A missing or `null` connection list is an empty one.
fn connections_or_empty<'de, D>(deserializer: D) -> Result<Vec<Connection>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<Connection>>::deserialize(deserializer)?.unwrap_or_default())
}

fn serialize_well_formed<S>(connections: &[Connection], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_seq(connections.iter().filter(|c| !c.malformed))
}

fn default_action_type() -> String {
    DEFAULT_ACTION_TAG.to_string()
}

// =============================================================================
// CONNECTION
// =============================================================================

/// An outgoing edge descriptor: `source.output_slot -> target.input_slot`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawConnection")]
pub struct Connection {
    pub target_id: String,
    pub output_slot: usize,
    pub input_slot: usize,
    #[serde(skip)]
    malformed: bool,
}

impl Connection {
    #[must_use]
    pub fn new(target_id: impl Into<String>, output_slot: usize, input_slot: usize) -> Self {
        Self {
            target_id: target_id.into(),
            output_slot,
            input_slot,
            malformed: false,
        }
    }

    /// A descriptor for an entry that could not be read.
    ///
    /// `target_id` holds the entry's `target_id` text when it has one,
    /// otherwise the whole entry as JSON.
    fn malformed(raw: &Value) -> Self {
        let target_id = match raw.get("target_id") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => raw.to_string(),
        };
        Self {
            target_id,
            output_slot: 0,
            input_slot: 0,
            malformed: true,
        }
    }

    /// True when the wire entry had no usable shape.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        self.malformed
    }
}

/// Wire shapes accepted for a connection entry.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawConnection {
    /// Legacy: a bare target identifier, slots 0 -> 0.
    Bare(RawId),
    Full {
        target_id: RawId,
        #[serde(default)]
        output_slot: usize,
        #[serde(default)]
        input_slot: usize,
    },
    /// Anything else: negative or non-integer slots, `null`, no `target_id`.
    Other(Value),
}

impl From<RawConnection> for Connection {
    fn from(raw: RawConnection) -> Self {
        match raw {
            RawConnection::Bare(target) => Self::new(target, 0, 0),
            RawConnection::Full {
                target_id,
                output_slot,
                input_slot,
            } => Self::new(target_id, output_slot, input_slot),
            RawConnection::Other(raw) => Self::malformed(&raw),
        }
    }
}

/// Output form of a connection list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionFormat {
    /// `{target_id, output_slot, input_slot}` objects.
    #[default]
    Full,
    /// Bare target identifier strings. Slot indices are not written.
    Legacy,
}

// =============================================================================
// NODE RECORD
// =============================================================================

/// The persisted form of one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    #[serde(default, deserialize_with = "id_from_any")]
    pub id: String,

    #[serde(default = "default_action_type")]
    pub action_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default)]
    pub params: Params,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<[f64; 2]>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<[f64; 2]>,

    #[serde(
        default,
        deserialize_with = "connections_or_empty",
        serialize_with = "serialize_well_formed"
    )]
    pub connections: Vec<Connection>,
}

impl NodeRecord {
    /// A record with no params, connections or placement.
    #[must_use]
    pub fn new(id: impl Into<String>, action_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            action_type: action_type.into(),
            title: None,
            params: Params::new(),
            pos: None,
            x: None,
            y: None,
            size: None,
            connections: Vec::new(),
        }
    }

    /// Place the record, writing both the `pos` array and `x`/`y`.
    #[must_use]
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.pos = Some([x, y]);
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    /// Resolved canvas position: `pos` wins, then `x`/`y`, then the origin.
    #[must_use]
    pub fn position(&self) -> Point {
        match self.pos {
            Some([x, y]) => Point::new(x, y),
            None => Point::new(self.x.unwrap_or(0.0), self.y.unwrap_or(0.0)),
        }
    }

    /// The size override, if any.
    #[must_use]
    pub fn size_override(&self) -> Option<Size> {
        self.size.map(|[w, h]| Size::new(w, h))
    }
}

// =============================================================================
// GRAPH DOCUMENT
// =============================================================================

/// An edge identified by persisted ids: `(source, output_slot, target, input_slot)`.
pub type EdgeKey = (String, usize, String, usize);

/// The full persisted representation of a drawing's node graph.
///
/// Array order carries no meaning; identity is the record `id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
}

impl GraphDocument {
    #[must_use]
    pub fn new(nodes: Vec<NodeRecord>) -> Self {
        Self { nodes }
    }

    /// Parse a document from JSON text.
    pub fn from_json(text: &str) -> Result<Self, AutoclickError> {
        serde_json::from_str(text).map_err(|e| AutoclickError::DeserializationError(e.to_string()))
    }

    /// Encode as a JSON value using the given connection form.
    pub fn to_value(&self, format: ConnectionFormat) -> Result<Value, AutoclickError> {
        let mut value = serde_json::to_value(self)
            .map_err(|e| AutoclickError::SerializationError(e.to_string()))?;

        if format == ConnectionFormat::Legacy
            && let Some(nodes) = value.get_mut("nodes").and_then(Value::as_array_mut)
        {
            for node in nodes {
                if let Some(connections) =
                    node.get_mut("connections").and_then(Value::as_array_mut)
                {
                    for connection in connections.iter_mut() {
                        let target = connection.get("target_id").cloned().unwrap_or(Value::Null);
                        *connection = target;
                    }
                }
            }
        }
        Ok(value)
    }

    /// Encode as indented JSON using the given connection form.
    pub fn to_json_pretty(&self, format: ConnectionFormat) -> Result<String, AutoclickError> {
        let value = self.to_value(format)?;
        serde_json::to_string_pretty(&value)
            .map_err(|e| AutoclickError::SerializationError(e.to_string()))
    }

    /// Find a record by persisted id.
    #[must_use]
    pub fn record(&self, id: &str) -> Option<&NodeRecord> {
        self.nodes.iter().find(|record| record.id == id)
    }

    /// Every well-formed edge in the document, order-independent.
    #[must_use]
    pub fn edges(&self) -> BTreeSet<EdgeKey> {
        self.nodes
            .iter()
            .flat_map(|record| {
                record.connections.iter().filter(|c| !c.malformed).map(|c| {
                    (
                        record.id.clone(),
                        c.output_slot,
                        c.target_id.clone(),
                        c.input_slot,
                    )
                })
            })
            .collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_documented_wire_shape() {
        let doc = GraphDocument::from_json(
            r#"{"nodes":[{"id":"3","action_type":"click",
                "params":{"x":100,"y":200,"x_random":0,"y_random":0},
                "x":100,"y":200,
                "connections":[{"target_id":"5","output_slot":0,"input_slot":0}]}]}"#,
        )
        .expect("decode");

        let record = &doc.nodes[0];
        assert_eq!(record.id, "3");
        assert_eq!(record.position(), Point::new(100.0, 200.0));
        assert_eq!(record.params.get("x"), Some(&json!(100)));
        assert_eq!(record.connections, vec![Connection::new("5", 0, 0)]);
    }

    #[test]
    fn bare_connection_defaults_slots_to_zero() {
        let doc = GraphDocument::from_json(
            r#"{"nodes":[{"id":"1","action_type":"wait","connections":["2", 7]}]}"#,
        )
        .expect("decode");

        assert_eq!(
            doc.nodes[0].connections,
            vec![Connection::new("2", 0, 0), Connection::new("7", 0, 0)]
        );
    }

    #[test]
    fn object_connection_slots_default_to_zero() {
        let doc = GraphDocument::from_json(
            r#"{"nodes":[{"id":"1","connections":[{"target_id":4,"output_slot":1}]}]}"#,
        )
        .expect("decode");

        assert_eq!(doc.nodes[0].connections, vec![Connection::new("4", 1, 0)]);
    }

    #[test]
    fn numeric_id_and_missing_action_type() {
        let doc = GraphDocument::from_json(r#"{"nodes":[{"id":12}]}"#).expect("decode");
        assert_eq!(doc.nodes[0].id, "12");
        assert_eq!(doc.nodes[0].action_type, "click");
        assert!(doc.nodes[0].connections.is_empty());
    }

    #[test]
    fn pos_array_wins_over_xy() {
        let doc = GraphDocument::from_json(
            r#"{"nodes":[{"id":"1","pos":[5,6],"x":100,"y":200},{"id":"2"}]}"#,
        )
        .expect("decode");

        assert_eq!(doc.nodes[0].position(), Point::new(5.0, 6.0));
        assert_eq!(doc.nodes[1].position(), Point::default());
    }

    #[test]
    fn size_override_is_read() {
        let doc = GraphDocument::from_json(r#"{"nodes":[{"id":"1","size":[200,90]}]}"#)
            .expect("decode");
        assert_eq!(doc.nodes[0].size_override(), Some(Size::new(200.0, 90.0)));
    }

    #[test]
    fn unreadable_connection_entries_are_kept_as_malformed() {
        let doc = GraphDocument::from_json(
            r#"{"nodes":[{"id":"1","action_type":"click","connections":[
                {"target_id":"2","output_slot":-1,"input_slot":0},
                null,
                "2",
                {"target_id":2.5}
            ]}]}"#,
        )
        .expect("decode");

        let connections = &doc.nodes[0].connections;
        assert_eq!(connections.len(), 4);
        assert!(connections[0].is_malformed());
        assert_eq!(connections[0].target_id, "2");
        assert!(connections[1].is_malformed());
        assert_eq!(connections[1].target_id, "null");
        assert_eq!(connections[2], Connection::new("2", 0, 0));
        assert!(!connections[3].is_malformed());
        assert_eq!(connections[3].target_id, "2.5");
    }

    #[test]
    fn malformed_connections_are_not_written_or_counted() {
        let doc = GraphDocument::from_json(
            r#"{"nodes":[{"id":"1","connections":[true,{"output_slot":1},{"target_id":"2"}]}]}"#,
        )
        .expect("decode");

        let value = doc.to_value(ConnectionFormat::Full).expect("encode");
        assert_eq!(
            value["nodes"][0]["connections"],
            json!([{"target_id": "2", "output_slot": 0, "input_slot": 0}])
        );
        assert_eq!(doc.edges().len(), 1);
    }

    #[test]
    fn non_string_ids_keep_their_json_text() {
        let doc = GraphDocument::from_json(
            r#"{"nodes":[{"id":1.5},{"id":null},{},{"id":18446744073709551615}],
                "extra":true}"#,
        )
        .expect("decode");

        let ids: Vec<_> = doc.nodes.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1.5", "null", "", "18446744073709551615"]);
    }

    #[test]
    fn null_connection_list_is_empty() {
        let doc = GraphDocument::from_json(r#"{"nodes":[{"id":"1","connections":null}]}"#)
            .expect("decode");
        assert!(doc.nodes[0].connections.is_empty());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            GraphDocument::from_json("{\"nodes\": ["),
            Err(AutoclickError::DeserializationError(_))
        ));
    }

    #[test]
    fn encoding_writes_full_connection_objects() {
        let mut record = NodeRecord::new("1", "click").at(1.0, 2.0);
        record.connections.push(Connection::new("2", 0, 0));
        let doc = GraphDocument::new(vec![record]);

        let value = serde_json::to_value(&doc).expect("encode");
        assert_eq!(
            value["nodes"][0]["connections"][0],
            json!({"target_id": "2", "output_slot": 0, "input_slot": 0})
        );
        assert_eq!(value["nodes"][0]["pos"], json!([1.0, 2.0]));
        assert!(value["nodes"][0].get("size").is_none());
    }

    #[test]
    fn legacy_encoding_writes_bare_target_ids() {
        let mut record = NodeRecord::new("1", "if");
        record.connections.push(Connection::new("2", 0, 0));
        record.connections.push(Connection::new("3", 1, 0));
        let doc = GraphDocument::new(vec![record]);

        let value = doc.to_value(ConnectionFormat::Legacy).expect("encode");
        assert_eq!(value["nodes"][0]["connections"], json!(["2", "3"]));

        let text = doc.to_json_pretty(ConnectionFormat::Full).expect("encode");
        let back = GraphDocument::from_json(&text).expect("decode");
        assert_eq!(back, doc);
    }

    #[test]
    fn edges_ignore_array_order() {
        let mut a = NodeRecord::new("1", "click");
        a.connections.push(Connection::new("2", 0, 0));
        let b = NodeRecord::new("2", "wait");

        let forward = GraphDocument::new(vec![a.clone(), b.clone()]);
        let reversed = GraphDocument::new(vec![b, a]);
        assert_eq!(forward.edges(), reversed.edges());
        assert!(forward.record("2").is_some());
    }
}
