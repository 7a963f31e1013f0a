//! # Core Type Definitions
//!
//! This module contains the core types of the drawing graph:
//! - Graph identifiers (`NodeId`, `LinkId`)
//! - Canvas geometry (`Point`, `Size`, `Rect`)
//! - Live graph elements (`Node`, `Link`)
//! - Error types (`AutoclickError`)
//!
//! ## Identifier Model
//!
//! The live graph hands out runtime identifiers from a counter. A node loaded
//! from a Graph Document carries a *persisted* identifier which the importer
//! makes the runtime identifier (see `reconcile`). Both share the `NodeId`
//! representation so a reconciled node is addressable by either.

use crate::action::ActionKind;
use crate::primitives::{DEFAULT_NODE_HEIGHT, DEFAULT_NODE_WIDTH, MAX_PERSISTED_NODE_ID};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

// =============================================================================
// GRAPH IDENTIFIERS
// =============================================================================

/// Identifier of a node in the live graph.
///
/// Persisted documents carry it as a decimal string (`"3"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Coerce a persisted identifier into the runtime identifier type.
    ///
    /// Accepts a decimal integer in `0..=MAX_PERSISTED_NODE_ID`, surrounding
    /// whitespace ignored.
    pub fn parse_persisted(raw: &str) -> Result<Self, AutoclickError> {
        raw.trim()
            .parse::<u64>()
            .ok()
            .filter(|&id| id <= MAX_PERSISTED_NODE_ID)
            .map(Self)
            .ok_or_else(|| AutoclickError::InvalidPersistedId(raw.to_string()))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a link (directed edge) in the live graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LinkId(pub u64);

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// GEOMETRY
// =============================================================================

/// A position on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// A node size override.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::new(DEFAULT_NODE_WIDTH, DEFAULT_NODE_HEIGHT)
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Build the rectangle spanned by two opposite corners, in any order.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    /// Strict overlap test; rectangles that only touch do not intersect.
    #[must_use]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }
}

// =============================================================================
// PARAMS
// =============================================================================

/// The action configuration of a node: string keys to primitive JSON values.
///
/// `BTreeMap` keeps key order stable across exports.
pub type Params = BTreeMap<String, serde_json::Value>;

// =============================================================================
// NODE
// =============================================================================

/// A live node: one automation step placed on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Runtime identifier. Changed only through `LiveGraph::rekey`.
    pub(crate) id: NodeId,
    kind: ActionKind,
    /// Display title, defaults to the kind's title.
    pub title: String,
    /// Canvas position.
    pub pos: Point,
    /// Optional size override.
    pub size: Option<Size>,
    /// Explicitly set params. Keys absent here resolve to the kind's defaults.
    pub params: Params,
}

impl Node {
    /// Create a node with an empty params bag.
    #[must_use]
    pub fn new(id: NodeId, kind: ActionKind, pos: Point) -> Self {
        Self {
            id,
            kind,
            title: kind.title().to_string(),
            pos,
            size: None,
            params: Params::new(),
        }
    }

    /// The runtime identifier.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The action kind. Fixed for the lifetime of the node.
    #[must_use]
    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    /// Resolve a param: the explicit value, else the kind's default.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<serde_json::Value> {
        self.params
            .get(key)
            .cloned()
            .or_else(|| self.kind.default_param(key))
    }

    /// Set one param, returning the previous explicit value.
    pub fn set_param(
        &mut self,
        key: impl Into<String>,
        value: serde_json::Value,
    ) -> Option<serde_json::Value> {
        self.params.insert(key.into(), value)
    }

    /// Defaults overlaid with the explicit params.
    #[must_use]
    pub fn effective_params(&self) -> Params {
        let mut merged = self.kind.defaults();
        merged.extend(self.params.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }

    /// Canvas bounds, using the kind's default size when no override is set.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        let size = self.size.unwrap_or_else(|| self.kind.default_size());
        Rect {
            x: self.pos.x,
            y: self.pos.y,
            width: size.width,
            height: size.height,
        }
    }
}

// =============================================================================
// LINK
// =============================================================================

/// A directed link from an output slot to an input slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub id: LinkId,
    pub origin: NodeId,
    pub origin_slot: usize,
    pub target: NodeId,
    pub target_slot: usize,
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Which side of a node a slot sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotDirection {
    Input,
    Output,
}

impl fmt::Display for SlotDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => f.write_str("input"),
            Self::Output => f.write_str("output"),
        }
    }
}

/// Errors that can occur in the drawing graph engine.
///
/// Data-shape anomalies inside an imported document are NOT errors; they are
/// recorded in the import report. These variants cover contract violations,
/// direct graph-mutation failures and codec failures.
#[derive(Debug, Error)]
pub enum AutoclickError {
    /// The action tag is not part of the catalogue.
    #[error("Unknown action type: {0}")]
    UnknownActionType(String),

    /// The requested node was not found in the graph.
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// The requested link was not found in the graph.
    #[error("Link not found: {0}")]
    LinkNotFound(LinkId),

    /// The identifier is already held by another node.
    #[error("Node identifier already in use: {0}")]
    IdCollision(NodeId),

    /// A persisted identifier could not be coerced to a runtime identifier.
    #[error("Invalid persisted node identifier: {0:?}")]
    InvalidPersistedId(String),

    /// The slot index does not exist on the node's interface.
    #[error("Node {node} has no {direction} slot {slot}")]
    SlotOutOfRange {
        node: NodeId,
        direction: SlotDirection,
        slot: usize,
    },

    /// The document exceeds the import bound.
    #[error("Document holds {count} nodes, maximum is {max}")]
    DocumentTooLarge { count: usize, max: usize },

    /// Connections were resolved before every node finished reconciliation.
    #[error("Connection resolution started while node {0} was not reconciled")]
    PhaseOrder(NodeId),

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A deserialization error occurred.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================
