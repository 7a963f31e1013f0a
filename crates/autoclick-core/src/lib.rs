//! # autoclick-core
//!
//! The graph engine behind automation drawings - THE LOGIC.
//!
//! A drawing is a directed graph of automation steps (click, move, keyboard
//! input, wait, image matching, conditional branches). This crate holds the
//! live graph those steps are edited in and the protocol that converts it to
//! and from the backend's JSON Graph Document:
//!
//! - `export`: live graph -> document
//! - `import`: document -> live graph, in three barriered phases
//! - `reconcile`: runtime id -> persisted id
//! - `resolver`: deferred connection resolution
//!
//! ## Architectural Constraints
//!
//! - Pure and synchronous: no async, no network, no filesystem
//! - Deterministic: `BTreeMap`/`BTreeSet` everywhere, stable export order
//! - Best effort on import: malformed records and edges are reported, not fatal

// =============================================================================
// MODULES
// =============================================================================

pub mod action;
pub mod document;
pub mod export;
pub mod graph;
pub mod import;
pub mod metrics;
pub mod primitives;
pub mod reconcile;
pub mod resolver;
pub mod selection;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types
// =============================================================================

pub use action::{ActionKind, Category, Slot, SlotInterface, SlotKind};
pub use types::{AutoclickError, Link, LinkId, Node, NodeId, Params, Point, Rect, Size};

// =============================================================================
// RE-EXPORTS: Graph Engine
// =============================================================================

pub use document::{Connection, ConnectionFormat, GraphDocument, NodeRecord};
pub use export::{ExportOptions, Exporter};
pub use graph::{Graph, LiveGraph};
pub use import::{ImportReport, Importer, SkipReason, SkippedRecord};
pub use metrics::DrawingMetrics;
pub use reconcile::IdentityReconciler;
pub use resolver::{
    ConnectionState, FailedConnection, FailureReason, IdMap, PendingConnections, ResolveReport,
};
pub use selection::Selection;
