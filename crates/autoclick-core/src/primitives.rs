//! # Fixed Constants
//!
//! Compile-time constants shared by the graph engine, the document codec
//! and the selection geometry. Immutable at runtime.

/// Action type assumed when a record omits `action_type`.
pub const DEFAULT_ACTION_TAG: &str = "click";

/// Width used for hit-testing when a node has no size override.
pub const DEFAULT_NODE_WIDTH: f64 = 150.0;

/// Height used for hit-testing when a node has no size override.
pub const DEFAULT_NODE_HEIGHT: f64 = 80.0;

/// Minimum pointer travel before a drag counts as a box selection.
///
/// Shorter drags are treated as a click on empty canvas.
pub const BOX_SELECT_MIN_DRAG: f64 = 10.0;

/// Reserved key for the action tag inside a node's properties bag.
///
/// Never exported inside `params`; stripped from `params` on import.
pub const ACTION_TYPE_KEY: &str = "action_type";

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum number of records accepted in a single Graph Document.
///
/// Drawings are edited by hand and realistically hold tens to low hundreds
/// of nodes. Anything above this bound is rejected before phase 1 runs.
pub const MAX_IMPORT_NODE_COUNT: usize = 10_000;

/// Largest persisted node identifier accepted on import.
///
/// The editor keeps ids as JavaScript numbers, so nothing above the safe
/// integer range round-trips. Keeping persisted ids this low also leaves the
/// runtime counter room for every node of a maximal document.
pub const MAX_PERSISTED_NODE_ID: u64 = (1 << 53) - 1;

/// Maximum number of connection descriptors accepted on one record.
///
/// Descriptors past this bound are dropped and counted as failed.
pub const MAX_CONNECTIONS_PER_NODE: usize = 256;
