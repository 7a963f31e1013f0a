//! # Deferred Connection Resolver
//!
//! Holds each imported node's outgoing connection descriptors in a side-table
//! until every node of the batch exists, then turns them into live links.
//!
//! Per-node state machine:
//!
//! ```text
//! Created --mark_reconciled--> ConnectionsPending --resolve--> ConnectionsResolved
//!    \---(no connections)-------------------------------------^
//! ```
//!
//! A descriptor that cannot be linked is recorded in the `ResolveReport` and
//! skipped; resolution itself only fails on a contract violation.

use crate::document::Connection;
use crate::graph::LiveGraph;
use crate::primitives::MAX_CONNECTIONS_PER_NODE;
use crate::types::{AutoclickError, NodeId};
use std::collections::BTreeMap;
use std::fmt;

/// Persisted identifier -> live identifier for every node created by an import.
pub type IdMap = BTreeMap<NodeId, NodeId>;

/// Where a node is in the import lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Exists in the live graph, identity not yet reconciled.
    Created,
    /// Reconciled, descriptors waiting for the resolution pass.
    ConnectionsPending,
    /// Done. Terminal.
    ConnectionsResolved,
}

/// Why a descriptor did not become a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// `target_id` names no node created by this import.
    MissingTarget,
    /// The source kind has no such output slot.
    MissingOutputSlot,
    /// The target kind has no such input slot.
    MissingInputSlot,
    /// The wire entry was not a target id or a `{target_id, ...}` object
    /// with non-negative integer slots.
    Malformed,
    /// The record carried more than `MAX_CONNECTIONS_PER_NODE` descriptors.
    TooManyConnections,
    /// The live graph refused the link.
    Rejected,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::MissingTarget => "missing target",
            Self::MissingOutputSlot => "missing output slot",
            Self::MissingInputSlot => "missing input slot",
            Self::Malformed => "malformed descriptor",
            Self::TooManyConnections => "too many connections",
            Self::Rejected => "rejected",
        };
        f.write_str(text)
    }
}

/// One descriptor that was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedConnection {
    /// Persisted id of the source record.
    pub source_id: String,
    pub connection: Connection,
    pub reason: FailureReason,
}

/// Outcome of a resolution pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveReport {
    pub succeeded: usize,
    pub failed: Vec<FailedConnection>,
}

impl ResolveReport {
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    /// True when every descriptor became a link.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Clone)]
struct PendingEntry {
    source_id: String,
    state: ConnectionState,
    connections: Vec<Connection>,
}

/// Side-table of not-yet-linked descriptors, keyed by live source id.
#[derive(Debug, Clone, Default)]
pub struct PendingConnections {
    entries: BTreeMap<NodeId, PendingEntry>,
}

impl PendingConnections {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a freshly created node.
    pub fn register(&mut self, node: NodeId, source_id: impl Into<String>) {
        self.entries.insert(
            node,
            PendingEntry {
                source_id: source_id.into(),
                state: ConnectionState::Created,
                connections: Vec::new(),
            },
        );
    }

    /// Stop tracking a node, e.g. one removed after a failed rekey.
    pub fn discard(&mut self, node: NodeId) {
        self.entries.remove(&node);
    }

    /// Move a `Created` node forward once its identity is settled.
    ///
    /// `node` is the id the node holds after reconciliation; the entry
    /// registered under `registered_as` is re-filed under it.
    pub fn mark_reconciled(
        &mut self,
        registered_as: NodeId,
        node: NodeId,
        connections: Vec<Connection>,
    ) -> Result<ConnectionState, AutoclickError> {
        let mut entry = self
            .entries
            .remove(&registered_as)
            .ok_or(AutoclickError::NodeNotFound(registered_as))?;

        entry.state = if connections.is_empty() {
            ConnectionState::ConnectionsResolved
        } else {
            ConnectionState::ConnectionsPending
        };
        entry.connections = connections;

        let state = entry.state;
        self.entries.insert(node, entry);
        Ok(state)
    }

    #[must_use]
    pub fn state(&self, node: NodeId) -> Option<ConnectionState> {
        self.entries.get(&node).map(|entry| entry.state)
    }

    /// Number of descriptors waiting for resolution.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| entry.state == ConnectionState::ConnectionsPending)
            .map(|entry| entry.connections.len())
            .sum()
    }

    /// Link every pending descriptor, in source-id order.
    ///
    /// Fails with `PhaseOrder` before touching the graph if any tracked node
    /// is still `Created`.
    pub fn resolve<G: LiveGraph>(
        &mut self,
        graph: &mut G,
        id_map: &IdMap,
    ) -> Result<ResolveReport, AutoclickError> {
        if let Some((node, _)) = self
            .entries
            .iter()
            .find(|(_, entry)| entry.state == ConnectionState::Created)
        {
            return Err(AutoclickError::PhaseOrder(*node));
        }

        let mut report = ResolveReport::default();

        for (&source, entry) in &mut self.entries {
            if entry.state != ConnectionState::ConnectionsPending {
                continue;
            }

            let connections = std::mem::take(&mut entry.connections);
            for (index, connection) in connections.into_iter().enumerate() {
                let outcome = if connection.is_malformed() {
                    Err(FailureReason::Malformed)
                } else if index >= MAX_CONNECTIONS_PER_NODE {
                    Err(FailureReason::TooManyConnections)
                } else {
                    link_one(graph, id_map, source, &connection)
                };

                match outcome {
                    Ok(()) => report.succeeded += 1,
                    Err(reason) => {
                        tracing::warn!(
                            source = %entry.source_id,
                            target = %connection.target_id,
                            output_slot = connection.output_slot,
                            input_slot = connection.input_slot,
                            %reason,
                            "dropping connection"
                        );
                        report.failed.push(FailedConnection {
                            source_id: entry.source_id.clone(),
                            connection,
                            reason,
                        });
                    }
                }
            }
            entry.state = ConnectionState::ConnectionsResolved;
        }

        Ok(report)
    }
}

fn link_one<G: LiveGraph>(
    graph: &mut G,
    id_map: &IdMap,
    source: NodeId,
    connection: &Connection,
) -> Result<(), FailureReason> {
    let target = NodeId::parse_persisted(&connection.target_id)
        .ok()
        .and_then(|persisted| id_map.get(&persisted).copied())
        .ok_or(FailureReason::MissingTarget)?;

    let source_kind = graph.node(source).ok_or(FailureReason::Rejected)?.kind();
    let target_kind = graph
        .node(target)
        .ok_or(FailureReason::MissingTarget)?
        .kind();

    if !source_kind.interface().has_output(connection.output_slot) {
        return Err(FailureReason::MissingOutputSlot);
    }
    if !target_kind.interface().has_input(connection.input_slot) {
        return Err(FailureReason::MissingInputSlot);
    }

    graph
        .connect(source, connection.output_slot, target, connection.input_slot)
        .map(|_| ())
        .map_err(|_| FailureReason::Rejected)
}

// =============================================================================
// TESTS
// =============================================================================
