//! # Graph Importer
//!
//! Rebuilds a live graph from a Graph Document.
//!
//! The import runs three phases with a strict barrier between each:
//!
//! 1. **Create**: every acceptable record becomes a live node through the
//!    graph's factory, carrying the record's params, size and title.
//! 2. **Reconcile**: every created node is rekeyed to its persisted id.
//! 3. **Resolve**: the pending connection descriptors of every node are
//!    linked against the completed identifier map.
//!
//! Data-shape problems in the document never abort the import. Records that
//! cannot become nodes are listed in the report, descriptors that cannot
//! become links are counted in its `ResolveReport`.

use crate::action::ActionKind;
use crate::document::{GraphDocument, NodeRecord};
use crate::graph::LiveGraph;
use crate::primitives::{ACTION_TYPE_KEY, MAX_IMPORT_NODE_COUNT};
use crate::reconcile::IdentityReconciler;
use crate::resolver::{IdMap, PendingConnections, ResolveReport};
use crate::types::{AutoclickError, NodeId};
use std::collections::BTreeSet;
use std::fmt;

// =============================================================================
// REPORT
// =============================================================================

/// Why a record produced no node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// `action_type` is not in the catalogue.
    UnknownActionType,
    /// `id` is not a non-negative integer.
    InvalidId,
    /// An earlier record already claimed the same `id`.
    DuplicateId,
    /// The node could not take its persisted identifier.
    IdCollision,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::UnknownActionType => "unknown action type",
            Self::InvalidId => "invalid id",
            Self::DuplicateId => "duplicate id",
            Self::IdCollision => "id collision",
        };
        f.write_str(text)
    }
}

/// A record that was left out of the live graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    /// Position of the record in the document's `nodes` array.
    pub index: usize,
    pub id: String,
    pub action_type: String,
    pub reason: SkipReason,
}

/// Outcome of one import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Number of records that became live nodes.
    pub created: usize,
    pub skipped: Vec<SkippedRecord>,
    pub connections: ResolveReport,
}

impl ImportReport {
    /// True when every record and every descriptor made it into the graph.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty() && self.connections.is_clean()
    }
}

// =============================================================================
// IMPORTER
// =============================================================================

/// A record that passed phase 1.
struct CreatedNode<'a> {
    runtime: NodeId,
    persisted: NodeId,
    index: usize,
    record: &'a NodeRecord,
}

/// The Importer drives the create / reconcile / resolve protocol.
pub struct Importer;

impl Importer {
    /// Replace the contents of `graph` with the nodes and links of `document`.
    ///
    /// Fails only when the document exceeds `MAX_IMPORT_NODE_COUNT`, in
    /// which case the graph is left untouched.
    pub fn import<G: LiveGraph>(
        graph: &mut G,
        document: &GraphDocument,
    ) -> Result<ImportReport, AutoclickError> {
        if document.nodes.len() > MAX_IMPORT_NODE_COUNT {
            return Err(AutoclickError::DocumentTooLarge {
                count: document.nodes.len(),
                max: MAX_IMPORT_NODE_COUNT,
            });
        }

        graph.clear();
        let mut report = ImportReport::default();

        // Factory ids start above every persisted id, so rekeying never
        // lands on a node that is still waiting for its own rekey.
        if let Some(max) = document
            .nodes
            .iter()
            .filter_map(|record| NodeId::parse_persisted(&record.id).ok())
            .max()
        {
            graph.reserve_ids_through(max);
        }

        // Phase 1: create
        let mut pending = PendingConnections::new();
        let mut claimed = BTreeSet::new();
        let mut created = Vec::with_capacity(document.nodes.len());

        for (index, record) in document.nodes.iter().enumerate() {
            match Self::create(graph, record, &claimed) {
                Ok((runtime, persisted)) => {
                    claimed.insert(persisted);
                    pending.register(runtime, record.id.clone());
                    created.push(CreatedNode {
                        runtime,
                        persisted,
                        index,
                        record,
                    });
                }
                Err(reason) => Self::skip(&mut report, index, record, reason),
            }
        }

        // Phase 2: reconcile
        let mut id_map = IdMap::new();
        for entry in created {
            match IdentityReconciler::reconcile(graph, entry.runtime, entry.persisted) {
                Ok(settled) => {
                    id_map.insert(entry.persisted, settled);
                    pending.mark_reconciled(
                        entry.runtime,
                        settled,
                        entry.record.connections.clone(),
                    )?;
                }
                Err(e) => {
                    tracing::warn!(id = %entry.record.id, error = %e, "could not reconcile node");
                    graph.remove_node(entry.runtime)?;
                    pending.discard(entry.runtime);
                    Self::skip(&mut report, entry.index, entry.record, SkipReason::IdCollision);
                }
            }
        }
        report.created = id_map.len();

        // Phase 3: resolve
        report.connections = pending.resolve(graph, &id_map)?;

        tracing::info!(
            nodes = report.created,
            skipped = report.skipped.len(),
            links = report.connections.succeeded,
            dropped = report.connections.failed_count(),
            "imported drawing"
        );
        Ok(report)
    }

    /// Parse a JSON document and import it.
    pub fn import_json<G: LiveGraph>(
        graph: &mut G,
        text: &str,
    ) -> Result<ImportReport, AutoclickError> {
        let document = GraphDocument::from_json(text)?;
        Self::import(graph, &document)
    }

    fn create<G: LiveGraph>(
        graph: &mut G,
        record: &NodeRecord,
        claimed: &BTreeSet<NodeId>,
    ) -> Result<(NodeId, NodeId), SkipReason> {
        let persisted =
            NodeId::parse_persisted(&record.id).map_err(|_| SkipReason::InvalidId)?;
        if claimed.contains(&persisted) {
            return Err(SkipReason::DuplicateId);
        }
        let kind =
            ActionKind::from_tag(&record.action_type).ok_or(SkipReason::UnknownActionType)?;

        let runtime = graph
            .create_node(kind, record.position())
            .map_err(|_| SkipReason::IdCollision)?;

        if let Some(node) = graph.node_mut(runtime) {
            node.params = record.params.clone();
            node.params.remove(ACTION_TYPE_KEY);
            node.size = record.size_override();
            if let Some(title) = &record.title {
                node.title.clone_from(title);
            }
        }
        Ok((runtime, persisted))
    }

    fn skip(report: &mut ImportReport, index: usize, record: &NodeRecord, reason: SkipReason) {
        tracing::warn!(
            index,
            id = %record.id,
            action_type = %record.action_type,
            %reason,
            "skipping record"
        );
        report.skipped.push(SkippedRecord {
            index,
            id: record.id.clone(),
            action_type: record.action_type.clone(),
            reason,
        });
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Connection;
    use crate::graph::Graph;
    use crate::types::Point;
    use serde_json::json;

    fn record(id: &str, tag: &str) -> NodeRecord {
        NodeRecord::new(id, tag)
    }

    #[test]
    fn forward_reference_resolves() {
        let mut a = record("7", "click");
        a.connections.push(Connection::new("3", 0, 0));
        let doc = GraphDocument::new(vec![a, record("3", "wait")]);

        let mut graph = Graph::new();
        let report = Importer::import(&mut graph, &doc).expect("import");

        assert_eq!(report.created, 2);
        assert_eq!(report.connections.succeeded, 1);
        assert!(graph.contains_link(NodeId(7), 0, NodeId(3), 0));
    }

    #[test]
    fn params_replace_defaults_and_drop_action_type() {
        let mut r = record("1", "click");
        r.params.insert("x".into(), json!(5));
        r.params.insert("action_type".into(), json!("move"));
        let doc = GraphDocument::new(vec![r]);

        let mut graph = Graph::new();
        Importer::import(&mut graph, &doc).expect("import");
        let node = graph.node(NodeId(1)).expect("node");

        assert_eq!(node.kind(), ActionKind::Click);
        assert_eq!(node.params.len(), 1);
        assert_eq!(node.param("x"), Some(json!(5)));
        assert_eq!(node.param("y_random"), Some(json!(0)));
    }

    #[test]
    fn title_size_and_position_are_applied() {
        let mut r = record("4", "if").at(30.0, 40.0);
        r.title = Some("Branch".into());
        r.size = Some([200.0, 100.0]);
        let doc = GraphDocument::new(vec![r]);

        let mut graph = Graph::new();
        Importer::import(&mut graph, &doc).expect("import");
        let node = graph.node(NodeId(4)).expect("node");

        assert_eq!(node.title, "Branch");
        assert_eq!(node.pos, Point::new(30.0, 40.0));
        assert_eq!(node.bounds().width, 200.0);
    }

    #[test]
    fn import_clears_previous_contents() {
        let mut graph = Graph::new();
        graph
            .create_node(ActionKind::Move, Point::default())
            .expect("create");

        let doc = GraphDocument::new(vec![record("10", "wait")]);
        Importer::import(&mut graph, &doc).expect("import");

        assert_eq!(graph.node_ids(), vec![NodeId(10)]);
    }

    #[test]
    fn duplicate_ids_keep_first_occurrence() {
        let doc = GraphDocument::new(vec![record("2", "click"), record("2", "wait")]);

        let mut graph = Graph::new();
        let report = Importer::import(&mut graph, &doc).expect("import");

        assert_eq!(report.created, 1);
        assert_eq!(report.skipped[0].reason, SkipReason::DuplicateId);
        assert_eq!(report.skipped[0].index, 1);
        assert_eq!(
            graph.node(NodeId(2)).map(|n| n.kind()),
            Some(ActionKind::Click)
        );
    }

    #[test]
    fn unknown_first_claimant_does_not_block_a_later_valid_one() {
        let doc = GraphDocument::new(vec![record("2", "teleport"), record("2", "wait")]);

        let mut graph = Graph::new();
        let report = Importer::import(&mut graph, &doc).expect("import");

        assert_eq!(report.created, 1);
        assert_eq!(report.skipped[0].reason, SkipReason::UnknownActionType);
        assert_eq!(
            graph.node(NodeId(2)).map(|n| n.kind()),
            Some(ActionKind::Wait)
        );
    }

    #[test]
    fn non_numeric_id_is_skipped() {
        let doc = GraphDocument::new(vec![record("abc", "click"), record("1", "click")]);

        let mut graph = Graph::new();
        let report = Importer::import(&mut graph, &doc).expect("import");

        assert_eq!(report.created, 1);
        assert_eq!(report.skipped[0].reason, SkipReason::InvalidId);
        assert!(!report.is_complete());
    }

    #[test]
    fn oversized_document_is_rejected_untouched() {
        let mut graph = Graph::new();
        let kept = graph
            .create_node(ActionKind::Wait, Point::default())
            .expect("create");

        let nodes = (0..=MAX_IMPORT_NODE_COUNT)
            .map(|i| record(&i.to_string(), "wait"))
            .collect();
        let result = Importer::import(&mut graph, &GraphDocument::new(nodes));

        assert!(matches!(
            result,
            Err(AutoclickError::DocumentTooLarge { .. })
        ));
        assert!(graph.node(kept).is_some());
    }

    #[test]
    fn new_nodes_after_import_do_not_collide() {
        let doc = GraphDocument::new(vec![record("1", "click"), record("5", "wait")]);

        let mut graph = Graph::new();
        Importer::import(&mut graph, &doc).expect("import");
        let fresh = graph
            .create_node(ActionKind::Move, Point::default())
            .expect("create");

        assert!(fresh.0 > 5);
    }

    #[test]
    fn import_json_reports_malformed_input() {
        let mut graph = Graph::new();
        assert!(matches!(
            Importer::import_json(&mut graph, "not json"),
            Err(AutoclickError::DeserializationError(_))
        ));
    }
}
