//! # Graph Exporter
//!
//! Walks the live graph and produces a Graph Document.
//!
//! Export is a pure read. Records come out in ascending id order and each
//! record's connections are grouped by output slot, then ordered by link id,
//! so the same graph always yields the same document.

use crate::document::{Connection, ConnectionFormat, GraphDocument, NodeRecord};
use crate::graph::LiveGraph;
use crate::primitives::ACTION_TYPE_KEY;
use crate::types::{AutoclickError, Node};

/// Output options for `Exporter::export_json`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOptions {
    pub connection_format: ConnectionFormat,
}

impl ExportOptions {
    /// Bare target-id connection lists, for backends that walk ids only.
    #[must_use]
    pub fn legacy() -> Self {
        Self {
            connection_format: ConnectionFormat::Legacy,
        }
    }
}

/// Converts a live graph into its persisted form.
pub struct Exporter;

impl Exporter {
    /// Build the document for the current graph state.
    pub fn export<G: LiveGraph>(graph: &G) -> GraphDocument {
        let nodes = graph
            .node_ids()
            .into_iter()
            .filter_map(|id| graph.node(id))
            .map(|node| Self::record(graph, node))
            .collect();
        GraphDocument::new(nodes)
    }

    /// Export and encode as indented JSON.
    pub fn export_json<G: LiveGraph>(
        graph: &G,
        options: ExportOptions,
    ) -> Result<String, AutoclickError> {
        Self::export(graph).to_json_pretty(options.connection_format)
    }

    fn record<G: LiveGraph>(graph: &G, node: &Node) -> NodeRecord {
        let x = node.pos.x.round();
        let y = node.pos.y.round();

        let mut record = NodeRecord::new(node.id().to_string(), node.kind().tag()).at(x, y);
        record.title = Some(node.title.clone());
        record.params = node.params.clone();
        record.params.remove(ACTION_TYPE_KEY);
        record.size = node.size.map(|size| [size.width, size.height]);
        record.connections = Self::connections(graph, node);
        record
    }

    fn connections<G: LiveGraph>(graph: &G, node: &Node) -> Vec<Connection> {
        let mut out = Vec::new();
        let slots = node.kind().interface().outputs.len();

        for slot in 0..slots {
            for link_id in graph.output_links(node.id(), slot) {
                let Some(link) = graph.link(link_id) else {
                    continue;
                };
                if graph.node(link.target).is_none() {
                    tracing::debug!(
                        source = %node.id(),
                        target = %link.target,
                        link = %link_id,
                        "skipping stale link"
                    );
                    continue;
                }
                out.push(Connection::new(
                    link.target.to_string(),
                    link.origin_slot,
                    link.target_slot,
                ));
            }
        }
        out
    }
}

// =============================================================================
// TESTS
// =============================================================================
