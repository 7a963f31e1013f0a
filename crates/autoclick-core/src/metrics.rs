//! # Drawing Metrics
//!
//! Read-only summary of a graph's shape, for diagnostics and the CLI.

use crate::action::ActionKind;
use crate::graph::{Graph, LiveGraph};
use crate::types::NodeId;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// An output slot with nothing attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OpenOutput {
    pub node: NodeId,
    pub slot: usize,
}

/// Shape summary of a drawing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DrawingMetrics {
    pub node_count: usize,
    pub link_count: usize,
    /// Nodes per action tag.
    pub kinds: BTreeMap<&'static str, usize>,
    /// Where execution begins: nodes with no incoming link.
    ///
    /// When every node has one (a pure cycle) the lowest id is used.
    pub start_nodes: Vec<NodeId>,
    pub open_outputs: Vec<OpenOutput>,
}

impl DrawingMetrics {
    #[must_use]
    pub fn from_graph(graph: &Graph) -> Self {
        let ids = graph.node_ids();
        let mut metrics = Self {
            node_count: ids.len(),
            link_count: graph.link_count(),
            ..Self::default()
        };

        let targeted: BTreeSet<NodeId> = graph.links().map(|link| link.target).collect();

        for id in &ids {
            let Some(node) = graph.node(*id) else {
                continue;
            };
            let kind: ActionKind = node.kind();
            *metrics.kinds.entry(kind.tag()).or_insert(0) += 1;

            if !targeted.contains(id) {
                metrics.start_nodes.push(*id);
            }
            for slot in 0..kind.interface().outputs.len() {
                if graph.output_links(*id, slot).is_empty() {
                    metrics.open_outputs.push(OpenOutput { node: *id, slot });
                }
            }
        }

        if metrics.start_nodes.is_empty()
            && let Some(first) = ids.first()
        {
            metrics.start_nodes.push(*first);
        }
        metrics
    }
}
