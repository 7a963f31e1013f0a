//! # Selection
//!
//! Multi-node selection over a live graph: click selection, rubber-band box
//! selection and translating every selected node by a drag delta.
//!
//! Only ids are stored. Geometry is read from the graph on demand, using each
//! node's size override or its kind's default size.

use crate::graph::LiveGraph;
use crate::primitives::BOX_SELECT_MIN_DRAG;
use crate::types::{NodeId, Point, Rect};
use std::collections::BTreeSet;

/// The set of selected nodes plus the most recently selected one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<NodeId>,
    primary: Option<NodeId>,
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection with a single node.
    pub fn select_only(&mut self, id: NodeId) {
        self.ids.clear();
        self.ids.insert(id);
        self.primary = Some(id);
    }

    /// Add or remove one node. Returns whether it is selected afterwards.
    pub fn toggle(&mut self, id: NodeId) -> bool {
        if self.ids.remove(&id) {
            if self.primary == Some(id) {
                self.primary = self.ids.last().copied();
            }
            false
        } else {
            self.ids.insert(id);
            self.primary = Some(id);
            true
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.primary = None;
    }

    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.ids.contains(&id)
    }

    /// The node the host shows in its properties panel.
    #[must_use]
    pub fn primary(&self) -> Option<NodeId> {
        self.primary
    }

    /// Selected ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.ids.iter().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Select every node whose bounds strictly overlap the dragged box.
    ///
    /// A drag no longer than `BOX_SELECT_MIN_DRAG` is a click and changes
    /// nothing. Unless `additive`, the previous selection is dropped first.
    /// Returns the number of nodes inside the box.
    pub fn box_select<G: LiveGraph>(
        &mut self,
        graph: &G,
        start: Point,
        end: Point,
        additive: bool,
    ) -> usize {
        if start.distance(end) <= BOX_SELECT_MIN_DRAG {
            return 0;
        }
        if !additive {
            self.clear();
        }

        let area = Rect::from_corners(start, end);
        let mut hits = 0;
        for id in graph.node_ids() {
            let inside = graph
                .node(id)
                .is_some_and(|node| node.bounds().intersects(&area));
            if inside {
                self.ids.insert(id);
                self.primary = Some(id);
                hits += 1;
            }
        }
        hits
    }

    /// Move every selected node by `(dx, dy)`, except `except`.
    ///
    /// The host moves the node under the pointer itself; the rest follow.
    /// Returns the number of nodes moved.
    pub fn translate<G: LiveGraph>(
        &self,
        graph: &mut G,
        dx: f64,
        dy: f64,
        except: Option<NodeId>,
    ) -> usize {
        let mut moved = 0;
        for id in self.ids.iter().copied().filter(|id| Some(*id) != except) {
            if let Some(node) = graph.node_mut(id) {
                node.pos.x += dx;
                node.pos.y += dy;
                moved += 1;
            }
        }
        moved
    }

    /// Forget ids that no longer exist in the graph.
    pub fn prune<G: LiveGraph>(&mut self, graph: &G) {
        self.ids.retain(|id| graph.node(*id).is_some());
        if self.primary.is_some_and(|id| !self.ids.contains(&id)) {
            self.primary = self.ids.last().copied();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionKind;
    use crate::graph::Graph;

    /// Three nodes in a row, 200 units apart, default 150x80 bounds.
    fn row() -> (Graph, Vec<NodeId>) {
        let mut graph = Graph::new();
        let ids = (0..3)
            .map(|i| {
                graph
                    .create_node(ActionKind::Click, Point::new(f64::from(i) * 200.0, 0.0))
                    .expect("create")
            })
            .collect();
        (graph, ids)
    }

    #[test]
    fn toggle_adds_and_removes() {
        let mut sel = Selection::new();
        assert!(sel.toggle(NodeId(1)));
        assert!(sel.toggle(NodeId(2)));
        assert_eq!(sel.primary(), Some(NodeId(2)));

        assert!(!sel.toggle(NodeId(2)));
        assert_eq!(sel.primary(), Some(NodeId(1)));
        assert_eq!(sel.len(), 1);
    }

    #[test]
    fn select_only_replaces() {
        let mut sel = Selection::new();
        sel.toggle(NodeId(1));
        sel.toggle(NodeId(2));
        sel.select_only(NodeId(3));

        assert_eq!(sel.iter().collect::<Vec<_>>(), vec![NodeId(3)]);
        sel.clear();
        assert!(sel.is_empty());
        assert_eq!(sel.primary(), None);
    }

    #[test]
    fn short_drag_is_ignored() {
        let (graph, ids) = row();
        let mut sel = Selection::new();
        sel.select_only(ids[2]);

        let hits = sel.box_select(&graph, Point::new(0.0, 0.0), Point::new(6.0, 8.0), false);
        assert_eq!(hits, 0);
        assert!(sel.contains(ids[2]));
    }

    #[test]
    fn box_selects_intersecting_nodes() {
        let (graph, ids) = row();
        let mut sel = Selection::new();
        sel.select_only(ids[2]);

        // Spans the first node and the left edge of the second.
        let hits = sel.box_select(&graph, Point::new(-10.0, -10.0), Point::new(210.0, 40.0), false);

        assert_eq!(hits, 2);
        assert!(sel.contains(ids[0]));
        assert!(sel.contains(ids[1]));
        assert!(!sel.contains(ids[2]));
        assert_eq!(sel.primary(), Some(ids[1]));
    }

    #[test]
    fn touching_edge_is_not_selected() {
        let (graph, ids) = row();
        let mut sel = Selection::new();

        // Right edge of node 0 is x = 150; the box starts exactly there.
        sel.box_select(&graph, Point::new(150.0, 0.0), Point::new(199.0, 50.0), false);
        assert!(!sel.contains(ids[0]));
        assert!(sel.is_empty());
    }

    #[test]
    fn additive_box_keeps_previous_selection() {
        let (graph, ids) = row();
        let mut sel = Selection::new();
        sel.select_only(ids[2]);

        sel.box_select(&graph, Point::new(0.0, 0.0), Point::new(20.0, 20.0), true);
        assert_eq!(sel.len(), 2);
    }

    #[test]
    fn translate_moves_all_but_the_dragged_node() {
        let (mut graph, ids) = row();
        let mut sel = Selection::new();
        for id in &ids {
            sel.toggle(*id);
        }

        let moved = sel.translate(&mut graph, 5.0, -3.0, Some(ids[0]));

        assert_eq!(moved, 2);
        assert_eq!(graph.node(ids[0]).map(|n| n.pos), Some(Point::new(0.0, 0.0)));
        assert_eq!(graph.node(ids[1]).map(|n| n.pos), Some(Point::new(205.0, -3.0)));
    }

    #[test]
    fn prune_drops_removed_nodes() {
        let (mut graph, ids) = row();
        let mut sel = Selection::new();
        sel.toggle(ids[0]);
        sel.toggle(ids[1]);
        graph.remove_node(ids[1]).expect("remove");

        sel.prune(&graph);
        assert_eq!(sel.iter().collect::<Vec<_>>(), vec![ids[0]]);
        assert_eq!(sel.primary(), Some(ids[0]));
    }
}
