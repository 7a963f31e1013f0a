//! # Live Graph
//!
//! The in-memory node graph a drawing is edited in.
//!
//! This module defines the `LiveGraph` trait, the interface the export and
//! import protocol consumes, and `Graph`, its in-memory implementation.
//! All collections use `BTreeMap` so iteration order is deterministic.

use crate::action::ActionKind;
use crate::types::{AutoclickError, Link, LinkId, Node, NodeId, Point, SlotDirection};
use std::collections::BTreeMap;

// =============================================================================
// LIVEGRAPH TRAIT
// =============================================================================

/// The operations the serialization protocol needs from a node graph.
///
/// Mutations are synchronous and atomic: a failed call leaves the graph
/// unchanged.
pub trait LiveGraph {
    /// Create a node of the given kind, assigning the next runtime identifier.
    ///
    /// The node starts with the kind's defaults in its params bag.
    fn create_node(&mut self, kind: ActionKind, pos: Point) -> Result<NodeId, AutoclickError>;

    /// Move a node from identifier `from` to identifier `to`.
    ///
    /// Links referencing `from` are rewritten. Fails without mutating when
    /// `from` is missing or `to` is held by another node.
    fn rekey(&mut self, from: NodeId, to: NodeId) -> Result<(), AutoclickError>;

    /// Ensure the runtime counter never hands out `id` or anything below it.
    fn reserve_ids_through(&mut self, id: NodeId);

    /// Lookup a node by identifier.
    fn node(&self, id: NodeId) -> Option<&Node>;

    /// Mutable lookup by identifier.
    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node>;

    /// Remove a node and every link attached to it.
    fn remove_node(&mut self, id: NodeId) -> Result<Node, AutoclickError>;

    /// Link `origin.origin_slot` to `target.target_slot`.
    fn connect(
        &mut self,
        origin: NodeId,
        origin_slot: usize,
        target: NodeId,
        target_slot: usize,
    ) -> Result<LinkId, AutoclickError>;

    /// Remove one link.
    fn disconnect(&mut self, link: LinkId) -> Result<Link, AutoclickError>;

    /// Lookup a link by identifier.
    fn link(&self, id: LinkId) -> Option<&Link>;

    /// Links leaving one output slot, ordered by link identifier.
    fn output_links(&self, node: NodeId, slot: usize) -> Vec<LinkId>;

    /// All node identifiers in ascending order.
    fn node_ids(&self) -> Vec<NodeId>;

    /// Total number of nodes.
    fn node_count(&self) -> usize;

    /// Total number of links.
    fn link_count(&self) -> usize;

    /// Remove every node and link. The identifier counters are reset.
    fn clear(&mut self);
}

// =============================================================================
// GRAPH IMPLEMENTATION
// =============================================================================

/// The in-memory live graph.
#[derive(Debug, Clone)]
pub struct Graph {
    /// Identifier index: NodeId -> Node
    nodes: BTreeMap<NodeId, Node>,

    /// Link storage: LinkId -> Link
    links: BTreeMap<LinkId, Link>,

    /// Next runtime node identifier
    next_node_id: u64,

    /// Next link identifier
    next_link_id: u64,
}

impl Default for Graph {
    fn default() -> Self {
        Self {
            nodes: BTreeMap::new(),
            links: BTreeMap::new(),
            next_node_id: 1,
            next_link_id: 1,
        }
    }
}

impl Graph {
    /// Create a new empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all nodes in identifier order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get all links in identifier order.
    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.values()
    }

    /// Links arriving at a node, in identifier order.
    pub fn incoming_links(&self, node: NodeId) -> impl Iterator<Item = &Link> + '_ {
        self.links.values().filter(move |link| link.target == node)
    }

    /// The identifier the next `create_node` call would assign.
    #[must_use]
    pub fn next_node_id(&self) -> NodeId {
        NodeId(self.next_node_id)
    }

    /// Check whether a link exists between two slots.
    #[must_use]
    pub fn contains_link(
        &self,
        origin: NodeId,
        origin_slot: usize,
        target: NodeId,
        target_slot: usize,
    ) -> bool {
        self.links.values().any(|link| {
            link.origin == origin
                && link.origin_slot == origin_slot
                && link.target == target
                && link.target_slot == target_slot
        })
    }

    /// Drop a node from the index while leaving its links behind.
    ///
    /// Produces the stale-link state a host library can end up in.
    #[cfg(test)]
    pub(crate) fn forget_node(&mut self, id: NodeId) {
        self.nodes.remove(&id);
    }

    fn check_slot(
        &self,
        node: NodeId,
        direction: SlotDirection,
        slot: usize,
    ) -> Result<(), AutoclickError> {
        let iface = self
            .nodes
            .get(&node)
            .ok_or(AutoclickError::NodeNotFound(node))?
            .kind()
            .interface();
        let present = match direction {
            SlotDirection::Input => iface.has_input(slot),
            SlotDirection::Output => iface.has_output(slot),
        };
        if present {
            Ok(())
        } else {
            Err(AutoclickError::SlotOutOfRange {
                node,
                direction,
                slot,
            })
        }
    }
}

impl LiveGraph for Graph {
    fn create_node(&mut self, kind: ActionKind, pos: Point) -> Result<NodeId, AutoclickError> {
        let id = NodeId(self.next_node_id);
        if self.nodes.contains_key(&id) {
            return Err(AutoclickError::IdCollision(id));
        }
        self.next_node_id = id.0.saturating_add(1);

        let mut node = Node::new(id, kind, pos);
        node.params = kind.defaults();
        self.nodes.insert(id, node);
        Ok(id)
    }

    fn rekey(&mut self, from: NodeId, to: NodeId) -> Result<(), AutoclickError> {
        if from == to {
            return if self.nodes.contains_key(&from) {
                Ok(())
            } else {
                Err(AutoclickError::NodeNotFound(from))
            };
        }
        if self.nodes.contains_key(&to) {
            return Err(AutoclickError::IdCollision(to));
        }
        let mut node = self
            .nodes
            .remove(&from)
            .ok_or(AutoclickError::NodeNotFound(from))?;
        node.id = to;
        self.nodes.insert(to, node);

        for link in self.links.values_mut() {
            if link.origin == from {
                link.origin = to;
            }
            if link.target == from {
                link.target = to;
            }
        }

        self.reserve_ids_through(to);
        Ok(())
    }

    fn reserve_ids_through(&mut self, id: NodeId) {
        if id.0 >= self.next_node_id {
            self.next_node_id = id.0.saturating_add(1);
        }
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    fn remove_node(&mut self, id: NodeId) -> Result<Node, AutoclickError> {
        let node = self
            .nodes
            .remove(&id)
            .ok_or(AutoclickError::NodeNotFound(id))?;
        self.links
            .retain(|_, link| link.origin != id && link.target != id);
        Ok(node)
    }

    fn connect(
        &mut self,
        origin: NodeId,
        origin_slot: usize,
        target: NodeId,
        target_slot: usize,
    ) -> Result<LinkId, AutoclickError> {
        self.check_slot(origin, SlotDirection::Output, origin_slot)?;
        self.check_slot(target, SlotDirection::Input, target_slot)?;

        let id = LinkId(self.next_link_id);
        self.next_link_id = self.next_link_id.saturating_add(1);
        self.links.insert(
            id,
            Link {
                id,
                origin,
                origin_slot,
                target,
                target_slot,
            },
        );
        Ok(id)
    }

    fn disconnect(&mut self, link: LinkId) -> Result<Link, AutoclickError> {
        self.links
            .remove(&link)
            .ok_or(AutoclickError::LinkNotFound(link))
    }

    fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.get(&id)
    }

    fn output_links(&self, node: NodeId, slot: usize) -> Vec<LinkId> {
        self.links
            .values()
            .filter(|link| link.origin == node && link.origin_slot == slot)
            .map(|link| link.id)
            .collect()
    }

    fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.keys().copied().collect()
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn link_count(&self) -> usize {
        self.links.len()
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

// =============================================================================
// TESTS
// =============================================================================
