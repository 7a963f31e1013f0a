//! # Identity Reconciler
//!
//! Makes a node's runtime identifier equal to its persisted identifier.
//!
//! The live graph's factory assigns ids from its counter, so a node rebuilt
//! from a document may come back under a different id than the one it was
//! saved with. Connection resolution and re-export both address nodes by the
//! persisted id, so the node is moved with a single atomic `rekey` before any
//! other node can reference it.

use crate::graph::LiveGraph;
use crate::types::{AutoclickError, NodeId};

/// Aligns runtime identifiers with persisted identifiers.
pub struct IdentityReconciler;

impl IdentityReconciler {
    /// Ensure the node created as `runtime` is addressable as `persisted`.
    ///
    /// Returns the identifier the node holds afterwards. On failure the
    /// graph is unchanged and the node keeps its runtime identifier.
    pub fn reconcile<G: LiveGraph>(
        graph: &mut G,
        runtime: NodeId,
        persisted: NodeId,
    ) -> Result<NodeId, AutoclickError> {
        if runtime == persisted {
            return if graph.node(runtime).is_some() {
                Ok(runtime)
            } else {
                Err(AutoclickError::NodeNotFound(runtime))
            };
        }

        graph.rekey(runtime, persisted)?;
        tracing::debug!(%runtime, %persisted, "rekeyed node");
        Ok(persisted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionKind;
    use crate::graph::Graph;
    use crate::types::Point;

    #[test]
    fn matching_ids_are_left_alone() {
        let mut graph = Graph::new();
        let id = graph
            .create_node(ActionKind::Click, Point::default())
            .expect("create");

        let settled = IdentityReconciler::reconcile(&mut graph, id, id).expect("reconcile");
        assert_eq!(settled, id);
        assert_eq!(graph.next_node_id(), NodeId(2));
    }

    #[test]
    fn differing_ids_are_rekeyed() {
        let mut graph = Graph::new();
        let id = graph
            .create_node(ActionKind::Click, Point::default())
            .expect("create");

        let settled =
            IdentityReconciler::reconcile(&mut graph, id, NodeId(12)).expect("reconcile");

        assert_eq!(settled, NodeId(12));
        assert!(graph.node(id).is_none());
        assert_eq!(graph.node(NodeId(12)).map(|n| n.id()), Some(NodeId(12)));
    }

    #[test]
    fn taken_persisted_id_is_a_collision() {
        let mut graph = Graph::new();
        let a = graph
            .create_node(ActionKind::Click, Point::default())
            .expect("create");
        let b = graph
            .create_node(ActionKind::Wait, Point::default())
            .expect("create");

        assert!(matches!(
            IdentityReconciler::reconcile(&mut graph, b, a),
            Err(AutoclickError::IdCollision(id)) if id == a
        ));
        assert_eq!(graph.node(b).map(|n| n.kind()), Some(ActionKind::Wait));
    }

    #[test]
    fn missing_node_is_reported() {
        let mut graph = Graph::new();
        assert!(IdentityReconciler::reconcile(&mut graph, NodeId(3), NodeId(3)).is_err());
    }
}
