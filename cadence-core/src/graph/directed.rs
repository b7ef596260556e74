//! The Directed Graph
//!
//! An ordered arena of [`NodeRecord`]s plus the only supported mutation
//! surface: add/remove node, add/remove link, and the cascade entry point.
//!
//! # Dense indexing
//!
//! Node positions are contiguous `0..N-1` at all times. Removing the node at
//! position `k` strips its links (and their mirrors on neighboring
//! records), removes the record, and rewrites every surviving link endpoint
//! at or beyond `k`, one atomic edit from the caller's point of view.
//!
//! # Failure semantics
//!
//! Edits aimed at nodes that are not in the graph are silent no-ops; the
//! graph is a best-effort connectivity ledger built incrementally by its
//! client. Socket-range violations, by contrast, are wiring bugs raised by
//! the node contract and propagate unchanged out of a cascade.

use smallvec::SmallVec;
use thiserror::Error;
use tracing::{debug, trace};

use crate::connect::{Connectable, InvalidSocket};
use crate::graph::link::Link;
use crate::graph::node::{LinkList, NodeId, NodeRecord};

/// A cascade that could not run to completion.
#[derive(Debug, Error)]
pub enum CascadeError {
    /// Propagation re-entered a node already on the active path. The link
    /// structure contains a directed cycle, which this engine does not
    /// support.
    #[error("cascade re-entered node {} on its own downstream path", .0.raw())]
    CycleDetected(NodeId),

    /// A push addressed a socket outside the destination's declared range.
    #[error(transparent)]
    Socket(#[from] InvalidSocket),
}

/// A directed graph of computation nodes with socket-labeled links.
#[derive(Debug, Default)]
pub struct DirectedGraph {
    nodes: Vec<NodeRecord>,
}

impl DirectedGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the graph holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All records in positional order.
    pub fn records(&self) -> &[NodeRecord] {
        &self.nodes
    }

    /// Wrap `item` in a new record appended at the end of the arena and
    /// return its identity token. `placement` is an opaque payload carried
    /// for the host's benefit and ignored by all connectivity logic.
    pub fn add_node(
        &mut self,
        item: Box<dyn Connectable>,
        placement: Option<Vec<f64>>,
    ) -> NodeId {
        let record = NodeRecord::new(item, placement);
        let id = record.id();
        debug!(
            id = id.raw(),
            index = self.nodes.len(),
            label = record.item().label(),
            "adding node"
        );
        self.nodes.push(record);
        id
    }

    /// The current position of the node with identity `id`, or `None` when
    /// it is not in this graph. O(N) scan; graphs in this domain are small.
    pub fn node_index(&self, id: NodeId) -> Option<usize> {
        self.nodes.iter().position(|record| record.id() == id)
    }

    /// The record with identity `id`.
    pub fn node(&self, id: NodeId) -> Option<&NodeRecord> {
        self.node_index(id).map(|i| &self.nodes[i])
    }

    /// Mutable access to the record with identity `id`.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut NodeRecord> {
        self.node_index(id).map(move |i| &mut self.nodes[i])
    }

    /// Remove a node and every link touching it, then renumber. Removing an
    /// id that is not in the graph is a no-op.
    pub fn remove_node(&mut self, id: NodeId) {
        let Some(found) = self.node_index(id) else {
            debug!(id = id.raw(), "remove_node: unknown id, ignoring");
            return;
        };

        self.remove_all_incoming_links(found);
        self.remove_all_outgoing_links(found);
        let record = self.nodes.remove(found);
        debug!(
            id = record.id().raw(),
            index = found,
            label = record.item().label(),
            "removed node"
        );

        // Every survivor renumbers: any link crossing the removed position
        // shifts, not just links on the removed node's neighbors.
        for survivor in &mut self.nodes {
            survivor.adjust_for_node_removal(found);
        }
    }

    /// Link `from`'s output socket to `to`'s input socket. A no-op when
    /// either endpoint is absent: callers are expected to add nodes first.
    /// No cycle or socket-bounds check happens here; bounds are the node
    /// contract's concern.
    pub fn add_link(&mut self, from: NodeId, from_socket: usize, to: NodeId, to_socket: usize) {
        let (Some(start), Some(end)) = (self.node_index(from), self.node_index(to)) else {
            debug!(
                from = from.raw(),
                to = to.raw(),
                "add_link: endpoint not in graph, ignoring"
            );
            return;
        };

        let link = Link {
            start,
            start_socket: from_socket,
            end,
            end_socket: to_socket,
        };
        debug!(%link, "adding directional link");
        self.nodes[start].push_outgoing(link);
        self.nodes[end].push_incoming(link);
    }

    /// Remove every link into `(to, to_socket)`, duplicates included,
    /// together with the mirrored outgoing entries on the source records.
    /// A no-op when `to` is absent or nothing matches.
    pub fn remove_links_to(&mut self, to: NodeId, to_socket: usize) {
        let Some(end) = self.node_index(to) else {
            debug!(to = to.raw(), "remove_links_to: unknown id, ignoring");
            return;
        };

        let sources: SmallVec<[usize; 4]> = self.nodes[end]
            .incoming()
            .iter()
            .filter(|link| link.end_socket == to_socket)
            .map(|link| link.start)
            .collect();
        if sources.is_empty() {
            return;
        }

        debug!(
            to = to.raw(),
            to_socket,
            count = sources.len(),
            "removing directional links"
        );
        for source in sources {
            self.nodes[source].remove_outgoing_links_to(end, to_socket);
        }
        self.nodes[end].remove_incoming_links_into(to_socket);
    }

    /// Propagate a value change at the node with identity `id` to all of
    /// its transitive dependents.
    ///
    /// For each node visited, all of its outgoing pushes land before any
    /// child propagates further, and children are visited in link
    /// declaration order. A node reachable over several incoming edges
    /// receives one push (and hence one input-triggered recompute) per
    /// edge. Re-entering a node on its own downstream path means the link
    /// structure is cyclic and fails the cascade.
    pub fn cascade_from(&mut self, id: NodeId) -> Result<(), CascadeError> {
        let Some(start) = self.node_index(id) else {
            debug!(id = id.raw(), "cascade_from: unknown id, ignoring");
            return Ok(());
        };
        let mut on_path = vec![false; self.nodes.len()];
        self.cascade_inner(start, &mut on_path)
    }

    fn cascade_inner(&mut self, at: usize, on_path: &mut [bool]) -> Result<(), CascadeError> {
        if on_path[at] {
            return Err(CascadeError::CycleDetected(self.nodes[at].id()));
        }

        // A node with no outputs has no dependents to feed.
        if self.nodes[at].item().num_outputs() == 0 {
            return Ok(());
        }

        on_path[at] = true;

        // The link list is copied out so pushes can borrow records
        // mutably; no structural edit happens during a cascade.
        let links: LinkList = self.nodes[at].outgoing().iter().copied().collect();

        for link in &links {
            let value = self.nodes[link.start].item().output(link.start_socket)?;
            let origin = self.nodes[link.start].item().label().to_owned();
            trace!(%link, origin = origin.as_str(), "cascade push");
            self.nodes[link.end]
                .item_mut()
                .set_input(link.end_socket, value, Some(&origin))?;
        }

        for link in &links {
            self.cascade_inner(link.end, on_path)?;
        }

        on_path[at] = false;
        Ok(())
    }

    fn remove_all_incoming_links(&mut self, index: usize) {
        let pairs: SmallVec<[(usize, usize); 4]> = self.nodes[index]
            .incoming()
            .iter()
            .map(|link| (link.start, link.end_socket))
            .collect();
        // Sources drop their mirrored outgoing entries first.
        for (source, end_socket) in pairs {
            self.nodes[source].remove_outgoing_links_to(index, end_socket);
        }
        self.nodes[index].clear_incoming();
    }

    fn remove_all_outgoing_links(&mut self, index: usize) {
        let pairs: SmallVec<[(usize, usize); 4]> = self.nodes[index]
            .outgoing()
            .iter()
            .map(|link| (link.end, link.end_socket))
            .collect();
        // Destinations drop their mirrored incoming entries first.
        for (end, end_socket) in pairs {
            self.nodes[end].remove_incoming_link_from(index, end_socket);
        }
        self.nodes[index].clear_outgoing();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connect::{check_input, check_output};
    use crate::value::{kinds, KindSet, Value, ValueKind};

    /// Scalar pass-through with a gain, used to watch cascade propagation.
    struct Gain {
        factor: f64,
        input: Option<f64>,
        output: Option<f64>,
        valid: bool,
    }

    impl Gain {
        fn new(factor: f64) -> Self {
            Self {
                factor,
                input: None,
                output: None,
                valid: false,
            }
        }
    }

    impl Connectable for Gain {
        fn num_inputs(&self) -> usize {
            1
        }

        fn num_outputs(&self) -> usize {
            1
        }

        fn input_name(&self, socket: usize) -> Result<String, InvalidSocket> {
            check_input(socket, 1)?;
            Ok("Value".into())
        }

        fn output_name(&self, socket: usize) -> Result<String, InvalidSocket> {
            check_output(socket, 1)?;
            Ok("Scaled".into())
        }

        fn allowed_input_kinds(&self, socket: usize) -> Result<KindSet, InvalidSocket> {
            check_input(socket, 1)?;
            Ok(kinds(&[ValueKind::Scalar]))
        }

        fn output_kinds(&self, socket: usize) -> Result<KindSet, InvalidSocket> {
            check_output(socket, 1)?;
            Ok(kinds(&[ValueKind::Scalar]))
        }

        fn set_input(
            &mut self,
            socket: usize,
            value: Option<Value>,
            _origin: Option<&str>,
        ) -> Result<(), InvalidSocket> {
            check_input(socket, 1)?;
            self.input = match value {
                Some(Value::Scalar(x)) => Some(x),
                _ => None,
            };
            self.recompute();
            Ok(())
        }

        fn output(&self, socket: usize) -> Result<Option<Value>, InvalidSocket> {
            check_output(socket, 1)?;
            Ok(self.output.map(Value::Scalar))
        }

        fn recompute(&mut self) {
            self.output = self.input.map(|x| x * self.factor);
            self.valid = self.output.is_some();
        }

        fn is_valid(&self) -> bool {
            self.valid
        }

        fn label(&self) -> &str {
            "gain"
        }
    }

    fn scalar_output(graph: &DirectedGraph, id: NodeId) -> Option<f64> {
        match graph.node(id).unwrap().item().output(0).unwrap() {
            Some(Value::Scalar(x)) => Some(x),
            _ => None,
        }
    }

    #[test]
    fn add_node_appends_in_insertion_order() {
        let mut graph = DirectedGraph::new();
        let a = graph.add_node(Box::new(Gain::new(1.0)), None);
        let b = graph.add_node(Box::new(Gain::new(2.0)), None);

        assert_eq!(graph.len(), 2);
        assert_eq!(graph.node_index(a), Some(0));
        assert_eq!(graph.node_index(b), Some(1));
    }

    #[test]
    fn lookup_of_foreign_id_is_absent() {
        let mut graph = DirectedGraph::new();
        graph.add_node(Box::new(Gain::new(1.0)), None);

        let foreign = NodeId::new();
        assert_eq!(graph.node_index(foreign), None);
        assert!(graph.node(foreign).is_none());
    }

    #[test]
    fn add_link_with_absent_endpoint_is_a_no_op() {
        let mut graph = DirectedGraph::new();
        let a = graph.add_node(Box::new(Gain::new(1.0)), None);

        graph.add_link(a, 0, NodeId::new(), 0);

        assert!(graph.node(a).unwrap().outgoing().is_empty());
    }

    #[test]
    fn remove_node_is_idempotent() {
        let mut graph = DirectedGraph::new();
        let a = graph.add_node(Box::new(Gain::new(1.0)), None);

        graph.remove_node(a);
        graph.remove_node(a);

        assert!(graph.is_empty());
    }

    #[test]
    fn cascade_propagates_through_a_chain() {
        let mut graph = DirectedGraph::new();
        let a = graph.add_node(Box::new(Gain::new(2.0)), None);
        let b = graph.add_node(Box::new(Gain::new(3.0)), None);
        graph.add_link(a, 0, b, 0);

        graph
            .node_mut(a)
            .unwrap()
            .item_mut()
            .set_input(0, Some(Value::Scalar(5.0)), None)
            .unwrap();
        graph.cascade_from(a).unwrap();

        assert_eq!(scalar_output(&graph, a), Some(10.0));
        assert_eq!(scalar_output(&graph, b), Some(30.0));
    }

    #[test]
    fn cascade_from_unknown_id_is_a_no_op() {
        let mut graph = DirectedGraph::new();
        graph.add_node(Box::new(Gain::new(1.0)), None);

        assert!(graph.cascade_from(NodeId::new()).is_ok());
    }

    #[test]
    fn cascade_fails_fast_on_a_cycle() {
        let mut graph = DirectedGraph::new();
        let a = graph.add_node(Box::new(Gain::new(1.0)), None);
        let b = graph.add_node(Box::new(Gain::new(1.0)), None);
        graph.add_link(a, 0, b, 0);
        graph.add_link(b, 0, a, 0);

        let err = graph.cascade_from(a).unwrap_err();
        assert!(matches!(err, CascadeError::CycleDetected(_)));
    }

    #[test]
    fn placement_payload_is_carried_opaquely() {
        let mut graph = DirectedGraph::new();
        let a = graph.add_node(Box::new(Gain::new(1.0)), Some(vec![4.0, 2.0]));

        assert_eq!(graph.node(a).unwrap().placement(), Some(&[4.0, 2.0][..]));
    }
}
