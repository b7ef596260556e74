//! Graph Node Records
//!
//! A node record pairs one [`Connectable`] item with its connectivity
//! bookkeeping: the ordered lists of incoming and outgoing links, an opaque
//! placement payload, and the identity token the graph hands back to
//! clients.
//!
//! # Identity
//!
//! Records are addressed by [`NodeId`], an opaque token assigned at
//! insertion. Positional indices exist too (links are recorded by
//! position), but they shift on every removal and are never part of the
//! public lookup surface.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use smallvec::SmallVec;

use crate::connect::Connectable;
use crate::graph::link::Link;

/// Unique identifier for a node record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u64);

impl NodeId {
    /// Generate a new unique node ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Link lists stay inline for the handful of edges a node typically has.
pub(crate) type LinkList = SmallVec<[Link; 4]>;

/// One graph participant: the wrapped item plus its link lists.
pub struct NodeRecord {
    id: NodeId,
    item: Box<dyn Connectable>,
    placement: Option<Vec<f64>>,
    outgoing: LinkList,
    incoming: LinkList,
}

impl NodeRecord {
    pub(crate) fn new(item: Box<dyn Connectable>, placement: Option<Vec<f64>>) -> Self {
        Self {
            id: NodeId::new(),
            item,
            placement,
            outgoing: LinkList::new(),
            incoming: LinkList::new(),
        }
    }

    /// The record's identity token.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The wrapped computation item.
    pub fn item(&self) -> &dyn Connectable {
        self.item.as_ref()
    }

    /// Mutable access to the wrapped computation item.
    pub fn item_mut(&mut self) -> &mut dyn Connectable {
        self.item.as_mut()
    }

    /// The opaque placement payload, if any. Ignored by all connectivity
    /// logic.
    pub fn placement(&self) -> Option<&[f64]> {
        self.placement.as_deref()
    }

    /// Links leaving this node, in declaration order.
    pub fn outgoing(&self) -> &[Link] {
        &self.outgoing
    }

    /// Links arriving at this node, in declaration order.
    pub fn incoming(&self) -> &[Link] {
        &self.incoming
    }

    pub(crate) fn push_outgoing(&mut self, link: Link) {
        self.outgoing.push(link);
    }

    pub(crate) fn push_incoming(&mut self, link: Link) {
        self.incoming.push(link);
    }

    pub(crate) fn clear_outgoing(&mut self) {
        self.outgoing.clear();
    }

    pub(crate) fn clear_incoming(&mut self) {
        self.incoming.clear();
    }

    /// Rewrite both link lists after the node at `deleted` has been removed
    /// from the arena. Links that do not reference the deleted range pass
    /// through unchanged, so this is safe to run on every surviving record.
    pub(crate) fn adjust_for_node_removal(&mut self, deleted: usize) {
        for link in self.outgoing.iter_mut().chain(self.incoming.iter_mut()) {
            *link = link.renumbered_after_removal(deleted);
        }
    }

    /// Drop every outgoing link into `(target, target_socket)`, duplicates
    /// included. A record with no matching link is left unchanged.
    pub(crate) fn remove_outgoing_links_to(&mut self, target: usize, target_socket: usize) {
        self.outgoing
            .retain(|link| link.end != target || link.end_socket != target_socket);
    }

    /// Drop every incoming link from `source` into `end_socket`, duplicates
    /// included. A record with no matching link is left unchanged.
    pub(crate) fn remove_incoming_link_from(&mut self, source: usize, end_socket: usize) {
        self.incoming
            .retain(|link| link.start != source || link.end_socket != end_socket);
    }

    /// Drop every incoming link into `end_socket`, regardless of source.
    pub(crate) fn remove_incoming_links_into(&mut self, end_socket: usize) {
        self.incoming.retain(|link| link.end_socket != end_socket);
    }
}

impl fmt::Debug for NodeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRecord")
            .field("id", &self.id)
            .field("item", &self.item.label())
            .field("outgoing", &self.outgoing)
            .field("incoming", &self.incoming)
            .finish()
    }
}
