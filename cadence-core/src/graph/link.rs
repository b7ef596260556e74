//! Directed Links
//!
//! A link is a directed, socket-labeled edge between two nodes, recorded by
//! positional index into the owning graph's arena. Links are immutable:
//! renumbering after a node removal replaces a link with a rewritten copy,
//! it never adjusts fields in place.

use std::fmt;

/// A directed edge from one node's output socket to another node's input
/// socket. `start` and `end` are positional indices into the graph arena and
/// are only stable between structural edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    /// Index of the source node.
    pub start: usize,
    /// Output socket on the source node.
    pub start_socket: usize,
    /// Index of the destination node.
    pub end: usize,
    /// Input socket on the destination node.
    pub end_socket: usize,
}

impl Link {
    /// The copy of this link that is correct after the node at
    /// `deleted` has been removed from the arena: every endpoint at or
    /// beyond the deleted position shifts down by one. A link that does
    /// not reference the deleted range is returned unchanged.
    pub(crate) fn renumbered_after_removal(self, deleted: usize) -> Self {
        Self {
            start: self.start - usize::from(self.start >= deleted),
            end: self.end - usize::from(self.end >= deleted),
            ..self
        }
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} -> {}:{}",
            self.start, self.start_socket, self.end, self.end_socket
        )
    }
}
