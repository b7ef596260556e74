//! The Dataflow Graph
//!
//! This module implements the connectivity model at the heart of the crate:
//! nodes wrapping [`Connectable`](crate::connect::Connectable) items, joined
//! by directed, socket-labeled links, and re-evaluated by a cascading
//! recomputation protocol.
//!
//! # Overview
//!
//! - A [`NodeRecord`] pairs one computation item with its incoming and
//!   outgoing link lists.
//! - The [`DirectedGraph`] owns records in a flat arena with dense,
//!   contiguous positions; every structural edit preserves that invariant
//!   by renumbering surviving links.
//! - [`DirectedGraph::cascade_from`] pushes a changed node's outputs into
//!   its dependents' inputs and recurses, so each dependent recomputes with
//!   up-to-date inputs before its own dependents are visited.
//!
//! # Design Decisions
//!
//! 1. Clients address nodes by opaque [`NodeId`] tokens handed out at
//!    insertion, never by position: positions shift on removal.
//! 2. Cross-record rewiring lives on the graph (which owns the arena), not
//!    on the records, so no back-reference from record to graph exists.
//! 3. Traversal keeps an on-path guard: a directed cycle fails the cascade
//!    with [`CascadeError::CycleDetected`] instead of recursing without
//!    bound.

mod directed;
mod link;
mod node;

pub use directed::{CascadeError, DirectedGraph};
pub use link::Link;
pub use node::{NodeId, NodeRecord};
