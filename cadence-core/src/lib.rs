//! Cadence Core
//!
//! A composable-model framework for time-series analysis. Numeric
//! transforms and statistical models are nodes in a directed graph, wired
//! together through typed input/output sockets and re-evaluated through an
//! explicit cascade protocol.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `connect`: the capability contract every graph participant implements
//! - `graph`: node records, links, and the directed graph with its cascade
//! - `series` / `value`: the payloads flowing between sockets
//! - `transforms`: source, smoothing, and linear-combination nodes
//! - `models`: statistical model nodes (autoregression)
//! - `numeric`: the leaf routines backing the models (least squares,
//!   Nelder–Mead, unit-root testing, dense matrix helpers)
//!
//! # Example
//!
//! ```rust
//! use cadence_core::graph::DirectedGraph;
//! use cadence_core::series::TimeSeries;
//! use cadence_core::transforms::{ExpSmoother, SeriesSource};
//! use chrono::{Duration, TimeZone, Utc};
//!
//! let start = Utc.timestamp_opt(0, 0).unwrap();
//! let observed = TimeSeries::from_values(start, Duration::days(1), [4.0, 8.0, 2.0]);
//!
//! let mut graph = DirectedGraph::new();
//! let source = graph.add_node(Box::new(SeriesSource::with_series(observed)), None);
//! let smoother = graph.add_node(Box::new(ExpSmoother::with_factor(0.5)), None);
//! graph.add_link(source, 0, smoother, 0);
//!
//! // Push the source's series downstream; the smoother recomputes on
//! // receipt of its new input.
//! graph.cascade_from(source).unwrap();
//! assert!(graph.node(smoother).unwrap().item().is_valid());
//! ```
//!
//! # Execution model
//!
//! Everything is single-threaded and synchronous: structural edits and
//! cascades run to completion on the caller's thread with no locking. A
//! host embedding the engine in a threaded context serializes access
//! externally.

#![warn(missing_docs)]

pub mod connect;
pub mod graph;
pub mod models;
pub mod numeric;
pub mod series;
pub mod transforms;
pub mod value;

pub use connect::{Connectable, InvalidSocket, SocketSide};
pub use graph::{CascadeError, DirectedGraph, Link, NodeId, NodeRecord};
pub use series::{Longitudinal, TimeSeries};
pub use value::{KindSet, Value, ValueKind};
