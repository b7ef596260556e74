//! Socket Values
//!
//! Values are what flows across a link during a cascade: a node's output is
//! read from its output socket and pushed into a dependent's input socket.
//! The engine is agnostic to the payload; nodes declare which kinds each
//! socket accepts or produces and check the kinds they receive.

use ndarray::Array1;
use smallvec::SmallVec;

use crate::series::{Longitudinal, TimeSeries};

/// A value carried between sockets.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A single number.
    Scalar(f64),
    /// A plain numeric vector.
    Vector(Array1<f64>),
    /// A univariate time series.
    Series(TimeSeries),
    /// Longitudinal (panel) data.
    Panel(Longitudinal),
}

impl Value {
    /// The kind tag of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Scalar(_) => ValueKind::Scalar,
            Value::Vector(_) => ValueKind::Vector,
            Value::Series(_) => ValueKind::Series,
            Value::Panel(_) => ValueKind::Panel,
        }
    }

    /// Borrow the payload as a time series, if it is one.
    pub fn as_series(&self) -> Option<&TimeSeries> {
        match self {
            Value::Series(ts) => Some(ts),
            _ => None,
        }
    }

    /// Borrow the payload as panel data, if it is.
    pub fn as_panel(&self) -> Option<&Longitudinal> {
        match self {
            Value::Panel(p) => Some(p),
            _ => None,
        }
    }
}

/// The kind of payload a socket accepts or produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// A single number.
    Scalar,
    /// A plain numeric vector.
    Vector,
    /// A univariate time series.
    Series,
    /// Longitudinal (panel) data.
    Panel,
}

/// The set of kinds declared for one socket. Sockets rarely accept more than
/// two kinds, so the set lives inline.
pub type KindSet = SmallVec<[ValueKind; 2]>;

/// Build a [`KindSet`] from a fixed list of kinds.
pub fn kinds(list: &[ValueKind]) -> KindSet {
    list.iter().copied().collect()
}
