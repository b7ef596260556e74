//! Transform Nodes
//!
//! Connectable implementations that reshape series flowing through the
//! graph: a seeded source, an exponential smoother, and a coefficient-
//! weighted linear combination.
//!
//! Transforms follow one rhythm: `set_input` stores the received value and
//! recomputes immediately (receiving input is the recompute trigger), and
//! recompute leaves the node invalid whenever its inputs are incomplete or
//! of the wrong kind. That is never an error: a half-wired graph is a
//! normal intermediate state.

mod linear;
mod smoother;
mod source;

pub use linear::LinearCombination;
pub use smoother::ExpSmoother;
pub use source::SeriesSource;

use crate::series::TimeSeries;
use crate::value::Value;

/// Slot storage for a node's input sockets.
#[derive(Debug, Clone, Default)]
pub(crate) struct InputBank {
    slots: Vec<Option<Value>>,
}

impl InputBank {
    pub(crate) fn new(count: usize) -> Self {
        Self {
            slots: vec![None; count],
        }
    }

    /// Grow or shrink to `count` slots, keeping existing values.
    pub(crate) fn resize(&mut self, count: usize) {
        self.slots.resize(count, None);
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    /// Store a value (or clear the slot with `None`). The socket must be in
    /// range; contract implementations bound-check before storing.
    pub(crate) fn store(&mut self, socket: usize, value: Option<Value>) {
        self.slots[socket] = value;
    }

    pub(crate) fn get(&self, socket: usize) -> Option<&Value> {
        self.slots.get(socket).and_then(Option::as_ref)
    }

    /// All slots viewed as univariate series, or `None` when any slot is
    /// empty or holds a different kind.
    pub(crate) fn all_series(&self) -> Option<Vec<&TimeSeries>> {
        self.slots
            .iter()
            .map(|slot| slot.as_ref().and_then(Value::as_series))
            .collect()
    }
}
