//! Series Source
//!
//! A 0-in/1-out node holding a seeded series: the entry point for feeding
//! observed data into a graph. Reseeding does not propagate by itself; the
//! client cascades from the node after seeding it.

use crate::connect::{check_output, Connectable, InvalidSocket, SocketSide};
use crate::series::TimeSeries;
use crate::value::{kinds, KindSet, Value, ValueKind};

/// A seeded data source.
#[derive(Debug, Clone, Default)]
pub struct SeriesSource {
    series: Option<TimeSeries>,
}

impl SeriesSource {
    /// An empty (invalid) source.
    pub fn new() -> Self {
        Self::default()
    }

    /// A source seeded with `series`.
    pub fn with_series(series: TimeSeries) -> Self {
        Self {
            series: Some(series),
        }
    }

    /// Replace the held series.
    pub fn seed(&mut self, series: TimeSeries) {
        self.series = Some(series);
    }

    /// The held series, if seeded.
    pub fn series(&self) -> Option<&TimeSeries> {
        self.series.as_ref()
    }
}

/// Every input-side access on a source is out of range.
fn no_input(socket: usize) -> InvalidSocket {
    InvalidSocket {
        side: SocketSide::Input,
        socket,
        count: 0,
    }
}

impl Connectable for SeriesSource {
    fn num_inputs(&self) -> usize {
        0
    }

    fn num_outputs(&self) -> usize {
        1
    }

    fn input_name(&self, socket: usize) -> Result<String, InvalidSocket> {
        Err(no_input(socket))
    }

    fn output_name(&self, socket: usize) -> Result<String, InvalidSocket> {
        check_output(socket, 1)?;
        Ok("Time Series".into())
    }

    fn allowed_input_kinds(&self, socket: usize) -> Result<KindSet, InvalidSocket> {
        Err(no_input(socket))
    }

    fn output_kinds(&self, socket: usize) -> Result<KindSet, InvalidSocket> {
        check_output(socket, 1)?;
        Ok(kinds(&[ValueKind::Series]))
    }

    fn set_input(
        &mut self,
        socket: usize,
        _value: Option<Value>,
        _origin: Option<&str>,
    ) -> Result<(), InvalidSocket> {
        Err(no_input(socket))
    }

    fn output(&self, socket: usize) -> Result<Option<Value>, InvalidSocket> {
        check_output(socket, 1)?;
        Ok(self.series.clone().map(Value::Series))
    }

    fn recompute(&mut self) {}

    fn is_valid(&self) -> bool {
        self.series.is_some()
    }

    fn label(&self) -> &str {
        "Source"
    }
}
