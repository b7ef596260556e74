//! Exponential Smoother
//!
//! One-pass exponential filter with smoothing factor `a`:
//!
//! ```text
//! y[0] = (1-a)·x[0]
//! y[t] = (1-a)·x[t] + a·y[t-1]
//! ```
//!
//! Accepts a univariate series or panel data; each member of a panel is
//! filtered independently and the output mirrors the input shape.

use tracing::debug;

use super::InputBank;
use crate::connect::{check_input, check_output, Connectable, InvalidSocket};
use crate::series::{Longitudinal, TimeSeries};
use crate::value::{kinds, KindSet, Value, ValueKind};

/// Exponential smoothing transform node.
#[derive(Debug, Clone)]
pub struct ExpSmoother {
    smooth_factor: f64,
    inputs: InputBank,
    output: Option<Value>,
    valid: bool,
}

impl Default for ExpSmoother {
    fn default() -> Self {
        Self::with_factor(0.9)
    }
}

impl ExpSmoother {
    /// A smoother with the default factor 0.9.
    pub fn new() -> Self {
        Self::default()
    }

    /// A smoother with the given factor. Values near 1 smooth heavily.
    pub fn with_factor(smooth_factor: f64) -> Self {
        Self {
            smooth_factor,
            inputs: InputBank::new(1),
            output: None,
            valid: false,
        }
    }

    /// The current smoothing factor.
    pub fn smooth_factor(&self) -> f64 {
        self.smooth_factor
    }

    /// Change the smoothing factor and recompute against current inputs.
    pub fn set_smooth_factor(&mut self, smooth_factor: f64) {
        self.smooth_factor = smooth_factor;
        self.recompute();
    }

    fn apply_filter_to(&self, ts: &TimeSeries) -> TimeSeries {
        let a = self.smooth_factor;
        let mut filtered = TimeSeries::with_title(ts.title());
        let mut previous = 0.0;
        for (t, (stamp, x)) in ts.iter().enumerate() {
            let y = (1.0 - a) * x + if t >= 1 { a * previous } else { 0.0 };
            filtered.push(stamp, y);
            previous = y;
        }
        filtered
    }
}

impl Connectable for ExpSmoother {
    fn num_inputs(&self) -> usize {
        1
    }

    fn num_outputs(&self) -> usize {
        1
    }

    fn input_name(&self, socket: usize) -> Result<String, InvalidSocket> {
        check_input(socket, 1)?;
        Ok("Input TS".into())
    }

    fn output_name(&self, socket: usize) -> Result<String, InvalidSocket> {
        check_output(socket, 1)?;
        Ok("Filtered TS".into())
    }

    fn allowed_input_kinds(&self, socket: usize) -> Result<KindSet, InvalidSocket> {
        check_input(socket, 1)?;
        Ok(kinds(&[ValueKind::Series, ValueKind::Panel]))
    }

    fn output_kinds(&self, socket: usize) -> Result<KindSet, InvalidSocket> {
        check_output(socket, 1)?;
        Ok(kinds(&[ValueKind::Series, ValueKind::Panel]))
    }

    fn set_input(
        &mut self,
        socket: usize,
        value: Option<Value>,
        _origin: Option<&str>,
    ) -> Result<(), InvalidSocket> {
        check_input(socket, 1)?;
        self.inputs.store(socket, value);
        self.recompute();
        Ok(())
    }

    fn output(&self, socket: usize) -> Result<Option<Value>, InvalidSocket> {
        check_output(socket, 1)?;
        if !self.valid {
            return Ok(None);
        }
        Ok(self.output.clone())
    }

    fn recompute(&mut self) {
        self.valid = false;
        self.output = match self.inputs.get(0) {
            Some(Value::Series(ts)) => Some(Value::Series(self.apply_filter_to(ts))),
            Some(Value::Panel(panel)) => {
                let filtered: Vec<TimeSeries> =
                    panel.iter().map(|ts| self.apply_filter_to(ts)).collect();
                Some(Value::Panel(Longitudinal::from(filtered)))
            }
            other => {
                if other.is_some() {
                    debug!("smoother input is not a series, staying invalid");
                }
                None
            }
        };
        self.valid = self.output.is_some();
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn label(&self) -> &str {
        "ExpSmooth"
    }
}
