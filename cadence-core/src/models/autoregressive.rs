//! Autoregressive Model
//!
//! AR(p) with intercept, fitted by conditional least squares or by
//! conditional-SSE minimization over the simplex. The node consumes a
//! series (or panel) on socket 0 and serves fitted values and residuals;
//! both mirror the input shape.
//!
//! Fitting logs a warning when an augmented Dickey–Fuller probe cannot
//! reject a unit root in the data: an AR model over integrated data is
//! usually a modeling mistake, but it is the host's call, not an error.

use ndarray::{Array1, Array2};
use tracing::{debug, warn};

use crate::connect::{check_input, check_output, Connectable, InvalidSocket};
use crate::numeric::{
    rejects_unit_root, simplex_around, GeometryError, NelderMead, Regression,
};
use crate::series::{Longitudinal, TimeSeries};
use crate::transforms::InputBank;
use crate::value::{kinds, KindSet, Value, ValueKind};

/// How the coefficients are estimated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitMethod {
    /// Conditional least squares via the regression collaborator.
    LeastSquares,
    /// Conditional-SSE minimization with Nelder–Mead.
    Simplex,
}

/// An autoregressive model node.
#[derive(Debug)]
pub struct AutoregressiveModel {
    order: usize,
    fit_method: FitMethod,
    label: String,
    inputs: InputBank,
    coefficients: Option<Array1<f64>>,
    fitted: Option<Value>,
    residuals: Option<Value>,
    valid: bool,
}

impl AutoregressiveModel {
    /// An AR(p) model fitted by conditional least squares. Order 0 is
    /// promoted to 1; an autoregression needs at least one lag.
    pub fn new(order: usize) -> Self {
        Self::with_method(order, FitMethod::LeastSquares)
    }

    /// An AR(p) model with an explicit fitting method.
    pub fn with_method(order: usize, fit_method: FitMethod) -> Self {
        let order = order.max(1);
        Self {
            order,
            fit_method,
            label: format!("AR({order})"),
            inputs: InputBank::new(1),
            coefficients: None,
            fitted: None,
            residuals: None,
            valid: false,
        }
    }

    /// The autoregressive order.
    pub fn order(&self) -> usize {
        self.order
    }

    /// The fitted coefficients, intercept first, once the model is valid.
    pub fn coefficients(&self) -> Option<&Array1<f64>> {
        self.coefficients.as_ref()
    }

    /// Sample autocovariance function of the connected data up to
    /// `max_lag`, or autocorrelation when `normalize` is set. Panel data
    /// averages the per-member functions.
    pub fn compute_acf(&self, max_lag: usize, normalize: bool) -> Result<Array1<f64>, GeometryError> {
        let members = self.members();
        if members.is_empty() {
            return Err(GeometryError::TooFewObservations { needed: 1, have: 0 });
        }

        let mut acc = Array1::zeros(max_lag + 1);
        for ts in &members {
            acc = acc + member_acf(ts, max_lag, normalize)?;
        }
        Ok(acc / members.len() as f64)
    }

    fn members(&self) -> Vec<&TimeSeries> {
        match self.inputs.get(0) {
            Some(Value::Series(ts)) => vec![ts],
            Some(Value::Panel(panel)) => panel.iter().collect(),
            _ => Vec::new(),
        }
    }

    fn estimate(&self, members: &[&TimeSeries]) -> Option<Array1<f64>> {
        let p = self.order;
        let mut rows = Vec::new();
        let mut targets = Vec::new();
        for ts in members {
            for t in p..ts.len() {
                for j in 1..=p {
                    rows.push(ts.value(t - j).unwrap_or(0.0));
                }
                targets.push(ts.value(t).unwrap_or(0.0));
            }
        }

        let n = targets.len();
        if n <= p + 1 {
            debug!(observations = n, order = p, "too little data to fit");
            return None;
        }

        let x = Array2::from_shape_vec((n, p), rows).ok()?;
        let y = Array1::from(targets);

        match self.fit_method {
            FitMethod::LeastSquares => match Regression::fit(&y, &x, true, true) {
                Ok(reg) => Some(reg.beta_hat().clone()),
                Err(err) => {
                    warn!(%err, "least-squares fit failed");
                    None
                }
            },
            FitMethod::Simplex => {
                let css = |beta: &Array1<f64>| {
                    let mut sse = 0.0;
                    for (i, target) in y.iter().enumerate() {
                        let mut prediction = beta[0];
                        for j in 0..p {
                            prediction += beta[j + 1] * x[[i, j]];
                        }
                        sse += (target - prediction) * (target - prediction);
                    }
                    sse
                };
                let initial = simplex_around(&Array1::zeros(p + 1), 0.5);
                match NelderMead::new().minimize(css, &initial, 250 * (p + 1)) {
                    Ok(minimum) => Some(minimum.arg_min),
                    Err(err) => {
                        warn!(%err, "simplex fit failed");
                        None
                    }
                }
            }
        }
    }

    fn diagnostics(&self, beta: &Array1<f64>, ts: &TimeSeries) -> (TimeSeries, TimeSeries) {
        let p = self.order;
        let mut fitted = TimeSeries::with_title(format!("{} fitted", ts.title()));
        let mut residuals = TimeSeries::with_title(format!("{} residuals", ts.title()));
        for t in p..ts.len() {
            let mut prediction = beta[0];
            for j in 1..=p {
                prediction += beta[j] * ts.value(t - j).unwrap_or(0.0);
            }
            let stamp = ts.timestamp(t).expect("t < len");
            fitted.push(stamp, prediction);
            residuals.push(stamp, ts.value(t).unwrap_or(0.0) - prediction);
        }
        (fitted, residuals)
    }
}

impl Connectable for AutoregressiveModel {
    fn num_inputs(&self) -> usize {
        1
    }

    fn num_outputs(&self) -> usize {
        2
    }

    fn input_name(&self, socket: usize) -> Result<String, InvalidSocket> {
        check_input(socket, 1)?;
        Ok("Data".into())
    }

    fn output_name(&self, socket: usize) -> Result<String, InvalidSocket> {
        check_output(socket, 2)?;
        Ok(match socket {
            0 => "Fitted TS".into(),
            _ => "Residual TS".into(),
        })
    }

    fn allowed_input_kinds(&self, socket: usize) -> Result<KindSet, InvalidSocket> {
        check_input(socket, 1)?;
        Ok(kinds(&[ValueKind::Series, ValueKind::Panel]))
    }

    fn output_kinds(&self, socket: usize) -> Result<KindSet, InvalidSocket> {
        check_output(socket, 2)?;
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
        check_output(socket, 2)?;
        if !self.valid {
            return Ok(None);
        }
        Ok(match socket {
            0 => self.fitted.clone(),
            _ => self.residuals.clone(),
        })
    }

    fn recompute(&mut self) {
        self.valid = false;
        self.coefficients = None;
        self.fitted = None;
        self.residuals = None;

        let members = self.members();
        if members.is_empty() {
            return;
        }

        if let Some(first) = members.first() {
            match rejects_unit_root(first.values(), 0.05) {
                Ok(false) => warn!(
                    model = self.label.as_str(),
                    "unit root not rejected; the data may be integrated"
                ),
                Ok(true) => {}
                Err(_) => {} // series too short for the probe; nothing to say
            }
        }

        let Some(beta) = self.estimate(&members) else {
            return;
        };

        let pairs: Vec<(TimeSeries, TimeSeries)> = members
            .iter()
            .map(|ts| self.diagnostics(&beta, ts))
            .collect();
        let panel_input = matches!(self.inputs.get(0), Some(Value::Panel(_)));
        let (fitted, residuals): (Vec<TimeSeries>, Vec<TimeSeries>) = pairs.into_iter().unzip();
        if panel_input {
            self.fitted = Some(Value::Panel(Longitudinal::from(fitted)));
            self.residuals = Some(Value::Panel(Longitudinal::from(residuals)));
        } else {
            self.fitted = fitted.into_iter().next().map(Value::Series);
            self.residuals = residuals.into_iter().next().map(Value::Series);
        }

        self.coefficients = Some(beta);
        self.valid = self.fitted.is_some() && self.residuals.is_some();
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn label(&self) -> &str {
        &self.label
    }
}

fn member_acf(ts: &TimeSeries, max_lag: usize, normalize: bool) -> Result<Array1<f64>, GeometryError> {
    let n = ts.len();
    if n <= max_lag {
        return Err(GeometryError::TooFewObservations {
            needed: max_lag + 1,
            have: n,
        });
    }

    let values = ts.values();
    let mean = values.iter().sum::<f64>() / n as f64;
    let mut acf = Array1::zeros(max_lag + 1);
    for lag in 0..=max_lag {
        let mut sum = 0.0;
        for t in lag..n {
            sum += (values[t] - mean) * (values[t - lag] - mean);
        }
        acf[lag] = sum / n as f64;
    }

    if normalize && acf[0] != 0.0 {
        let gamma0 = acf[0];
        acf /= gamma0;
    }
    Ok(acf)
}
