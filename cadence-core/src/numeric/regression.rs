//! Ordinary Least Squares
//!
//! Linear regression by normal equations, with optional intercept
//! augmentation and optional row weights. Alongside the coefficient vector
//! it produces a residual scale, the coefficient covariance, and two-sided
//! normal-approximation p-values.

use ndarray::{Array1, Array2};

use super::{matrix, standard_normal_cdf, GeometryError};

/// A fitted least-squares regression.
#[derive(Debug, Clone)]
pub struct Regression {
    beta_hat: Array1<f64>,
    sigma: f64,
    covariance: Option<Array2<f64>>,
    p_values: Option<Array1<f64>>,
}

impl Regression {
    /// Fit `dependent ~ explanatory`. With `add_constant`, an intercept
    /// column of ones is prepended and reported as coefficient 0. With
    /// `beta_only`, inference statistics are skipped.
    pub fn fit(
        dependent: &Array1<f64>,
        explanatory: &Array2<f64>,
        add_constant: bool,
        beta_only: bool,
    ) -> Result<Self, GeometryError> {
        let x = if add_constant {
            augment_with_constant(explanatory, None)
        } else {
            explanatory.clone()
        };
        Self::compute(dependent.clone(), x, beta_only)
    }

    /// Weighted fit: each row of the system is scaled by the square root of
    /// its weight before the ordinary fit runs.
    pub fn fit_weighted(
        dependent: &Array1<f64>,
        explanatory: &Array2<f64>,
        weights: &Array1<f64>,
        add_constant: bool,
        beta_only: bool,
    ) -> Result<Self, GeometryError> {
        if weights.len() != dependent.len() {
            return Err(GeometryError::LengthMismatch {
                expected: dependent.len(),
                actual: weights.len(),
            });
        }

        let root_w = weights.mapv(f64::sqrt);
        let y = dependent * &root_w;
        let x = if add_constant {
            augment_with_constant(explanatory, Some(&root_w))
        } else {
            let mut scaled = explanatory.clone();
            for (mut row, w) in scaled.rows_mut().into_iter().zip(root_w.iter()) {
                row.mapv_inplace(|v| v * w);
            }
            scaled
        };
        Self::compute(y, x, beta_only)
    }

    /// The fitted coefficient vector.
    pub fn beta_hat(&self) -> &Array1<f64> {
        &self.beta_hat
    }

    /// Residual scale estimate, zero when inference was skipped.
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Coefficient covariance, absent for beta-only or degenerate fits.
    pub fn covariance(&self) -> Option<&Array2<f64>> {
        self.covariance.as_ref()
    }

    /// Two-sided normal-approximation p-values, absent for beta-only or
    /// degenerate fits.
    pub fn p_values(&self) -> Option<&Array1<f64>> {
        self.p_values.as_ref()
    }

    fn compute(y: Array1<f64>, x: Array2<f64>, beta_only: bool) -> Result<Self, GeometryError> {
        let (n, p) = x.dim();
        if y.len() != n {
            return Err(GeometryError::LengthMismatch {
                expected: n,
                actual: y.len(),
            });
        }
        if n <= p {
            return Err(GeometryError::TooFewObservations {
                needed: p + 1,
                have: n,
            });
        }

        let xt = x.t();
        let xty = xt.dot(&y);
        let xtx = xt.dot(&x);

        // A zero X'y has the zero vector as its least-squares solution;
        // there is nothing to infer from it.
        if xty.iter().map(|v| v * v).sum::<f64>() == 0.0 {
            return Ok(Self {
                beta_hat: Array1::zeros(p),
                sigma: 0.0,
                covariance: None,
                p_values: None,
            });
        }

        let beta_hat = matrix::solve(&xtx, &xty)?;
        if beta_only {
            return Ok(Self {
                beta_hat,
                sigma: 0.0,
                covariance: None,
                p_values: None,
            });
        }

        let fitted = x.dot(&beta_hat);
        let resids = &y - &fitted;
        let sigma = sample_variance(&resids).sqrt() * n as f64 / (n - p) as f64;

        let covariance = matrix::invert(&xtx)? * (sigma * sigma);
        let mut p_values = Array1::zeros(p);
        for i in 0..p {
            let se = covariance[[i, i]].max(0.0).sqrt();
            p_values[i] = if se == 0.0 {
                0.0
            } else {
                2.0 * (1.0 - standard_normal_cdf(beta_hat[i].abs() / se))
            };
        }

        Ok(Self {
            beta_hat,
            sigma,
            covariance: Some(covariance),
            p_values: Some(p_values),
        })
    }
}

fn augment_with_constant(explanatory: &Array2<f64>, root_w: Option<&Array1<f64>>) -> Array2<f64> {
    let (n, p) = explanatory.dim();
    let mut out = Array2::zeros((n, p + 1));
    for i in 0..n {
        let w = root_w.map_or(1.0, |rw| rw[i]);
        out[[i, 0]] = w;
        for j in 0..p {
            out[[i, j + 1]] = explanatory[[i, j]] * w;
        }
    }
    out
}

fn sample_variance(v: &Array1<f64>) -> f64 {
    let n = v.len();
    if n < 2 {
        return 0.0;
    }
    let mean = v.sum() / n as f64;
    v.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / (n - 1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array2};

    fn noisy_line() -> (Array1<f64>, Array2<f64>) {
        // y = 2 + 3x with a small alternating disturbance.
        let xs: Vec<f64> = (0..20).map(|i| i as f64 * 0.5).collect();
        let ys: Vec<f64> = xs
            .iter()
            .enumerate()
            .map(|(i, x)| 2.0 + 3.0 * x + if i % 2 == 0 { 0.05 } else { -0.05 })
            .collect();
        let x = Array2::from_shape_vec((20, 1), xs).unwrap();
        (Array1::from(ys), x)
    }

    #[test]
    fn fit_recovers_intercept_and_slope() {
        let (y, x) = noisy_line();

        let reg = Regression::fit(&y, &x, true, false).unwrap();

        assert_abs_diff_eq!(reg.beta_hat()[0], 2.0, epsilon = 0.05);
        assert_abs_diff_eq!(reg.beta_hat()[1], 3.0, epsilon = 0.02);
        assert!(reg.sigma() > 0.0);
    }

    #[test]
    fn strong_effects_get_tiny_p_values() {
        let (y, x) = noisy_line();

        let reg = Regression::fit(&y, &x, true, false).unwrap();
        let p = reg.p_values().unwrap();

        assert!(p[1] < 1e-6, "slope p-value should be decisive, got {}", p[1]);
    }

    #[test]
    fn beta_only_skips_inference() {
        let (y, x) = noisy_line();

        let reg = Regression::fit(&y, &x, true, true).unwrap();

        assert!(reg.covariance().is_none());
        assert!(reg.p_values().is_none());
        assert_eq!(reg.sigma(), 0.0);
    }

    #[test]
    fn zero_cross_moment_short_circuits_to_zero_beta() {
        let y = Array1::zeros(4);
        let x = Array2::from_shape_vec((4, 1), vec![1.0, -1.0, 1.0, -1.0]).unwrap();

        let reg = Regression::fit(&y, &x, false, false).unwrap();

        assert_eq!(reg.beta_hat(), &array![0.0]);
        assert!(reg.covariance().is_none());
    }

    #[test]
    fn weighted_fit_follows_the_heavy_rows() {
        // Two populations; weights all but silence the second one.
        let y = array![1.0, 1.0, 1.0, 10.0, 10.0];
        let x = Array2::ones((5, 1));
        let w = array![1.0, 1.0, 1.0, 1e-9, 1e-9];

        let reg = Regression::fit_weighted(&y, &x, &w, false, true).unwrap();

        assert_abs_diff_eq!(reg.beta_hat()[0], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn fit_rejects_underdetermined_systems() {
        let y = array![1.0, 2.0];
        let x = Array2::ones((2, 3));

        assert!(matches!(
            Regression::fit(&y, &x, false, true),
            Err(GeometryError::TooFewObservations { .. })
        ));
    }

    #[test]
    fn weighted_fit_checks_weight_length() {
        let y = array![1.0, 2.0, 3.0];
        let x = Array2::ones((3, 1));
        let w = array![1.0, 1.0];

        assert!(matches!(
            Regression::fit_weighted(&y, &x, &w, false, true),
            Err(GeometryError::LengthMismatch { .. })
        ));
    }
}
