//! Augmented Dickey–Fuller Test
//!
//! Unit-root probe used to warn when a stationary model is being fitted to
//! data that looks integrated. The test regresses the first difference on
//! the lagged level and one lagged difference,
//!
//! ```text
//! Δx[t] = α + β·x[t-1] + γ·Δx[t-1] + ε[t]
//! ```
//!
//! and compares the t-statistic of `β` against tabulated critical values.
//! A decisively negative statistic rejects the unit-root hypothesis, i.e.
//! the series reads as stationary.

use ndarray::{Array1, Array2};

use super::{GeometryError, Regression};

/// Minimum series length for the regression to say anything.
const MIN_OBSERVATIONS: usize = 10;

/// Tabulated sample sizes and significance levels (percent).
const SAMPLE_SIZES: [usize; 3] = [50, 100, 200];
const LEVELS: [f64; 3] = [0.01, 0.05, 0.10];

/// Critical values indexed `[sample size][level]`, left tail, sign dropped.
const CRITICAL: [[f64; 3]; 3] = [
    [4.32, 3.67, 3.28], // n ~ 50
    [4.07, 3.37, 3.03], // n ~ 100
    [4.00, 3.37, 3.02], // n ~ 200
];

/// The Dickey–Fuller t-statistic of the lagged-level coefficient.
///
/// A degenerate regression (for instance over a constant series) scores
/// zero: no evidence against the unit root either way.
pub fn adf_t_statistic(x: &[f64]) -> Result<f64, GeometryError> {
    let n = x.len();
    if n < MIN_OBSERVATIONS {
        return Err(GeometryError::TooFewObservations {
            needed: MIN_OBSERVATIONS,
            have: n,
        });
    }

    let rows = n - 2;
    let mut y = Array1::zeros(rows);
    let mut design = Array2::zeros((rows, 2));
    for i in 0..rows {
        y[i] = x[i + 2] - x[i + 1];
        design[[i, 0]] = x[i + 1];
        design[[i, 1]] = x[i + 1] - x[i];
    }

    let reg = Regression::fit(&y, &design, true, false)?;
    let Some(covariance) = reg.covariance() else {
        return Ok(0.0);
    };
    let se = covariance[[1, 1]].max(0.0).sqrt();
    if se == 0.0 {
        return Ok(0.0);
    }
    Ok(reg.beta_hat()[1] / se)
}

/// Whether the unit-root hypothesis is rejected at the given significance
/// level. Sample size and level snap to the nearest tabulated entries.
pub fn rejects_unit_root(x: &[f64], significance: f64) -> Result<bool, GeometryError> {
    let t = adf_t_statistic(x)?;
    Ok(t <= -critical_value(x.len(), significance))
}

fn critical_value(n: usize, significance: f64) -> f64 {
    let row = nearest_index(SAMPLE_SIZES.iter().map(|&s| (n as f64 - s as f64).abs()));
    let col = nearest_index(LEVELS.iter().map(|&l| (significance - l).abs()));
    CRITICAL[row][col]
}

fn nearest_index(distances: impl Iterator<Item = f64>) -> usize {
    distances
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map_or(0, |(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic noise in roughly [-0.5, 0.5].
    fn noise(n: usize) -> Vec<f64> {
        let mut state: u64 = 0x9e37_79b9_7f4a_7c15;
        (0..n)
            .map(|_| {
                state = state
                    .wrapping_mul(6_364_136_223_846_793_005)
                    .wrapping_add(1_442_695_040_888_963_407);
                (state >> 11) as f64 / (1u64 << 53) as f64 - 0.5
            })
            .collect()
    }

    fn mean_reverting(n: usize) -> Vec<f64> {
        let e = noise(n);
        let mut x = vec![0.0; n];
        for t in 1..n {
            x[t] = 0.1 * x[t - 1] + e[t];
        }
        x
    }

    fn random_walk(n: usize) -> Vec<f64> {
        let e = noise(n);
        let mut x = vec![0.0; n];
        for t in 1..n {
            x[t] = x[t - 1] + e[t];
        }
        x
    }

    #[test]
    fn mean_reverting_series_rejects_unit_root() {
        let x = mean_reverting(200);
        assert!(rejects_unit_root(&x, 0.05).unwrap());
    }

    #[test]
    fn random_walk_keeps_its_unit_root() {
        let x = random_walk(200);
        assert!(!rejects_unit_root(&x, 0.05).unwrap());
    }

    #[test]
    fn statistic_is_strongly_negative_for_stationary_data() {
        let x = mean_reverting(200);
        let t = adf_t_statistic(&x).unwrap();
        assert!(t < -5.0, "expected decisive rejection, got t = {t}");
    }

    #[test]
    fn constant_series_scores_zero() {
        let x = vec![3.0; 50];
        assert_eq!(adf_t_statistic(&x).unwrap(), 0.0);
    }

    #[test]
    fn short_series_are_rejected() {
        let x = vec![1.0; 5];
        assert!(matches!(
            adf_t_statistic(&x),
            Err(GeometryError::TooFewObservations { .. })
        ));
    }

    #[test]
    fn critical_values_snap_to_nearest_entry() {
        assert_eq!(critical_value(60, 0.05), 3.67);
        assert_eq!(critical_value(160, 0.01), 4.00);
        assert_eq!(critical_value(100, 0.07), 3.37);
    }
}
