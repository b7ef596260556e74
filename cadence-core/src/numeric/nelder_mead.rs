//! Nelder–Mead Simplex Minimization
//!
//! Derivative-free minimizer used to fit model parameters when no
//! closed-form estimator applies. Standard coefficient set: reflection 1.0,
//! expansion 2.0, contraction 0.5, shrink 0.5.
//!
//! Reflection backs its step factor off geometrically when the target
//! returns NaN at the reflected point (parameter constraints are commonly
//! expressed that way); an exhausted back-off scores the reflection as
//! `+inf` so the iteration contracts instead of stalling.

use ndarray::Array1;

use super::GeometryError;

/// How many times a NaN reflection may shorten its step before giving up.
const NAN_BACKOFF_LIMIT: usize = 60;

/// The result of a minimization run.
#[derive(Debug, Clone)]
pub struct Minimum {
    /// The best argument found.
    pub arg_min: Array1<f64>,
    /// The target value at [`Minimum::arg_min`].
    pub value: f64,
}

/// The Nelder–Mead simplex minimizer.
#[derive(Debug, Clone)]
pub struct NelderMead {
    alpha: f64,
    gamma: f64,
    rho: f64,
    sigma: f64,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
        }
    }
}

impl NelderMead {
    /// A minimizer with the standard coefficient set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Minimize `target` starting from the given simplex. `initial` must
    /// contain `dimension + 1` points, where `dimension` is the length of
    /// each point.
    pub fn minimize<F>(
        &self,
        mut target: F,
        initial: &[Array1<f64>],
        max_iterations: usize,
    ) -> Result<Minimum, GeometryError>
    where
        F: FnMut(&Array1<f64>) -> f64,
    {
        let dimension = initial.first().map_or(0, |point| point.len());
        if dimension == 0 || initial.len() != dimension + 1 {
            return Err(GeometryError::BadSimplex {
                dimension,
                points: initial.len(),
            });
        }

        let mut simplex: Vec<(Array1<f64>, f64)> = initial
            .iter()
            .map(|point| (point.clone(), target(point)))
            .collect();

        for _ in 0..max_iterations {
            simplex.sort_by(|a, b| a.1.total_cmp(&b.1));

            // Center of mass of every point except the worst one.
            let mut centroid = Array1::zeros(dimension);
            for (point, _) in &simplex[..dimension] {
                centroid += point;
            }
            centroid /= dimension as f64;

            let worst_point = simplex[dimension].0.clone();
            let worst_value = simplex[dimension].1;
            let direction = &centroid - &worst_point;

            // Reflect, shortening the step while the target reads NaN.
            let mut step = self.alpha;
            let mut reflect_point = &centroid + &(&direction * step);
            let mut reflect_value = target(&reflect_point);
            let mut backoff = 0;
            while reflect_value.is_nan() {
                backoff += 1;
                if backoff > NAN_BACKOFF_LIMIT {
                    reflect_value = f64::INFINITY;
                    break;
                }
                step *= 0.8;
                reflect_point = &centroid + &(&direction * step);
                reflect_value = target(&reflect_point);
            }

            if reflect_value < worst_value {
                if reflect_value > simplex[0].1 {
                    simplex[dimension] = (reflect_point, reflect_value);
                } else {
                    // Best so far: try expanding past the reflection.
                    let expand_point = &centroid + &(&direction * self.gamma);
                    let expand_value = target(&expand_point);
                    simplex[dimension] = if expand_value < reflect_value {
                        (expand_point, expand_value)
                    } else {
                        (reflect_point, reflect_value)
                    };
                }
            } else {
                let contract_point = &worst_point + &(&direction * self.rho);
                let contract_value = target(&contract_point);
                if contract_value < worst_value {
                    simplex[dimension] = (contract_point, contract_value);
                } else {
                    // Shrink everything toward the best point.
                    let best = simplex[0].0.clone();
                    for entry in simplex.iter_mut().skip(1) {
                        let shrunk = &best + &((&entry.0 - &best) * self.sigma);
                        entry.0 = shrunk;
                        entry.1 = target(&entry.0);
                    }
                }
            }
        }

        simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
        let (arg_min, value) = simplex.swap_remove(0);
        Ok(Minimum { arg_min, value })
    }
}

/// Build an axis-aligned starting simplex around `origin`: the origin plus
/// one point stepped by `step` along each coordinate.
pub fn simplex_around(origin: &Array1<f64>, step: f64) -> Vec<Array1<f64>> {
    let mut points = Vec::with_capacity(origin.len() + 1);
    points.push(origin.clone());
    for i in 0..origin.len() {
        let mut point = origin.clone();
        point[i] += step;
        points.push(point);
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn minimizes_a_shifted_quadratic() {
        let target = |p: &Array1<f64>| (p[0] - 3.0).powi(2) + (p[1] + 1.0).powi(2);
        let initial = simplex_around(&array![0.0, 0.0], 1.0);

        let result = NelderMead::new().minimize(target, &initial, 300).unwrap();

        assert_abs_diff_eq!(result.arg_min[0], 3.0, epsilon = 1e-4);
        assert_abs_diff_eq!(result.arg_min[1], -1.0, epsilon = 1e-4);
        assert!(result.value < 1e-7);
    }

    #[test]
    fn backs_off_nan_regions() {
        // NaN outside the unit box keeps the search inside it.
        let target = |p: &Array1<f64>| {
            if p[0].abs() > 1.0 {
                f64::NAN
            } else {
                (p[0] - 0.5).powi(2)
            }
        };
        let initial = vec![array![-0.9], array![0.9]];

        let result = NelderMead::new().minimize(target, &initial, 200).unwrap();

        assert_abs_diff_eq!(result.arg_min[0], 0.5, epsilon = 1e-3);
    }

    #[test]
    fn rejects_undersized_simplexes() {
        let initial = vec![array![0.0, 0.0], array![1.0, 0.0]];

        let err = NelderMead::new()
            .minimize(|p| p.sum(), &initial, 10)
            .unwrap_err();

        assert_eq!(
            err,
            GeometryError::BadSimplex {
                dimension: 2,
                points: 2
            }
        );
    }

    #[test]
    fn simplex_around_has_dimension_plus_one_points() {
        let points = simplex_around(&array![1.0, 2.0, 3.0], 0.5);

        assert_eq!(points.len(), 4);
        assert_eq!(points[0], array![1.0, 2.0, 3.0]);
        assert_eq!(points[2], array![1.0, 2.5, 3.0]);
    }
}
