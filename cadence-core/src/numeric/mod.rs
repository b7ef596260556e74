//! Numeric Leaf Routines
//!
//! The statistical machinery hosted inside graph nodes: dense linear
//! algebra helpers, ordinary least squares, the Nelder–Mead simplex
//! minimizer, and the augmented Dickey–Fuller unit-root test. Everything
//! here is synchronous and allocation-light; design matrices in this domain
//! are tiny.
//!
//! Malformed size arguments (submatrix bounds, dimension mismatches,
//! degenerate simplexes) are fatal [`GeometryError`]s, surfaced immediately
//! and never retried.

pub mod adf;
pub mod matrix;
pub mod nelder_mead;
pub mod regression;

use thiserror::Error;

pub use adf::{adf_t_statistic, rejects_unit_root};
pub use nelder_mead::{simplex_around, Minimum, NelderMead};
pub use regression::Regression;

/// Malformed sizes or shapes handed to a numeric routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeometryError {
    /// A square matrix was required.
    #[error("matrix is not square ({rows}x{cols})")]
    NotSquare {
        /// Row count of the offending matrix.
        rows: usize,
        /// Column count of the offending matrix.
        cols: usize,
    },

    /// Elimination hit a zero pivot.
    #[error("singular matrix encountered during elimination")]
    Singular,

    /// Two collaborating dimensions disagree.
    #[error("length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        /// The required length.
        expected: usize,
        /// The length actually supplied.
        actual: usize,
    },

    /// Submatrix bounds fall outside the source matrix or are inverted.
    #[error("invalid submatrix bounds ({r0}..{r1}, {c0}..{c1}) for {rows}x{cols} matrix")]
    BadSubmatrix {
        /// Top row (inclusive).
        r0: usize,
        /// Left column (inclusive).
        c0: usize,
        /// Row after the bottom row.
        r1: usize,
        /// Column after the right column.
        c1: usize,
        /// Row count of the source matrix.
        rows: usize,
        /// Column count of the source matrix.
        cols: usize,
    },

    /// Not enough observations for the requested computation.
    #[error("not enough observations: need at least {needed}, have {have}")]
    TooFewObservations {
        /// The minimum observation count.
        needed: usize,
        /// The count actually supplied.
        have: usize,
    },

    /// A simplex needs `dimension + 1` starting points.
    #[error("bad simplex: {points} starting points over {dimension} dimensions")]
    BadSimplex {
        /// Dimensionality of the search space.
        dimension: usize,
        /// Number of starting points supplied.
        points: usize,
    },
}

/// Cumulative distribution function of the standard normal, via the
/// Abramowitz–Stegun rational approximation of erf (absolute error
/// below 1.5e-7, plenty for approximate p-values).
pub(crate) fn standard_normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))
}

fn erf(x: f64) -> f64 {
    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let poly = ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t;
    sign * (1.0 - poly * (-x * x).exp())
}
