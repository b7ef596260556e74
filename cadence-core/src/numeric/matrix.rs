//! Dense Matrix Helpers
//!
//! Small direct-method routines over `ndarray` storage: linear solve,
//! inversion, and bounds-checked submatrix extraction. Partial pivoting is
//! enough at the sizes seen here (design matrices with a handful of
//! columns).

use ndarray::{s, Array1, Array2};

use super::GeometryError;

/// Pivots smaller than this (relative to the column scale) read as zero.
const PIVOT_EPS: f64 = 1e-12;

/// Solve `a · x = b` by Gaussian elimination with partial pivoting.
pub fn solve(a: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>, GeometryError> {
    let n = square_dim(a)?;
    if b.len() != n {
        return Err(GeometryError::LengthMismatch {
            expected: n,
            actual: b.len(),
        });
    }

    let mut m = a.clone();
    let mut rhs = b.clone();

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&i, &j| m[[i, col]].abs().total_cmp(&m[[j, col]].abs()))
            .unwrap_or(col);
        if m[[pivot_row, col]].abs() < PIVOT_EPS {
            return Err(GeometryError::Singular);
        }
        if pivot_row != col {
            for k in 0..n {
                m.swap([pivot_row, k], [col, k]);
            }
            rhs.swap(pivot_row, col);
        }

        for row in col + 1..n {
            let factor = m[[row, col]] / m[[col, col]];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                m[[row, k]] -= factor * m[[col, k]];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    let mut x = Array1::zeros(n);
    for row in (0..n).rev() {
        let mut acc = rhs[row];
        for k in row + 1..n {
            acc -= m[[row, k]] * x[k];
        }
        x[row] = acc / m[[row, row]];
    }
    Ok(x)
}

/// Invert a square matrix by Gauss–Jordan elimination.
pub fn invert(a: &Array2<f64>) -> Result<Array2<f64>, GeometryError> {
    let n = square_dim(a)?;

    let mut m = a.clone();
    let mut inv = Array2::eye(n);

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&i, &j| m[[i, col]].abs().total_cmp(&m[[j, col]].abs()))
            .unwrap_or(col);
        if m[[pivot_row, col]].abs() < PIVOT_EPS {
            return Err(GeometryError::Singular);
        }
        if pivot_row != col {
            for k in 0..n {
                m.swap([pivot_row, k], [col, k]);
                inv.swap([pivot_row, k], [col, k]);
            }
        }

        let pivot = m[[col, col]];
        for k in 0..n {
            m[[col, k]] /= pivot;
            inv[[col, k]] /= pivot;
        }

        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = m[[row, col]];
            if factor == 0.0 {
                continue;
            }
            for k in 0..n {
                m[[row, k]] -= factor * m[[col, k]];
                inv[[row, k]] -= factor * inv[[col, k]];
            }
        }
    }

    Ok(inv)
}

/// Copy out the submatrix covering rows `r0..r1` and columns `c0..c1`
/// (half-open on both axes). Inverted or out-of-range bounds are fatal.
pub fn submatrix(
    m: &Array2<f64>,
    r0: usize,
    c0: usize,
    r1: usize,
    c1: usize,
) -> Result<Array2<f64>, GeometryError> {
    let (rows, cols) = m.dim();
    if r0 >= r1 || r1 > rows || c0 >= c1 || c1 > cols {
        return Err(GeometryError::BadSubmatrix {
            r0,
            c0,
            r1,
            c1,
            rows,
            cols,
        });
    }
    Ok(m.slice(s![r0..r1, c0..c1]).to_owned())
}

fn square_dim(a: &Array2<f64>) -> Result<usize, GeometryError> {
    let (rows, cols) = a.dim();
    if rows != cols {
        return Err(GeometryError::NotSquare { rows, cols });
    }
    Ok(rows)
}
