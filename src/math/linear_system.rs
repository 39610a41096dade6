use ndarray::{Array1, Array2};

use crate::error::{Error, Result};

/// Pivots smaller than this are treated as zero.
const SINGULAR_EPSILON: f64 = 1e-12;

/// Solves `a · x = b` by Gaussian elimination with partial pivoting.
///
/// Fails with [`Error::NumericFailure`] when the matrix is not square, the shapes do not
/// agree, or the matrix is singular.
pub fn solve(mut a: Array2<f64>, mut b: Array1<f64>) -> Result<Array1<f64>> {
    let n = b.len();
    if a.nrows() != n || a.ncols() != n {
        return Err(Error::NumericFailure(format!(
            "cannot solve a {}x{} system against {} right-hand sides",
            a.nrows(),
            a.ncols(),
            n
        )));
    }

    for i in 0..n {
        // Find pivot
        let mut max_idx = i;
        let mut max_val = a[[i, i]].abs();
        for j in i + 1..n {
            let val = a[[j, i]].abs();
            if val > max_val {
                max_idx = j;
                max_val = val;
            }
        }

        if max_val < SINGULAR_EPSILON {
            return Err(Error::NumericFailure(format!(
                "singular system (column {i} has no usable pivot)"
            )));
        }

        if max_idx != i {
            for k in 0..n {
                a.swap([i, k], [max_idx, k]);
            }
            b.swap(i, max_idx);
        }

        let pivot = a[[i, i]];
        for j in i + 1..n {
            let factor = a[[j, i]] / pivot;
            if factor == 0.0 {
                continue;
            }
            for k in i..n {
                a[[j, k]] -= factor * a[[i, k]];
            }
            b[j] -= factor * b[i];
        }
    }

    // Back substitution
    let mut x = Array1::zeros(n);
    for i in (0..n).rev() {
        let mut sum = b[i];
        for j in i + 1..n {
            sum -= a[[i, j]] * x[j];
        }
        x[i] = sum / a[[i, i]];
    }
    Ok(x)
}
