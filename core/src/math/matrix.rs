use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

pub struct MatrixHelper;

impl MatrixHelper {
    /// Multiply two 2D arrays.
    pub fn multiply(lhs: ArrayView2<f64>, rhs: ArrayView2<f64>) -> Array2<f64> {
        lhs.dot(&rhs)
    }

    /// Solves `a * x = b` by Gaussian elimination with partial pivoting.
    ///
    /// Returns `None` when the system is not square or is numerically singular.
    pub fn solve(mut a: Array2<f64>, mut b: Array1<f64>) -> Option<Array1<f64>> {
        let n = b.len();
        if a.nrows() != n || a.ncols() != n {
            return None;
        }
        if n == 0 {
            return Some(b);
        }

        let scale = a.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        if scale == 0.0 || !scale.is_finite() {
            return None;
        }
        let tolerance = scale * 1e-13;

        for col in 0..n {
            let pivot_row = (col..n)
                .max_by(|&lhs, &rhs| a[[lhs, col]].abs().total_cmp(&a[[rhs, col]].abs()))?;
            if a[[pivot_row, col]].abs() <= tolerance {
                return None;
            }
            if pivot_row != col {
                for k in 0..n {
                    a.swap([col, k], [pivot_row, k]);
                }
                b.swap(col, pivot_row);
            }

            for row in (col + 1)..n {
                let factor = a[[row, col]] / a[[col, col]];
                if factor == 0.0 {
                    continue;
                }
                for k in col..n {
                    a[[row, k]] -= factor * a[[col, k]];
                }
                b[row] -= factor * b[col];
            }
        }

        let mut x = Array1::<f64>::zeros(n);
        for row in (0..n).rev() {
            let tail: f64 = ((row + 1)..n).map(|k| a[[row, k]] * x[k]).sum();
            x[row] = (b[row] - tail) / a[[row, row]];
        }
        Some(x)
    }

    /// Least-squares fit of `design * beta ~= observations` through the
    /// normal equations.
    pub fn least_squares(
        design: ArrayView2<f64>,
        observations: ArrayView1<f64>,
    ) -> Option<Array1<f64>> {
        let normal = Self::multiply(design.t(), design);
        let rhs = design.t().dot(&observations);
        Self::solve(normal, rhs)
    }

    /// Vandermonde matrix with ascending powers `1, t, t^2, ..., t^order`.
    pub fn vandermonde(positions: &[f64], order: usize) -> Array2<f64> {
        Array2::from_shape_fn((positions.len(), order + 1), |(row, power)| {
            positions[row].powi(power as i32)
        })
    }
}
