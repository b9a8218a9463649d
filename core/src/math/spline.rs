use ndarray::{Array1, Array2};

use crate::math::matrix::MatrixHelper;
use crate::prelude::{AnalysisError, StageResult};

/// Fewest knots for which the two not-a-knot end conditions are independent.
pub const MIN_SPLINE_KNOTS: usize = 4;

/// One cubic piece stored in Horner order `[d, c, b, a]`:
/// `S(x) = a + b*(x-x0) + c*(x-x0)^2 + d*(x-x0)^3`.
#[derive(Debug, Clone)]
struct Segment {
    coefs: [f64; 4],
    lhs_x: f64,
}

impl Segment {
    fn value(&self, x: f64) -> f64 {
        let dx = x - self.lhs_x;
        self.coefs[1..]
            .iter()
            .fold(self.coefs[0], |acc, &beta| f64::mul_add(acc, dx, beta))
    }
}

/// Piecewise cubic interpolant with not-a-knot end conditions.
#[derive(Debug, Clone)]
pub struct CubicSpline {
    segments: Vec<Segment>,
    max_x: f64,
}

impl CubicSpline {
    pub fn not_a_knot(xs: &[f64], ys: &[f64]) -> StageResult<Self> {
        if xs.len() != ys.len() {
            return Err(AnalysisError::Interpolation(format!(
                "{} knots but {} values",
                xs.len(),
                ys.len()
            )));
        }
        if xs.len() < MIN_SPLINE_KNOTS {
            return Err(AnalysisError::Interpolation(format!(
                "cubic interpolation needs at least {} points, got {}",
                MIN_SPLINE_KNOTS,
                xs.len()
            )));
        }
        if xs.iter().chain(ys).any(|v| !v.is_finite()) {
            return Err(AnalysisError::Interpolation(
                "knots and values must be finite".into(),
            ));
        }
        if let Some(idx) = xs.windows(2).position(|pair| pair[1] <= pair[0]) {
            return Err(AnalysisError::Interpolation(format!(
                "x values must be strictly increasing (x[{}]={} then x[{}]={})",
                idx,
                xs[idx],
                idx + 1,
                xs[idx + 1]
            )));
        }

        let n = xs.len() - 1;
        let h: Vec<f64> = xs.windows(2).map(|pair| pair[1] - pair[0]).collect();
        let (mut mat, rhs) = build_interior_system(xs, ys, &h);

        // Third derivative continuous across x[1] and x[n-1].
        mat[[0, 0]] = -h[1];
        mat[[0, 1]] = h[0] + h[1];
        mat[[0, 2]] = -h[0];
        mat[[n, n - 2]] = -h[n - 1];
        mat[[n, n - 1]] = h[n - 2] + h[n - 1];
        mat[[n, n]] = -h[n - 2];

        let moments = MatrixHelper::solve(mat, rhs).ok_or_else(|| {
            AnalysisError::Interpolation("spline moment system is singular".into())
        })?;

        let segments = (0..n)
            .map(|i| {
                let (m0, m1) = (moments[i], moments[i + 1]);
                let d = (m1 - m0) / (6.0 * h[i]);
                let c = m0 / 2.0;
                let b = (ys[i + 1] - ys[i]) / h[i] - h[i] * (2.0 * m0 + m1) / 6.0;
                Segment {
                    coefs: [d, c, b, ys[i]],
                    lhs_x: xs[i],
                }
            })
            .collect();

        Ok(Self {
            segments,
            max_x: xs[n],
        })
    }

    pub fn min_x(&self) -> f64 {
        self.segments[0].lhs_x
    }

    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    /// Evaluates the spline; points outside the knot range extrapolate the
    /// nearest end piece.
    pub fn value(&self, x: f64) -> f64 {
        self.segments[self.find_segment(x)].value(x)
    }

    pub fn sample(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.value(x)).collect()
    }

    fn find_segment(&self, x: f64) -> usize {
        let last = self.segments.len() - 1;
        if x <= self.min_x() {
            0
        } else if x >= self.max_x {
            last
        } else {
            self.segments
                .partition_point(|s| s.lhs_x <= x)
                .saturating_sub(1)
                .min(last)
        }
    }
}

/// Rows 1..n of the C2-continuity system for the knot second derivatives:
/// `h[i-1] m[i-1] + 2 (h[i-1]+h[i]) m[i] + h[i] m[i+1] = 6 (s[i] - s[i-1])`.
fn build_interior_system(xs: &[f64], ys: &[f64], h: &[f64]) -> (Array2<f64>, Array1<f64>) {
    let n = xs.len() - 1;
    let mut mat = Array2::<f64>::zeros((n + 1, n + 1));
    let mut rhs = Array1::<f64>::zeros(n + 1);

    for i in 1..n {
        mat[[i, i - 1]] = h[i - 1];
        mat[[i, i]] = 2.0 * (h[i - 1] + h[i]);
        mat[[i, i + 1]] = h[i];
        rhs[i] = 6.0 * ((ys[i + 1] - ys[i]) / h[i] - (ys[i] - ys[i - 1]) / h[i - 1]);
    }
    (mat, rhs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spline_passes_through_knots() {
        let xs = [100.0, 150.0, 200.0, 250.0, 300.0, 350.0, 400.0];
        let ys = [5.0, 40.0, 42.0, 43.0, 44.0, 46.0, 90.0];
        let spline = CubicSpline::not_a_knot(&xs, &ys).unwrap();
        for (x, y) in xs.iter().zip(ys.iter()) {
            assert!((spline.value(*x) - y).abs() < 1e-9, "knot {} drifted", x);
        }
    }

    #[test]
    fn spline_reproduces_cubic_polynomial() {
        let poly = |x: f64| 0.5 * x * x * x - 2.0 * x * x + x - 7.0;
        let xs = [0.0, 0.7, 1.5, 3.0, 4.2, 5.0];
        let ys: Vec<f64> = xs.iter().map(|&x| poly(x)).collect();
        let spline = CubicSpline::not_a_knot(&xs, &ys).unwrap();
        for step in 0..=50 {
            let x = step as f64 * 0.1;
            assert!((spline.value(x) - poly(x)).abs() < 1e-8);
        }
    }

    #[test]
    fn spline_rejects_too_few_points() {
        let err = CubicSpline::not_a_knot(&[0.0, 1.0, 2.0], &[0.0, 1.0, 4.0]).unwrap_err();
        assert!(matches!(err, AnalysisError::Interpolation(_)));
    }

    #[test]
    fn spline_rejects_repeated_knot() {
        let err =
            CubicSpline::not_a_knot(&[0.0, 1.0, 1.0, 2.0], &[0.0, 1.0, 1.0, 4.0]).unwrap_err();
        assert!(matches!(err, AnalysisError::Interpolation(_)));
    }
}
