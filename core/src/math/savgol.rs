use ndarray::{Array1, ArrayView1};

use crate::math::matrix::MatrixHelper;
use crate::prelude::{AnalysisError, StageResult};

/// Sliding-window least-squares polynomial smoother (Savitzky-Golay).
///
/// The window feeding output `i` starts at `i - (window - 1) / 2` and the
/// fitted polynomial is evaluated at the window centre. For an even window
/// that centre sits half a sample after `i`. The first and last
/// `window / 2` outputs are read off a single polynomial fitted to the
/// leading/trailing window.
#[derive(Debug, Clone)]
pub struct SavitzkyGolay {
    window: usize,
    polyorder: usize,
    positions: Vec<f64>,
    coefficients: Vec<f64>,
}

impl SavitzkyGolay {
    pub fn new(window: usize, polyorder: usize) -> StageResult<Self> {
        if window == 0 {
            return Err(AnalysisError::Smoothing(
                "window length must be positive".into(),
            ));
        }
        if polyorder >= window {
            return Err(AnalysisError::Smoothing(format!(
                "polynomial order {} must be less than window length {}",
                polyorder, window
            )));
        }

        let centre = (window as f64 - 1.0) / 2.0;
        let positions: Vec<f64> = (0..window).map(|k| k as f64 - centre).collect();
        let design = MatrixHelper::vandermonde(&positions, polyorder);

        // Value of the fit at the centre is the first row of (A^T A)^-1 A^T.
        let normal = MatrixHelper::multiply(design.t(), design.view());
        let mut unit = Array1::<f64>::zeros(polyorder + 1);
        unit[0] = 1.0;
        let z = MatrixHelper::solve(normal, unit).ok_or_else(|| {
            AnalysisError::Smoothing("window normal equations are singular".into())
        })?;
        let coefficients = design.dot(&z).to_vec();

        Ok(Self {
            window,
            polyorder,
            positions,
            coefficients,
        })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn polyorder(&self) -> usize {
        self.polyorder
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn apply(&self, data: &[f64]) -> StageResult<Vec<f64>> {
        let len = data.len();
        if self.window > len {
            return Err(AnalysisError::Smoothing(format!(
                "window length {} exceeds curve length {}",
                self.window, len
            )));
        }

        let half = self.window / 2;
        let lead = (self.window - 1) / 2;
        let mut output = data.to_vec();

        for (start, slot) in output[lead..=(len - self.window + lead)]
            .iter_mut()
            .enumerate()
        {
            *slot = data[start..start + self.window]
                .iter()
                .zip(&self.coefficients)
                .map(|(value, weight)| value * weight)
                .sum();
        }

        let head = self.fit(&data[..self.window])?;
        for (i, slot) in output[..half].iter_mut().enumerate() {
            *slot = evaluate(&head, self.positions[i]);
        }

        let tail_start = len - self.window;
        let tail = self.fit(&data[tail_start..])?;
        for i in (len - half)..len {
            output[i] = evaluate(&tail, self.positions[i - tail_start]);
        }

        Ok(output)
    }

    fn fit(&self, window: &[f64]) -> StageResult<Array1<f64>> {
        let design = MatrixHelper::vandermonde(&self.positions, self.polyorder);
        MatrixHelper::least_squares(design.view(), ArrayView1::from(window)).ok_or_else(|| {
            AnalysisError::Smoothing("edge polynomial fit is singular".into())
        })
    }
}

fn evaluate(coefs: &Array1<f64>, t: f64) -> f64 {
    coefs
        .iter()
        .rev()
        .fold(0.0, |acc, &beta| f64::mul_add(acc, t, beta))
}
