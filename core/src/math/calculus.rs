/// Finite-difference helpers on sampled curves.
pub struct DifferenceHelper;

impl DifferenceHelper {
    /// Derivative of `values` with respect to `coords`.
    ///
    /// Interior points use the second-order central difference for
    /// non-uniform spacing, the endpoints first-order one-sided differences.
    /// Callers guarantee equal lengths and strictly increasing `coords`.
    pub fn gradient(values: &[f64], coords: &[f64]) -> Vec<f64> {
        let n = values.len().min(coords.len());
        if n < 2 {
            return vec![0.0; n];
        }

        let mut gradient = vec![0.0; n];
        gradient[0] = (values[1] - values[0]) / (coords[1] - coords[0]);
        gradient[n - 1] = (values[n - 1] - values[n - 2]) / (coords[n - 1] - coords[n - 2]);

        for i in 1..n - 1 {
            let hs = coords[i] - coords[i - 1];
            let hd = coords[i + 1] - coords[i];
            gradient[i] = (hs * hs * values[i + 1] + (hd * hd - hs * hs) * values[i]
                - hd * hd * values[i - 1])
                / (hs * hd * (hd + hs));
        }
        gradient
    }
}
