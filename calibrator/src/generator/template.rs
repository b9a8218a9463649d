/// Fraction of the full count rate reached at `voltage` on a logistic rise
/// centred on `threshold`.
pub fn logistic_rise(voltage: f64, threshold: f64, width: f64) -> f64 {
    1.0 / (1.0 + (-(voltage - threshold) / width).exp())
}

/// Extra counts (as a fraction of the plateau rate) from continuous
/// discharge past `onset`; zero below it.
pub fn breakdown_excess(voltage: f64, onset: f64, scale: f64) -> f64 {
    if voltage <= onset {
        0.0
    } else {
        0.05 * (((voltage - onset) / scale).exp() - 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logistic_is_half_at_threshold() {
        assert!((logistic_rise(350.0, 350.0, 8.0) - 0.5).abs() < 1e-12);
        assert!(logistic_rise(450.0, 350.0, 8.0) > 0.999);
    }

    #[test]
    fn breakdown_starts_at_onset() {
        assert_eq!(breakdown_excess(590.0, 600.0, 15.0), 0.0);
        assert_eq!(breakdown_excess(600.0, 600.0, 15.0), 0.0);
        assert!(breakdown_excess(660.0, 600.0, 15.0) > 2.0);
    }
}
