pub struct StatsHelper;

impl StatsHelper {
    /// `count` evenly spaced values over `[start, end]`, both ends included.
    pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
        match count {
            0 => Vec::new(),
            1 => vec![start],
            _ => {
                let step = (end - start) / (count - 1) as f64;
                let mut values: Vec<f64> = (0..count).map(|i| start + step * i as f64).collect();
                values[count - 1] = end;
                values
            }
        }
    }

    pub fn is_strictly_increasing(values: &[f64]) -> bool {
        values.windows(2).all(|pair| pair[0] < pair[1])
    }

    /// Smallest and largest finite value, or `None` for an empty slice.
    pub fn bounds(values: &[f64]) -> Option<(f64, f64)> {
        values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}
