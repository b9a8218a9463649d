use anyhow::{ensure, Context};
use geigercore::interface::SampleSet;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::generator::template::{breakdown_excess, logistic_rise};

/// Configuration for generating a synthetic Geiger characteristic curve.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub start: f64,
    pub end: f64,
    pub step: f64,
    /// Voltage at which the tube reaches half its plateau rate.
    pub threshold_voltage: f64,
    pub rise_width: f64,
    /// Counts on the plateau at the threshold voltage.
    pub plateau_rate: f64,
    /// Relative plateau slope per volt.
    pub plateau_slope: f64,
    pub breakdown_voltage: f64,
    pub breakdown_scale: f64,
    /// Jitter amplitude in units of `sqrt(count)`.
    pub noise: f64,
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            start: 340.0,
            end: 700.0,
            step: 10.0,
            threshold_voltage: 350.0,
            rise_width: 8.0,
            plateau_rate: 1000.0,
            plateau_slope: 0.0005,
            breakdown_voltage: 600.0,
            breakdown_scale: 15.0,
            noise: 0.0,
            seed: 0,
        }
    }
}

impl GeneratorConfig {
    fn sample_count(&self) -> anyhow::Result<usize> {
        ensure!(
            self.step > 0.0 && self.end > self.start,
            "generator needs a positive step and end > start"
        );
        let intervals = ((self.end - self.start) / self.step).round();
        ensure!(
            intervals.is_finite() && intervals < 1e6,
            "generator sweep of {} steps is too large",
            intervals
        );
        Ok(intervals as usize + 1)
    }

    fn expected_count(&self, voltage: f64) -> f64 {
        let rise = logistic_rise(voltage, self.threshold_voltage, self.rise_width);
        let tilt = 1.0 + self.plateau_slope * (voltage - self.threshold_voltage);
        let excess = breakdown_excess(voltage, self.breakdown_voltage, self.breakdown_scale);
        self.plateau_rate * (rise * tilt + excess)
    }
}

pub fn build_sample_set(config: &GeneratorConfig) -> anyhow::Result<SampleSet> {
    let count = config.sample_count()?;
    let mut rng = StdRng::seed_from_u64(config.seed);

    let mut voltages = Vec::with_capacity(count);
    let mut counts = Vec::with_capacity(count);
    for index in 0..count {
        let voltage = config.start + config.step * index as f64;
        let expected = config.expected_count(voltage);
        let jitter = if config.noise > 0.0 {
            rng.gen_range(-config.noise..config.noise) * expected.max(0.0).sqrt()
        } else {
            0.0
        };
        voltages.push(voltage);
        counts.push((expected + jitter).max(0.0));
    }

    SampleSet::new(voltages, counts).context("building synthetic sample set")
}
