use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use geigercore::interface::{PlateauAnalysis, SampleSet};
use geigercore::processing::PlateauAnalyzer;
use log::info;

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self, samples: &SampleSet) -> anyhow::Result<PlateauAnalysis> {
        let analysis_config = self.config.to_analysis_config();
        info!(
            "running plateau analysis: thresholds {}/{} counts/V, {} points, window {} order {}",
            analysis_config.start_threshold,
            analysis_config.end_threshold,
            analysis_config.interpolation_points,
            analysis_config.window_length,
            analysis_config.polyorder
        );

        PlateauAnalyzer::new(analysis_config)
            .analyze(samples)
            .context("analysing calibration curve")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::profile::{build_sample_set, GeneratorConfig};

    #[test]
    fn runner_finds_synthetic_plateau() {
        let cfg = WorkflowConfig::from_args(5.0, 5.0, 500, 10, 3);
        let runner = Runner::new(cfg);
        let samples = build_sample_set(&GeneratorConfig::default()).unwrap();
        let result = runner.execute(&samples).unwrap();

        let plateau = &result.plateau;
        assert!(plateau.plateau_detected && plateau.breakdown_detected);
        assert!(
            (360.0..=400.0).contains(&plateau.plateau_start_voltage),
            "plateau start {}",
            plateau.plateau_start_voltage
        );
        assert!(
            (590.0..=630.0).contains(&plateau.breakdown_start_voltage),
            "breakdown {}",
            plateau.breakdown_start_voltage
        );
        assert!((470.0..=520.0).contains(&result.operating_voltage()));
    }

    #[test]
    fn runner_wraps_core_errors() {
        let cfg = WorkflowConfig::from_args(5.0, 5.0, 500, 4, 4);
        let runner = Runner::new(cfg);
        let samples = build_sample_set(&GeneratorConfig::default()).unwrap();
        let err = runner.execute(&samples).unwrap_err();
        assert!(format!("{:#}", err).contains("analysing calibration curve"));
    }
}
