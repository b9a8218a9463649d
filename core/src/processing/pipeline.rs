use std::path::Path;

use crate::interface::{PlateauAnalysis, SampleSet};
use crate::prelude::{AnalysisConfig, AnalysisError, ProcessingStage, StageResult};
use crate::processing::{InterpolationStage, SlopeStage, SmoothingStage};
use crate::telemetry::log::LogManager;

/// Runs interpolation, smoothing and slope analysis in order.
#[derive(Debug, Clone)]
pub struct PlateauAnalyzer {
    config: AnalysisConfig,
}

impl PlateauAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn analyze(&self, samples: &SampleSet) -> StageResult<PlateauAnalysis> {
        self.config.validate()?;
        let logger = LogManager::new("pipeline");
        let first = samples.voltages().first().copied().unwrap_or(f64::NAN);
        let last = samples.voltages().last().copied().unwrap_or(f64::NAN);
        logger.record(&format!(
            "analysing {} samples ({:.2} V to {:.2} V)",
            samples.len(),
            first,
            last
        ));

        let mut interpolation = InterpolationStage::new();
        interpolation.initialize(&self.config)?;
        let interpolated = interpolation.execute(samples.to_stage_input())?;
        interpolation.cleanup();

        let mut smoothing = SmoothingStage::new();
        smoothing.initialize(&self.config)?;
        let smoothed = smoothing.execute(interpolated.clone().into_input())?;
        smoothing.cleanup();

        let mut slope = SlopeStage::new();
        slope.initialize(&self.config)?;
        let analysed = slope.execute(smoothed.clone().into_input())?;
        slope.cleanup();

        let plateau = analysed
            .metadata
            .plateau
            .ok_or_else(|| AnalysisError::Internal("slope stage produced no plateau".into()))?;
        let gradient = analysed
            .metadata
            .gradient
            .ok_or_else(|| AnalysisError::Internal("slope stage produced no gradient".into()))?;

        let notes = interpolated
            .metadata
            .notes
            .into_iter()
            .chain(smoothed.metadata.notes)
            .chain(analysed.metadata.notes)
            .collect();

        Ok(PlateauAnalysis {
            config: self.config.clone(),
            samples: samples.clone(),
            voltages: analysed.voltages,
            interpolated: interpolated.counts,
            smoothed: analysed.counts,
            gradient,
            plateau,
            notes,
        })
    }
}

/// Loads a `V`/`C` table and returns the estimated operating voltage with the
/// reference smoothing settings.
pub fn determine_operating_voltage<P: AsRef<Path>>(
    file_path: P,
    start_threshold: f64,
    end_threshold: f64,
    interpolation_points: usize,
) -> StageResult<f64> {
    let samples = SampleSet::from_csv_path(file_path)?;
    let config = AnalysisConfig::new(start_threshold, end_threshold)
        .with_interpolation_points(interpolation_points);
    let analysis = PlateauAnalyzer::new(config).analyze(&samples)?;
    Ok(analysis.operating_voltage())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn reference_samples() -> SampleSet {
        SampleSet::new(
            vec![100.0, 150.0, 200.0, 250.0, 300.0, 350.0, 400.0],
            vec![5.0, 40.0, 42.0, 43.0, 44.0, 46.0, 90.0],
        )
        .unwrap()
    }

    #[test]
    fn curves_stay_index_aligned() {
        let analysis = PlateauAnalyzer::new(AnalysisConfig::new(5.0, 20.0))
            .analyze(&reference_samples())
            .unwrap();
        assert_eq!(analysis.voltages.len(), 500);
        assert_eq!(analysis.interpolated.len(), 500);
        assert_eq!(analysis.smoothed.len(), 500);
        assert_eq!(analysis.gradient.len(), 500);
    }

    #[test]
    fn reference_curve_lands_in_middle_span() {
        let analysis = PlateauAnalyzer::new(AnalysisConfig::new(5.0, 20.0))
            .analyze(&reference_samples())
            .unwrap();
        let voltage = analysis.operating_voltage();
        assert!((200.0..=300.0).contains(&voltage), "got {}", voltage);
        assert!(analysis.summary_line().starts_with("Estimated Operating Voltage: "));
        assert!(analysis.summary_line().ends_with(" V"));
    }

    #[test]
    fn tight_thresholds_exclude_steep_ends() {
        let analysis = PlateauAnalyzer::new(AnalysisConfig::new(0.3, 0.3))
            .analyze(&reference_samples())
            .unwrap();
        let plateau = &analysis.plateau;
        assert!(plateau.plateau_detected && plateau.breakdown_detected);
        assert!(plateau.plateau_start_voltage > 100.0);
        assert!(plateau.breakdown_start_voltage < 400.0);
        assert!((200.0..=300.0).contains(&analysis.operating_voltage()));
    }

    #[test]
    fn operating_voltage_stays_inside_curve() {
        let samples = reference_samples();
        for (start, end) in [(0.1, 0.1), (1.0, 0.5), (300.0, 300.0), (0.0, 0.0)] {
            let analysis = PlateauAnalyzer::new(AnalysisConfig::new(start, end))
                .analyze(&samples)
                .unwrap();
            let first = analysis.voltages[0];
            let last = analysis.voltages[analysis.voltages.len() - 1];
            assert!(analysis.operating_voltage() >= first);
            assert!(analysis.operating_voltage() <= last);
        }
    }

    #[test]
    fn flat_samples_put_operating_point_at_centre() {
        let samples = SampleSet::new(
            vec![400.0, 450.0, 500.0, 550.0, 600.0],
            vec![120.0; 5],
        )
        .unwrap();
        let config = AnalysisConfig::new(1.0, 1.0).with_interpolation_points(201);
        let analysis = PlateauAnalyzer::new(config).analyze(&samples).unwrap();
        assert_eq!(analysis.plateau.plateau_start, 0);
        assert_eq!(analysis.plateau.breakdown_start, 200);
        assert!((analysis.operating_voltage() - 500.0).abs() < 1e-9);
        assert!(analysis.gradient.iter().all(|g| g.abs() < 1e-9));
    }

    #[test]
    fn dense_rise_flat_rise_brackets_flat_segment() {
        // Counts rise at 50/V up to 20 V, stay flat to 60 V, then rise again.
        let voltages: Vec<f64> = (0..=100).map(|v| v as f64).collect();
        let counts = (0..=100)
            .map(|v| match v {
                0..=20 => 50.0 * v as f64,
                21..=60 => 1000.0,
                _ => 1000.0 + 50.0 * (v - 60) as f64,
            })
            .collect();
        let samples = SampleSet::new(voltages, counts).unwrap();
        let config = AnalysisConfig::new(10.0, 40.0).with_interpolation_points(101);
        let analysis = PlateauAnalyzer::new(config).analyze(&samples).unwrap();

        let plateau = &analysis.plateau;
        assert!(plateau.plateau_detected && plateau.breakdown_detected);
        assert!(
            (19..=21).contains(&plateau.plateau_start),
            "plateau start {}",
            plateau.plateau_start
        );
        assert!(
            (59..=61).contains(&plateau.breakdown_start),
            "breakdown start {}",
            plateau.breakdown_start
        );
    }

    #[test]
    fn nan_threshold_is_rejected() {
        let err = PlateauAnalyzer::new(AnalysisConfig::new(f64::NAN, 1.0))
            .analyze(&reference_samples())
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Config(_)));
    }

    #[test]
    fn too_few_points_for_window_is_smoothing_error() {
        let config = AnalysisConfig::new(1.0, 1.0).with_interpolation_points(8);
        let err = PlateauAnalyzer::new(config)
            .analyze(&reference_samples())
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Smoothing(_)));
    }

    #[test]
    fn entry_point_reads_csv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "V,C").unwrap();
        for (v, c) in [(100, 5), (150, 40), (200, 42), (250, 43), (300, 44), (350, 46), (400, 90)] {
            writeln!(file, "{},{}", v, c).unwrap();
        }
        let voltage = determine_operating_voltage(file.path(), 5.0, 20.0, 500).unwrap();
        assert!((200.0..=300.0).contains(&voltage));
    }
}
