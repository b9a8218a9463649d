use crate::interface::PlateauRegion;
use crate::math::calculus::DifferenceHelper;
use crate::prelude::{
    AnalysisConfig, AnalysisError, ProcessingStage, StageInput, StageMetadata, StageOutput,
    StageResult,
};
use crate::telemetry::log::LogManager;

/// First index whose absolute slope is below `threshold`.
pub fn find_plateau_start(gradient: &[f64], threshold: f64) -> Option<usize> {
    gradient.iter().position(|g| g.abs() < threshold)
}

/// First index at or after `from` whose absolute slope exceeds `threshold`.
pub fn find_breakdown_start(gradient: &[f64], from: usize, threshold: f64) -> Option<usize> {
    gradient
        .get(from..)?
        .iter()
        .position(|g| g.abs() > threshold)
        .map(|offset| offset + from)
}

/// Differentiates the smoothed curve and scans the slope for the plateau
/// and the breakdown onset.
pub struct SlopeStage {
    config: Option<AnalysisConfig>,
    logger: LogManager,
}

impl SlopeStage {
    pub fn new() -> Self {
        Self {
            config: None,
            logger: LogManager::new("slope"),
        }
    }
}

impl Default for SlopeStage {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStage for SlopeStage {
    fn initialize(&mut self, config: &AnalysisConfig) -> StageResult<()> {
        config.validate()?;
        self.config = Some(config.clone());
        Ok(())
    }

    fn execute(&mut self, input: StageInput) -> StageResult<StageOutput> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| AnalysisError::Internal("stage not initialized".into()))?;

        if input.voltages.is_empty() {
            return Err(AnalysisError::Internal("no curve to differentiate".into()));
        }
        if input.voltages.len() != input.counts.len() {
            return Err(AnalysisError::Internal(
                "voltage and count axes differ in length".into(),
            ));
        }

        let gradient = DifferenceHelper::gradient(&input.counts, &input.voltages);
        let last = gradient.len() - 1;

        let plateau_hit = find_plateau_start(&gradient, config.start_threshold);
        let plateau_start = plateau_hit.unwrap_or(0);
        let breakdown_hit = find_breakdown_start(&gradient, plateau_start, config.end_threshold);
        let breakdown_start = breakdown_hit.unwrap_or(last);

        let region = PlateauRegion::new(
            plateau_start,
            breakdown_start,
            &input.voltages,
            plateau_hit.is_some(),
            breakdown_hit.is_some(),
        )?;

        let mut notes = Vec::new();
        if !region.plateau_detected {
            notes.push(format!(
                "no slope below {} counts/V; plateau assumed to start at {:.2} V",
                config.start_threshold, region.plateau_start_voltage
            ));
        }
        if !region.breakdown_detected {
            notes.push(format!(
                "no slope above {} counts/V after the plateau; breakdown assumed at {:.2} V",
                config.end_threshold, region.breakdown_start_voltage
            ));
        }
        if region.width_points() == 0 {
            notes.push(format!(
                "plateau has zero width at {:.2} V",
                region.plateau_start_voltage
            ));
        }
        for note in &notes {
            self.logger.warn(note);
        }

        let summary = format!(
            "plateau [{}, {}] midpoint {} -> {:.2} V",
            region.plateau_start,
            region.breakdown_start,
            region.midpoint_index,
            region.operating_voltage
        );
        self.logger.record(&summary);
        notes.insert(0, summary);

        Ok(StageOutput {
            voltages: input.voltages,
            counts: input.counts,
            metadata: StageMetadata {
                gradient: Some(gradient),
                plateau: Some(region),
                notes,
            },
        })
    }

    fn cleanup(&mut self) {
        self.config = None;
    }
}
