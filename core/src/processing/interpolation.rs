use crate::math::spline::CubicSpline;
use crate::math::stats::StatsHelper;
use crate::prelude::{
    AnalysisConfig, AnalysisError, ProcessingStage, StageInput, StageMetadata, StageOutput,
    StageResult,
};
use crate::telemetry::log::LogManager;

/// Resamples the measured points onto a uniform voltage grid through a
/// not-a-knot cubic spline.
pub struct InterpolationStage {
    config: Option<AnalysisConfig>,
    logger: LogManager,
}

impl InterpolationStage {
    pub fn new() -> Self {
        Self {
            config: None,
            logger: LogManager::new("interpolation"),
        }
    }
}

impl Default for InterpolationStage {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStage for InterpolationStage {
    fn initialize(&mut self, config: &AnalysisConfig) -> StageResult<()> {
        self.config = Some(config.clone());
        Ok(())
    }

    fn execute(&mut self, input: StageInput) -> StageResult<StageOutput> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| AnalysisError::Internal("stage not initialized".into()))?;

        let points = config.interpolation_points;
        if points < 2 {
            return Err(AnalysisError::Interpolation(format!(
                "need at least 2 output points, got {}",
                points
            )));
        }

        let spline = CubicSpline::not_a_knot(&input.voltages, &input.counts)?;
        let voltages = StatsHelper::linspace(spline.min_x(), spline.max_x(), points);
        let counts = spline.sample(&voltages);

        let mut notes = vec![format!(
            "interpolated {} samples onto {} points",
            input.voltages.len(),
            points
        )];
        if points < input.voltages.len() {
            let note = format!(
                "{} output points is coarser than the {} input samples",
                points,
                input.voltages.len()
            );
            self.logger.warn(&note);
            notes.push(note);
        }
        self.logger.record(&notes[0]);

        Ok(StageOutput {
            voltages,
            counts,
            metadata: StageMetadata {
                notes,
                ..Default::default()
            },
        })
    }

    fn cleanup(&mut self) {
        self.config = None;
    }
}
