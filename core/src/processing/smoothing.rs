use crate::math::savgol::SavitzkyGolay;
use crate::prelude::{
    AnalysisConfig, AnalysisError, ProcessingStage, StageInput, StageMetadata, StageOutput,
    StageResult,
};
use crate::telemetry::log::LogManager;

/// Savitzky-Golay smoothing of the interpolated counts.
pub struct SmoothingStage {
    filter: Option<SavitzkyGolay>,
    logger: LogManager,
}

impl SmoothingStage {
    pub fn new() -> Self {
        Self {
            filter: None,
            logger: LogManager::new("smoothing"),
        }
    }
}

impl Default for SmoothingStage {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStage for SmoothingStage {
    fn initialize(&mut self, config: &AnalysisConfig) -> StageResult<()> {
        let filter = SavitzkyGolay::new(config.window_length, config.polyorder)?;
        if filter.window() % 2 == 0 {
            self.logger.warn(&format!(
                "even window length {}; smoothed values are centred half a sample late",
                filter.window()
            ));
        }
        self.filter = Some(filter);
        Ok(())
    }

    fn execute(&mut self, input: StageInput) -> StageResult<StageOutput> {
        let filter = self
            .filter
            .as_ref()
            .ok_or_else(|| AnalysisError::Internal("stage not initialized".into()))?;

        if input.voltages.len() != input.counts.len() {
            return Err(AnalysisError::Internal(
                "voltage and count axes differ in length".into(),
            ));
        }

        let counts = filter.apply(&input.counts)?;
        let note = format!(
            "window {} / order {} over {} points",
            filter.window(),
            filter.polyorder(),
            counts.len()
        );
        self.logger.record(&note);

        Ok(StageOutput {
            voltages: input.voltages,
            counts,
            metadata: StageMetadata {
                notes: vec![note],
                ..Default::default()
            },
        })
    }

    fn cleanup(&mut self) {
        self.filter = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoothing_keeps_length_and_axis() {
        let mut stage = SmoothingStage::new();
        stage.initialize(&AnalysisConfig::new(1.0, 1.0)).unwrap();
        let voltages: Vec<f64> = (0..50).map(|i| 100.0 + i as f64).collect();
        let counts: Vec<f64> = (0..50).map(|i| if i % 2 == 0 { 10.0 } else { 12.0 }).collect();
        let output = stage
            .execute(StageInput {
                voltages: voltages.clone(),
                counts,
            })
            .unwrap();
        assert_eq!(output.voltages, voltages);
        assert_eq!(output.counts.len(), 50);
        // Alternating noise is pulled toward the mean in the interior.
        assert!((output.counts[25] - 11.0).abs() < 0.5);
        stage.cleanup();
    }

    #[test]
    fn invalid_order_fails_at_initialize() {
        let mut stage = SmoothingStage::new();
        let config = AnalysisConfig::new(1.0, 1.0).with_smoothing(5, 5);
        assert!(matches!(
            stage.initialize(&config),
            Err(AnalysisError::Smoothing(_))
        ));
    }

    #[test]
    fn window_longer_than_curve_fails() {
        let mut stage = SmoothingStage::new();
        stage.initialize(&AnalysisConfig::new(1.0, 1.0)).unwrap();
        let err = stage
            .execute(StageInput {
                voltages: vec![1.0, 2.0, 3.0, 4.0],
                counts: vec![1.0, 2.0, 3.0, 4.0],
            })
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Smoothing(_)));
    }
}
