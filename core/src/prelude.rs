use serde::{Deserialize, Serialize};

use crate::interface::PlateauRegion;

pub const DEFAULT_INTERPOLATION_POINTS: usize = 500;
pub const DEFAULT_WINDOW_LENGTH: usize = 10;
pub const DEFAULT_POLYORDER: usize = 3;

fn default_interpolation_points() -> usize {
    DEFAULT_INTERPOLATION_POINTS
}

fn default_window_length() -> usize {
    DEFAULT_WINDOW_LENGTH
}

fn default_polyorder() -> usize {
    DEFAULT_POLYORDER
}

/// Shared configuration for each processing stage.
///
/// The two thresholds are absolute slopes in counts per volt and have no
/// defaults: they depend on the count range of the dataset being analysed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub start_threshold: f64,
    pub end_threshold: f64,
    #[serde(default = "default_interpolation_points")]
    pub interpolation_points: usize,
    #[serde(default = "default_window_length")]
    pub window_length: usize,
    #[serde(default = "default_polyorder")]
    pub polyorder: usize,
}

impl AnalysisConfig {
    pub fn new(start_threshold: f64, end_threshold: f64) -> Self {
        Self {
            start_threshold,
            end_threshold,
            interpolation_points: DEFAULT_INTERPOLATION_POINTS,
            window_length: DEFAULT_WINDOW_LENGTH,
            polyorder: DEFAULT_POLYORDER,
        }
    }

    pub fn with_interpolation_points(mut self, points: usize) -> Self {
        self.interpolation_points = points;
        self
    }

    pub fn with_smoothing(mut self, window_length: usize, polyorder: usize) -> Self {
        self.window_length = window_length;
        self.polyorder = polyorder;
        self
    }

    /// Rejects settings no stage could run with. Window/order consistency is
    /// left to the smoothing stage, which knows the curve length.
    pub fn validate(&self) -> StageResult<()> {
        if self.start_threshold.is_nan() || self.end_threshold.is_nan() {
            return Err(AnalysisError::Config("thresholds must not be NaN".into()));
        }
        if self.interpolation_points == 0 {
            return Err(AnalysisError::Config(
                "interpolation_points must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Input payload for a processing stage: a voltage axis and its counts.
#[derive(Debug, Clone, Default)]
pub struct StageInput {
    pub voltages: Vec<f64>,
    pub counts: Vec<f64>,
}

/// Output produced by each stage.
#[derive(Debug, Clone)]
pub struct StageOutput {
    pub voltages: Vec<f64>,
    pub counts: Vec<f64>,
    pub metadata: StageMetadata,
}

impl StageOutput {
    /// Hands the curve on to the next stage, dropping the metadata.
    pub fn into_input(self) -> StageInput {
        StageInput {
            voltages: self.voltages,
            counts: self.counts,
        }
    }
}

/// Metadata used for chaining stages and telemetry.
#[derive(Debug, Clone, Default)]
pub struct StageMetadata {
    pub gradient: Option<Vec<f64>>,
    pub plateau: Option<PlateauRegion>,
    pub notes: Vec<String>,
}

/// Common error type for the analysis pipeline.
#[derive(thiserror::Error, Debug)]
pub enum AnalysisError {
    #[error("invalid input: {0}")]
    Input(String),
    #[error("interpolation failed: {0}")]
    Interpolation(String),
    #[error("smoothing failed: {0}")]
    Smoothing(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("plateau start {plateau_start} lies after breakdown start {breakdown_start}")]
    Inconsistent {
        plateau_start: usize,
        breakdown_start: usize,
    },
    #[error("internal failure: {0}")]
    Internal(String),
}

pub type StageResult<T> = Result<T, AnalysisError>;

/// Trait describing the sequential curve-processing stages.
pub trait ProcessingStage {
    fn initialize(&mut self, config: &AnalysisConfig) -> StageResult<()>;
    fn execute(&mut self, input: StageInput) -> StageResult<StageOutput>;
    fn cleanup(&mut self);
}
