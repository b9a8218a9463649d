//! Plateau detection for Geiger-Mueller tube calibration curves.
//!
//! Measured voltage/count samples are resampled with a cubic spline,
//! smoothed with a Savitzky-Golay filter and differentiated; the plateau is
//! the first flat stretch of the slope and the operating voltage its midpoint.

pub mod interface;
pub mod math;
pub mod prelude;
pub mod processing;
pub mod telemetry;

pub use interface::{PlateauAnalysis, PlateauRegion, SampleSet};
pub use prelude::{AnalysisConfig, AnalysisError, ProcessingStage, StageInput, StageOutput};
pub use processing::{determine_operating_voltage, PlateauAnalyzer};
