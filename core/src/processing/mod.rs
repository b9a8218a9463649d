pub mod interpolation;
pub mod pipeline;
pub mod slope;
pub mod smoothing;

pub use interpolation::InterpolationStage;
pub use pipeline::{determine_operating_voltage, PlateauAnalyzer};
pub use slope::SlopeStage;
pub use smoothing::SmoothingStage;
