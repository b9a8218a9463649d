pub mod plateau;
pub mod samples;

pub use plateau::{PlateauAnalysis, PlateauRegion};
pub use samples::SampleSet;
