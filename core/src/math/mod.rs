pub mod calculus;
pub mod matrix;
pub mod savgol;
pub mod spline;
pub mod stats;

pub use calculus::DifferenceHelper;
pub use matrix::MatrixHelper;
pub use savgol::SavitzkyGolay;
pub use spline::CubicSpline;
pub use stats::StatsHelper;
