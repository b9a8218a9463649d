use anyhow::Context;
use geigercore::prelude::{
    AnalysisConfig, DEFAULT_INTERPOLATION_POINTS, DEFAULT_POLYORDER, DEFAULT_WINDOW_LENGTH,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::generator::profile::GeneratorConfig;

fn default_interpolation_points() -> usize {
    DEFAULT_INTERPOLATION_POINTS
}

fn default_window_length() -> usize {
    DEFAULT_WINDOW_LENGTH
}

fn default_polyorder() -> usize {
    DEFAULT_POLYORDER
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// CSV table with `V` and `C` columns; ignored when `synthetic` is set.
    #[serde(default)]
    pub data: Option<PathBuf>,
    pub start_threshold: f64,
    pub end_threshold: f64,
    #[serde(default = "default_interpolation_points")]
    pub interpolation_points: usize,
    #[serde(default = "default_window_length")]
    pub window_length: usize,
    #[serde(default = "default_polyorder")]
    pub polyorder: usize,
    #[serde(default)]
    pub synthetic: Option<GeneratorConfig>,
}

/// Command-line values that replace the matching workflow fields when set.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub start_threshold: Option<f64>,
    pub end_threshold: Option<f64>,
    pub interpolation_points: Option<usize>,
    pub window_length: Option<usize>,
    pub polyorder: Option<usize>,
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(
        start_threshold: f64,
        end_threshold: f64,
        interpolation_points: usize,
        window_length: usize,
        polyorder: usize,
    ) -> Self {
        Self {
            data: None,
            start_threshold,
            end_threshold,
            interpolation_points,
            window_length,
            polyorder,
            synthetic: None,
        }
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(start) = overrides.start_threshold {
            self.start_threshold = start;
        }
        if let Some(end) = overrides.end_threshold {
            self.end_threshold = end;
        }
        if let Some(points) = overrides.interpolation_points {
            self.interpolation_points = points;
        }
        if let Some(window) = overrides.window_length {
            self.window_length = window;
        }
        if let Some(order) = overrides.polyorder {
            self.polyorder = order;
        }
    }

    pub fn to_analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig::new(self.start_threshold, self.end_threshold)
            .with_interpolation_points(self.interpolation_points)
            .with_smoothing(self.window_length, self.polyorder)
    }
}
