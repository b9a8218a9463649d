use crate::report::model::ReportModel;
use anyhow::{Context, Result};
use geigercore::interface::PlateauAnalysis;
use log::warn;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Console, JSON and run-log output for a finished analysis.
pub struct Reporter {
    source: String,
}

impl Reporter {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn publish(&self, analysis: &PlateauAnalysis) {
        println!("[{}] {}", self.source, analysis.plateau_line());
        let plateau = &analysis.plateau;
        if !plateau.plateau_detected {
            warn!(
                "no flat region found in {}; plateau start fell back to the first point",
                self.source
            );
        }
        if !plateau.breakdown_detected {
            warn!(
                "no breakdown found in {}; plateau runs to the last point",
                self.source
            );
        }
        println!("{}", analysis.summary_line());
    }

    pub fn export_json(&self, path: &Path, analysis: &PlateauAnalysis) -> Result<()> {
        ensure_parent(path)?;
        let file =
            File::create(path).with_context(|| format!("creating export {}", path.display()))?;
        serde_json::to_writer_pretty(file, analysis)
            .with_context(|| format!("writing export {}", path.display()))?;
        Ok(())
    }

    pub fn append_log(&self, path: &Path, analysis: &PlateauAnalysis) -> Result<()> {
        ensure_parent(path)?;
        let line = ReportModel::from_analysis(&self.source, analysis).to_log_line();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("opening run log {}", path.display()))?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::profile::{build_sample_set, GeneratorConfig};
    use crate::workflow::config::WorkflowConfig;
    use crate::workflow::runner::Runner;

    fn analysis() -> PlateauAnalysis {
        let runner = Runner::new(WorkflowConfig::from_args(5.0, 5.0, 500, 10, 3));
        let samples = build_sample_set(&GeneratorConfig::default()).unwrap();
        runner.execute(&samples).unwrap()
    }

    #[test]
    fn run_log_appends_one_line_per_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("runs.log");
        let reporter = Reporter::new("synthetic");
        let result = analysis();
        reporter.append_log(&path, &result).unwrap();
        reporter.append_log(&path, &result).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
        assert!(contents.starts_with("source=synthetic operating_voltage="));
    }

    #[test]
    fn json_export_round_trips_operating_voltage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analysis.json");
        let result = analysis();
        Reporter::new("synthetic").export_json(&path, &result).unwrap();

        let restored: PlateauAnalysis =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(restored.plateau.midpoint_index, result.plateau.midpoint_index);
        assert!((restored.operating_voltage() - result.operating_voltage()).abs() < 1e-9);
        assert_eq!(restored.smoothed.len(), result.smoothed.len());
    }

    #[test]
    fn report_model_copies_boundaries() {
        let result = analysis();
        let model = ReportModel::from_analysis("bench", &result);
        assert_eq!(model.operating_voltage, result.operating_voltage());
        assert!(model.to_log_line().contains("thresholds=5/5"));
    }
}
