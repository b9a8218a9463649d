use geigercore::interface::PlateauAnalysis;
use serde::{Deserialize, Serialize};

/// Condensed per-run record written to the run log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportModel {
    pub source: String,
    pub operating_voltage: f64,
    pub plateau_start_voltage: f64,
    pub breakdown_start_voltage: f64,
    pub plateau_width: f64,
    pub plateau_detected: bool,
    pub breakdown_detected: bool,
    pub start_threshold: f64,
    pub end_threshold: f64,
}

impl ReportModel {
    pub fn from_analysis(source: &str, analysis: &PlateauAnalysis) -> Self {
        let plateau = &analysis.plateau;
        Self {
            source: source.to_string(),
            operating_voltage: plateau.operating_voltage,
            plateau_start_voltage: plateau.plateau_start_voltage,
            breakdown_start_voltage: plateau.breakdown_start_voltage,
            plateau_width: plateau.width_volts(),
            plateau_detected: plateau.plateau_detected,
            breakdown_detected: plateau.breakdown_detected,
            start_threshold: analysis.config.start_threshold,
            end_threshold: analysis.config.end_threshold,
        }
    }

    pub fn to_log_line(&self) -> String {
        format!(
            "source={} operating_voltage={:.2} plateau_start={:.2} breakdown_start={:.2} \
             width={:.2} plateau_detected={} breakdown_detected={} thresholds={}/{}\n",
            self.source,
            self.operating_voltage,
            self.plateau_start_voltage,
            self.breakdown_start_voltage,
            self.plateau_width,
            self.plateau_detected,
            self.breakdown_detected,
            self.start_threshold,
            self.end_threshold
        )
    }
}
