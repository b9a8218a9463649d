use serde::{Deserialize, Serialize};

use crate::interface::samples::SampleSet;
use crate::prelude::{AnalysisConfig, AnalysisError, StageResult};

/// Detected plateau: an index range into the interpolated curve plus the
/// voltages it maps to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlateauRegion {
    pub plateau_start: usize,
    pub breakdown_start: usize,
    pub midpoint_index: usize,
    pub plateau_start_voltage: f64,
    pub breakdown_start_voltage: f64,
    pub operating_voltage: f64,
    /// False when no slope fell below the start threshold and the scan fell
    /// back to index 0.
    pub plateau_detected: bool,
    /// False when no slope rose above the end threshold and the scan fell
    /// back to the last index.
    pub breakdown_detected: bool,
}

impl PlateauRegion {
    pub fn new(
        plateau_start: usize,
        breakdown_start: usize,
        voltages: &[f64],
        plateau_detected: bool,
        breakdown_detected: bool,
    ) -> StageResult<Self> {
        if plateau_start > breakdown_start {
            return Err(AnalysisError::Inconsistent {
                plateau_start,
                breakdown_start,
            });
        }
        if breakdown_start >= voltages.len() {
            return Err(AnalysisError::Internal(format!(
                "breakdown index {} outside curve of {} points",
                breakdown_start,
                voltages.len()
            )));
        }

        let midpoint_index = (plateau_start + breakdown_start) / 2;
        Ok(Self {
            plateau_start,
            breakdown_start,
            midpoint_index,
            plateau_start_voltage: voltages[plateau_start],
            breakdown_start_voltage: voltages[breakdown_start],
            operating_voltage: voltages[midpoint_index],
            plateau_detected,
            breakdown_detected,
        })
    }

    pub fn width_points(&self) -> usize {
        self.breakdown_start - self.plateau_start
    }

    pub fn width_volts(&self) -> f64 {
        self.breakdown_start_voltage - self.plateau_start_voltage
    }
}

/// Complete result of one analysis run, curves included, so callers can
/// report or chart it without recomputing anything.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlateauAnalysis {
    pub config: AnalysisConfig,
    pub samples: SampleSet,
    pub voltages: Vec<f64>,
    pub interpolated: Vec<f64>,
    pub smoothed: Vec<f64>,
    pub gradient: Vec<f64>,
    pub plateau: PlateauRegion,
    pub notes: Vec<String>,
}

impl PlateauAnalysis {
    pub fn operating_voltage(&self) -> f64 {
        self.plateau.operating_voltage
    }

    pub fn summary_line(&self) -> String {
        format!(
            "Estimated Operating Voltage: {:.2} V",
            self.operating_voltage()
        )
    }

    pub fn plateau_line(&self) -> String {
        format!(
            "Plateau {:.2} V -> {:.2} V ({:.2} V wide), operating point {:.2} V",
            self.plateau.plateau_start_voltage,
            self.plateau.breakdown_start_voltage,
            self.plateau.width_volts(),
            self.plateau.operating_voltage
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_midpoint_uses_floor_division() {
        let voltages = [10.0, 20.0, 30.0, 40.0, 50.0];
        let region = PlateauRegion::new(1, 4, &voltages, true, true).unwrap();
        assert_eq!(region.midpoint_index, 2);
        assert_eq!(region.operating_voltage, 30.0);
        assert_eq!(region.width_points(), 3);
        assert_eq!(region.width_volts(), 30.0);
    }

    #[test]
    fn region_rejects_inverted_range() {
        let voltages = [10.0, 20.0, 30.0];
        let err = PlateauRegion::new(2, 1, &voltages, true, true).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Inconsistent {
                plateau_start: 2,
                breakdown_start: 1
            }
        ));
    }

    #[test]
    fn region_rejects_out_of_range_index() {
        let voltages = [10.0, 20.0];
        assert!(PlateauRegion::new(0, 2, &voltages, true, false).is_err());
    }

    #[test]
    fn plateau_line_names_each_voltage_once() {
        let voltages = vec![100.0, 200.0, 300.0, 400.0, 500.0];
        let plateau = PlateauRegion::new(1, 3, &voltages, true, true).unwrap();
        let analysis = PlateauAnalysis {
            config: AnalysisConfig::new(5.0, 5.0),
            samples: SampleSet::new(voltages.clone(), vec![1.0, 2.0, 2.0, 2.0, 9.0]).unwrap(),
            voltages,
            interpolated: Vec::new(),
            smoothed: Vec::new(),
            gradient: Vec::new(),
            plateau,
            notes: Vec::new(),
        };
        let line = analysis.plateau_line();
        assert_eq!(
            line,
            "Plateau 200.00 V -> 400.00 V (200.00 V wide), operating point 300.00 V"
        );
        assert_eq!(line.matches("400.00 V").count(), 1);
    }

    #[test]
    fn zero_width_region_is_allowed() {
        let voltages = [10.0, 20.0, 30.0];
        let region = PlateauRegion::new(1, 1, &voltages, true, true).unwrap();
        assert_eq!(region.operating_voltage, 20.0);
        assert_eq!(region.width_points(), 0);
    }
}
