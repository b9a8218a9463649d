use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::math::spline::MIN_SPLINE_KNOTS;
use crate::prelude::{AnalysisError, StageInput, StageResult};

pub const VOLTAGE_COLUMN: &str = "V";
pub const COUNT_COLUMN: &str = "C";

/// Measured calibration points, ordered by strictly increasing voltage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSampleSet")]
pub struct SampleSet {
    voltages: Vec<f64>,
    counts: Vec<f64>,
}

/// Unchecked wire form; deserialization goes through `SampleSet::new`.
#[derive(Deserialize)]
struct RawSampleSet {
    voltages: Vec<f64>,
    counts: Vec<f64>,
}

impl TryFrom<RawSampleSet> for SampleSet {
    type Error = AnalysisError;

    fn try_from(raw: RawSampleSet) -> StageResult<Self> {
        Self::new(raw.voltages, raw.counts)
    }
}

impl SampleSet {
    pub fn new(voltages: Vec<f64>, counts: Vec<f64>) -> StageResult<Self> {
        if voltages.len() != counts.len() {
            return Err(AnalysisError::Input(format!(
                "{} voltages but {} counts",
                voltages.len(),
                counts.len()
            )));
        }
        if voltages.len() < MIN_SPLINE_KNOTS {
            return Err(AnalysisError::Input(format!(
                "need at least {} samples, got {}",
                MIN_SPLINE_KNOTS,
                voltages.len()
            )));
        }
        if let Some(row) = voltages
            .iter()
            .zip(&counts)
            .position(|(v, c)| !v.is_finite() || !c.is_finite())
        {
            return Err(AnalysisError::Input(format!(
                "sample {} is not a finite number",
                row
            )));
        }
        if let Some(row) = voltages.windows(2).position(|pair| pair[1] <= pair[0]) {
            return Err(AnalysisError::Input(format!(
                "voltages must be strictly increasing: {} V is followed by {} V",
                voltages[row],
                voltages[row + 1]
            )));
        }
        Ok(Self { voltages, counts })
    }

    /// Reads a CSV table with a header row naming the `V` and `C` columns.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> StageResult<Self> {
        let path_ref = path.as_ref();
        let file = File::open(path_ref).map_err(|err| {
            AnalysisError::Input(format!("opening {}: {}", path_ref.display(), err))
        })?;
        Self::from_csv_reader(file)
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> StageResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|err| AnalysisError::Input(format!("reading header row: {}", err)))?
            .clone();
        let column = |name: &str| {
            headers.iter().position(|h| h == name).ok_or_else(|| {
                AnalysisError::Input(format!("required column '{}' is missing", name))
            })
        };
        let voltage_idx = column(VOLTAGE_COLUMN)?;
        let count_idx = column(COUNT_COLUMN)?;

        let mut voltages = Vec::new();
        let mut counts = Vec::new();
        for (row, record) in csv_reader.records().enumerate() {
            let record = record
                .map_err(|err| AnalysisError::Input(format!("reading row {}: {}", row + 1, err)))?;
            voltages.push(parse_cell(&record, voltage_idx, VOLTAGE_COLUMN, row)?);
            counts.push(parse_cell(&record, count_idx, COUNT_COLUMN, row)?);
        }

        Self::new(voltages, counts)
    }

    pub fn voltages(&self) -> &[f64] {
        &self.voltages
    }

    pub fn counts(&self) -> &[f64] {
        &self.counts
    }

    pub fn len(&self) -> usize {
        self.voltages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voltages.is_empty()
    }

    pub fn to_stage_input(&self) -> StageInput {
        StageInput {
            voltages: self.voltages.clone(),
            counts: self.counts.clone(),
        }
    }
}

fn parse_cell(record: &csv::StringRecord, idx: usize, name: &str, row: usize) -> StageResult<f64> {
    let raw = record.get(idx).unwrap_or("");
    raw.parse::<f64>().map_err(|_| {
        AnalysisError::Input(format!(
            "row {} column '{}': '{}' is not a number",
            row + 1,
            name,
            raw
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_reader_picks_named_columns() {
        let table = "run,C,V\n1,5,100\n2, 40 ,150\n3,42,200\n4,43,250\n";
        let samples = SampleSet::from_csv_reader(table.as_bytes()).unwrap();
        assert_eq!(samples.voltages(), &[100.0, 150.0, 200.0, 250.0]);
        assert_eq!(samples.counts(), &[5.0, 40.0, 42.0, 43.0]);
    }

    #[test]
    fn csv_reader_reports_missing_column() {
        let table = "V,counts\n100,5\n150,40\n200,42\n250,43\n";
        let err = SampleSet::from_csv_reader(table.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("'C'"));
    }

    #[test]
    fn csv_reader_reports_bad_value() {
        let table = "V,C\n100,5\n150,forty\n200,42\n250,43\n";
        let err = SampleSet::from_csv_reader(table.as_bytes()).unwrap_err();
        assert!(matches!(err, AnalysisError::Input(_)));
        assert!(err.to_string().contains("forty"));
    }

    #[test]
    fn missing_file_is_input_error() {
        let err = SampleSet::from_csv_path("/nonexistent/geiger.csv").unwrap_err();
        assert!(matches!(err, AnalysisError::Input(_)));
    }

    #[test]
    fn samples_must_increase() {
        let err = SampleSet::new(vec![100.0, 200.0, 150.0, 300.0], vec![1.0; 4]).unwrap_err();
        assert!(err.to_string().contains("strictly increasing"));
    }

    #[test]
    fn deserialization_applies_validation() {
        let empty = serde_json::from_str::<SampleSet>(r#"{"voltages":[],"counts":[]}"#);
        assert!(empty.is_err());

        let unordered = serde_json::from_str::<SampleSet>(
            r#"{"voltages":[1.0,3.0,2.0,4.0],"counts":[1.0,1.0,1.0,1.0]}"#,
        );
        assert!(unordered.unwrap_err().to_string().contains("strictly increasing"));

        let valid = SampleSet::new(vec![1.0, 2.0, 3.0, 4.0], vec![5.0, 6.0, 7.0, 8.0]).unwrap();
        let restored: SampleSet =
            serde_json::from_str(&serde_json::to_string(&valid).unwrap()).unwrap();
        assert_eq!(restored, valid);
    }

    #[test]
    fn samples_need_four_points() {
        assert!(SampleSet::new(vec![1.0, 2.0, 3.0], vec![1.0; 3]).is_err());
    }
}
