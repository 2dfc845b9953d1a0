//! Local FRED CSV directory source.
//!
//! Each `<ID>.csv` holds a date column followed by exactly one value column,
//! as FRED's download page produces them:
//!
//! ```text
//! observation_date,UNRATE
//! 2020-01-01,3.5
//! 2020-02-01,.
//! ```
//!
//! Blank and `.` values mark missing observations and are dropped.

use crate::domain::error::ExplorerError;
use crate::domain::series::{parse_date, DateRange, Observation, Series};
use crate::ports::source_port::ObservationSource;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn csv_path(&self, series_id: &str) -> PathBuf {
        self.base_path.join(Self::file_name(series_id))
    }

    pub fn file_name(series_id: &str) -> String {
        format!("{}.csv", series_id)
    }

    fn parse_file(path: &Path, series_id: &str) -> Result<Series, ExplorerError> {
        let content = fs::read_to_string(path)?;
        let mut rdr = csv::Reader::from_reader(content.as_bytes());

        let headers = rdr.headers().map_err(|e| ExplorerError::Source {
            reason: format!("{}: CSV header error: {}", path.display(), e),
        })?;
        if headers.len() != 2 {
            return Err(ExplorerError::Source {
                reason: format!(
                    "{}: expected one value column, found {}",
                    path.display(),
                    headers.len().saturating_sub(1)
                ),
            });
        }
        if headers.get(1) != Some(series_id) {
            debug!(file = %path.display(), column = ?headers.get(1), series = series_id, "renaming value column");
        }

        let mut observations = Vec::new();
        for (line, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| ExplorerError::Source {
                reason: format!("{}: CSV parse error: {}", path.display(), e),
            })?;

            let raw_date = record.get(0).unwrap_or_default();
            let date = parse_date(raw_date).map_err(|e| ExplorerError::Source {
                reason: format!("{} row {}: invalid date '{}': {}", path.display(), line + 2, raw_date, e),
            })?;

            let raw_value = record.get(1).unwrap_or_default().trim();
            if raw_value.is_empty() || raw_value == "." {
                continue;
            }
            let value: f64 = raw_value.parse().map_err(|e| ExplorerError::Source {
                reason: format!("{} row {}: invalid value '{}': {}", path.display(), line + 2, raw_value, e),
            })?;

            observations.push(Observation::new(date, value));
        }

        Ok(Series::new(series_id, observations))
    }
}

impl ObservationSource for CsvAdapter {
    fn available_series(&self) -> Result<Vec<String>, ExplorerError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| ExplorerError::Source {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(id) = name_str.strip_suffix(".csv") {
                ids.push(id.to_string());
            }
        }

        ids.sort();
        Ok(ids)
    }

    fn fetch_observations(
        &self,
        series_id: &str,
        range: &DateRange,
    ) -> Result<Option<Series>, ExplorerError> {
        let path = self.csv_path(series_id);
        if !path.is_file() {
            debug!(file = %path.display(), "no CSV for series");
            return Ok(None);
        }

        let series = Self::parse_file(&path, series_id)?.slice(range);
        Ok((!series.is_empty()).then_some(series))
    }
}
