#![allow(dead_code)]

use chrono::{Days, NaiveDate};
use finexplorer::domain::error::ExplorerError;
use finexplorer::domain::series::{DateRange, Observation, Series};
use finexplorer::ports::config_port::ConfigPort;
use finexplorer::ports::series_port::SeriesPort;
use finexplorer::ports::source_port::ObservationSource;
use std::collections::HashMap;
use std::sync::Mutex;

pub struct MockSeriesPort {
    pub data: Mutex<HashMap<String, Series>>,
    pub errors: HashMap<String, String>,
}

impl MockSeriesPort {
    pub fn new() -> Self {
        Self {
            data: Mutex::new(HashMap::new()),
            errors: HashMap::new(),
        }
    }

    pub fn with_series(self, series: Series) -> Self {
        self.data
            .lock()
            .unwrap()
            .insert(series.name().to_string(), series);
        self
    }

    pub fn with_error(mut self, name: &str, reason: &str) -> Self {
        self.errors.insert(name.to_string(), reason.to_string());
        self
    }

    pub fn stored(&self, name: &str) -> Option<Series> {
        self.data.lock().unwrap().get(name).cloned()
    }

    fn check_error(&self, name: &str) -> Result<(), ExplorerError> {
        match self.errors.get(name) {
            Some(reason) => Err(ExplorerError::DatabaseQuery {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl SeriesPort for MockSeriesPort {
    fn fetch_series(&self, name: &str, range: &DateRange) -> Result<Series, ExplorerError> {
        self.check_error(name)?;
        self.data
            .lock()
            .unwrap()
            .get(name)
            .map(|s| s.slice(range))
            .ok_or_else(|| ExplorerError::NotFound {
                series: name.to_string(),
            })
    }

    fn list_series(&self) -> Result<Vec<String>, ExplorerError> {
        let mut names: Vec<String> = self.data.lock().unwrap().keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn series_exists(&self, name: &str) -> Result<bool, ExplorerError> {
        self.check_error(name)?;
        Ok(self.data.lock().unwrap().contains_key(name))
    }

    fn data_range(&self, name: &str) -> Result<Option<(NaiveDate, NaiveDate, usize)>, ExplorerError> {
        self.check_error(name)?;
        Ok(self.data.lock().unwrap().get(name).and_then(|s| {
            Some((s.first()?.date, s.last()?.date, s.len()))
        }))
    }

    fn store_series(&self, series: &Series, _file_name: Option<&str>) -> Result<usize, ExplorerError> {
        self.check_error(series.name())?;
        self.data
            .lock()
            .unwrap()
            .insert(series.name().to_string(), series.clone());
        Ok(series.len())
    }

    fn health_check(&self) -> Result<(), ExplorerError> {
        match self.errors.get("__health__") {
            Some(reason) => Err(ExplorerError::Database {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// In-memory observation source keyed by series id.
pub struct MockSource {
    pub series: HashMap<String, Series>,
    pub failing: HashMap<String, String>,
}

impl MockSource {
    pub fn new() -> Self {
        Self {
            series: HashMap::new(),
            failing: HashMap::new(),
        }
    }

    pub fn with_series(mut self, series: Series) -> Self {
        self.series.insert(series.name().to_string(), series);
        self
    }

    pub fn with_failure(mut self, id: &str, reason: &str) -> Self {
        self.failing.insert(id.to_string(), reason.to_string());
        self
    }
}

impl ObservationSource for MockSource {
    fn available_series(&self) -> Result<Vec<String>, ExplorerError> {
        let mut ids: Vec<String> = self.series.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    fn fetch_observations(
        &self,
        series_id: &str,
        range: &DateRange,
    ) -> Result<Option<Series>, ExplorerError> {
        if let Some(reason) = self.failing.get(series_id) {
            return Err(ExplorerError::Source {
                reason: reason.clone(),
            });
        }
        Ok(self
            .series
            .get(series_id)
            .map(|s| s.slice(range))
            .filter(|s| !s.is_empty()))
    }
}

pub struct MockConfigPort {
    pub default_window: Option<i64>,
}

impl ConfigPort for MockConfigPort {
    fn get_string(&self, _section: &str, _key: &str) -> Option<String> {
        None
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        match (section, key, self.default_window) {
            ("api", "default_window", Some(w)) => w,
            _ => default,
        }
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// `values.len()` consecutive daily observations starting at `start`.
pub fn daily_series(name: &str, start: &str, values: &[f64]) -> Series {
    let start = date(start);
    let observations = values
        .iter()
        .enumerate()
        .map(|(i, v)| Observation::new(start + Days::new(i as u64), *v))
        .collect();
    Series::new(name, observations)
}

/// Daily series whose values are `f(i)` for `i` in `0..n`.
pub fn generated_series(name: &str, start: &str, n: usize, f: impl Fn(usize) -> f64) -> Series {
    let values: Vec<f64> = (0..n).map(f).collect();
    daily_series(name, start, &values)
}
