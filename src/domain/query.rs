//! Request orchestration: storage lookups around the transformations.
//!
//! These are the callers of the pure transformations. They decide what an
//! empty result or an unknown transform means for a request.

use tracing::warn;

use crate::domain::correlation::{rolling_correlation, CorrelationSeries};
use crate::domain::error::ExplorerError;
use crate::domain::normalize::normalize;
use crate::domain::resample::{resample, ResampleRule};
use crate::domain::series::{DateRange, Series};
use crate::ports::series_port::SeriesPort;

pub const DEFAULT_WINDOW: usize = 30;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesQuery {
    pub range: DateRange,
    pub frequency: Option<ResampleRule>,
    pub transform: Option<String>,
}

/// Apply a normalization token, passing the series through unchanged when
/// the method is not recognised.
pub fn apply_transform(series: Series, method: &str) -> Result<Series, ExplorerError> {
    match normalize(&series, method) {
        Ok(normalized) => Ok(normalized),
        Err(ExplorerError::UnsupportedMethod { method }) => {
            warn!(series = series.name(), %method, "unknown transform, returning series unchanged");
            Ok(series)
        }
        Err(e) => Err(e),
    }
}

/// Fetch, slice, resample and normalize one series.
pub fn run_series_query(
    port: &dyn SeriesPort,
    name: &str,
    query: &SeriesQuery,
) -> Result<Series, ExplorerError> {
    let series = port.fetch_series(name, &query.range)?;
    if series.is_empty() {
        return Err(ExplorerError::NoData {
            series: name.to_string(),
        });
    }

    let series = match query.frequency {
        Some(rule) => resample(&series, rule),
        None => series,
    };

    match query.transform.as_deref().filter(|t| !t.is_empty()) {
        Some(method) => apply_transform(series, method),
        None => Ok(series),
    }
}

/// Rolling correlation of two stored series over their full history.
///
/// Missing or empty series surface as `NoData`. Series that share no dates,
/// or leave no defined coefficient, surface as `ComputationFailed`.
pub fn run_correlation_query(
    port: &dyn SeriesPort,
    first: &str,
    second: &str,
    window: usize,
) -> Result<CorrelationSeries, ExplorerError> {
    if window <= 1 {
        return Err(ExplorerError::invalid("window must be >1"));
    }

    let a = fetch_non_empty(port, first)?;
    let b = fetch_non_empty(port, second)?;

    let correlation = match rolling_correlation(&a, &b, window) {
        Ok(correlation) => correlation.drop_undefined(),
        Err(ExplorerError::InsufficientData { reason }) => {
            return Err(ExplorerError::ComputationFailed { reason });
        }
        Err(e) => return Err(e),
    };
    if correlation.is_empty() {
        return Err(ExplorerError::ComputationFailed {
            reason: format!(
                "no defined correlation between {first} and {second} with window {window}"
            ),
        });
    }
    Ok(correlation)
}

fn fetch_non_empty(port: &dyn SeriesPort, name: &str) -> Result<Series, ExplorerError> {
    let missing = || ExplorerError::NoData {
        series: name.to_string(),
    };
    match port.fetch_series(name, &DateRange::all()) {
        Ok(series) if series.is_empty() => Err(missing()),
        Ok(series) => Ok(series),
        Err(ExplorerError::NotFound { .. }) => Err(missing()),
        Err(e) => Err(e),
    }
}
