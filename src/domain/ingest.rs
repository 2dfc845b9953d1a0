//! Loading series from an observation source into the store.
//!
//! Series that are already cataloged are left alone; series the source has
//! no data for are skipped. A failure on one series never aborts the batch.

use std::collections::HashSet;

use tracing::{info, warn};

use crate::domain::error::ExplorerError;
use crate::domain::series::DateRange;
use crate::ports::series_port::SeriesPort;
use crate::ports::source_port::ObservationSource;

/// Indicators loaded by `fetch` when no series are named.
pub const DEFAULT_SERIES: &[&str] = &[
    "UNRATE",
    "CPIAUCSL",
    "DFF",
    "GDP",
    "FEDFUNDS",
    "INDPRO",
    "PAYEMS",
    "CSUSHPISA",
    "T10YFFM",
    "DGS10",
    "MORTGAGE30US",
    "VIXCLS",
    "DCOILWTICO",
    "DCOILBRENTEU",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SeriesListError {
    #[error("empty token in series list")]
    EmptyToken,

    #[error("duplicate series: {0}")]
    Duplicate(String),
}

/// Parse a comma-separated list of series ids, upper-casing each one.
pub fn parse_series_ids(input: &str) -> Result<Vec<String>, SeriesListError> {
    let mut ids = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(SeriesListError::EmptyToken);
        }
        let id = trimmed.to_uppercase();
        if !seen.insert(id.clone()) {
            return Err(SeriesListError::Duplicate(id));
        }
        ids.push(id);
    }

    Ok(ids)
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    AlreadyCataloged,
    NoData,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSeries {
    pub series_id: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    /// `(series id, observations written)` for every series stored.
    pub loaded: Vec<(String, usize)>,
    pub skipped: Vec<SkippedSeries>,
}

impl IngestReport {
    pub fn rows_written(&self) -> usize {
        self.loaded.iter().map(|(_, n)| n).sum()
    }

    pub fn failures(&self) -> usize {
        self.skipped
            .iter()
            .filter(|s| matches!(s.reason, SkipReason::Failed(_)))
            .count()
    }

    fn skip(&mut self, series_id: &str, reason: SkipReason) {
        self.skipped.push(SkippedSeries {
            series_id: series_id.to_string(),
            reason,
        });
    }
}

/// Copy each of `series_ids` from `source` into `store`.
///
/// `file_name` derives the catalog's file column from a series id; sources
/// without files pass `|_| None`.
pub fn ingest_series(
    source: &dyn ObservationSource,
    store: &dyn SeriesPort,
    series_ids: &[String],
    file_name: impl Fn(&str) -> Option<String>,
) -> IngestReport {
    let mut report = IngestReport::default();

    for id in series_ids {
        match store.series_exists(id) {
            Ok(true) => {
                info!(series = %id, "already cataloged, skipping");
                report.skip(id, SkipReason::AlreadyCataloged);
                continue;
            }
            Ok(false) => {}
            Err(e) => {
                warn!(series = %id, error = %e, "catalog lookup failed");
                report.skip(id, SkipReason::Failed(e.to_string()));
                continue;
            }
        }

        match load_one(source, store, id, file_name(id).as_deref()) {
            Ok(Some(rows)) => {
                info!(series = %id, rows, "loaded");
                report.loaded.push((id.clone(), rows));
            }
            Ok(None) => {
                warn!(series = %id, "no data from source, skipping");
                report.skip(id, SkipReason::NoData);
            }
            Err(e) => {
                warn!(series = %id, error = %e, "ingest failed");
                report.skip(id, SkipReason::Failed(e.to_string()));
            }
        }
    }

    report
}

fn load_one(
    source: &dyn ObservationSource,
    store: &dyn SeriesPort,
    id: &str,
    file_name: Option<&str>,
) -> Result<Option<usize>, ExplorerError> {
    match source.fetch_observations(id, &DateRange::all())? {
        Some(series) if !series.is_empty() => store.store_series(&series, file_name).map(Some),
        _ => Ok(None),
    }
}
