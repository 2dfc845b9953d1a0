//! Series catalog and storage port trait.

use crate::domain::error::ExplorerError;
use crate::domain::series::{DateRange, Series};
use chrono::NaiveDate;

pub trait SeriesPort {
    /// Observations of `name` inside `range`, ascending by date.
    ///
    /// Fails with `NotFound` when `name` is not in the catalog. A cataloged
    /// series with no rows in `range` comes back empty.
    fn fetch_series(&self, name: &str, range: &DateRange) -> Result<Series, ExplorerError>;

    fn list_series(&self) -> Result<Vec<String>, ExplorerError>;

    fn series_exists(&self, name: &str) -> Result<bool, ExplorerError>;

    fn data_range(
        &self,
        name: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, ExplorerError>;

    /// Catalog `series` (idempotently) and insert its observations.
    /// Returns the number of observations written.
    fn store_series(&self, series: &Series, file_name: Option<&str>)
        -> Result<usize, ExplorerError>;

    fn health_check(&self) -> Result<(), ExplorerError>;
}
