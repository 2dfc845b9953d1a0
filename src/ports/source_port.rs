//! Upstream observation source port trait.

use crate::domain::error::ExplorerError;
use crate::domain::series::{DateRange, Series};

/// Somewhere series can be ingested from: a CSV directory, the FRED API.
pub trait ObservationSource {
    /// Series ids this source can offer.
    fn available_series(&self) -> Result<Vec<String>, ExplorerError>;

    /// `Ok(None)` when the source has nothing for `series_id`.
    fn fetch_observations(
        &self,
        series_id: &str,
        range: &DateRange,
    ) -> Result<Option<Series>, ExplorerError>;
}
