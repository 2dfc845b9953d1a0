//! Observation and series representation.

use chrono::NaiveDate;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// A named, date-ordered sequence of observations.
///
/// Dates are strictly increasing. [`Series::new`] sorts its input and keeps
/// the last observation supplied for any repeated date, so every `Series`
/// value upholds the ordering regardless of where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    name: String,
    observations: Vec<Observation>,
}

impl Series {
    pub fn new(name: impl Into<String>, mut observations: Vec<Observation>) -> Self {
        // stable sort keeps supply order within a date so the dedup below keeps the latest
        observations.sort_by_key(|o| o.date);
        let mut deduped: Vec<Observation> = Vec::with_capacity(observations.len());
        for obs in observations {
            match deduped.last_mut() {
                Some(last) if last.date == obs.date => *last = obs,
                _ => deduped.push(obs),
            }
        }
        Self {
            name: name.into(),
            observations: deduped,
        }
    }

    pub fn from_pairs(name: impl Into<String>, pairs: &[(NaiveDate, f64)]) -> Self {
        Self::new(
            name,
            pairs.iter().map(|&(d, v)| Observation::new(d, v)).collect(),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first(&self) -> Option<&Observation> {
        self.observations.first()
    }

    pub fn last(&self) -> Option<&Observation> {
        self.observations.last()
    }

    pub fn values(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.value).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.observations.iter().map(|o| o.date).collect()
    }

    /// Observations falling inside `range`, as a new series under the same name.
    pub fn slice(&self, range: &DateRange) -> Series {
        Series {
            name: self.name.clone(),
            observations: self
                .observations
                .iter()
                .filter(|o| range.contains(o.date))
                .copied()
                .collect(),
        }
    }

    /// Same name, new values on the same dates.
    pub(crate) fn map_values(&self, f: impl Fn(f64) -> f64) -> Series {
        Series {
            name: self.name.clone(),
            observations: self
                .observations
                .iter()
                .map(|o| Observation::new(o.date, f(o.value)))
                .collect(),
        }
    }

    /// Build from observations already known to be strictly increasing.
    pub(crate) fn from_ordered(name: String, observations: Vec<Observation>) -> Series {
        debug_assert!(observations.windows(2).all(|w| w[0].date < w[1].date));
        Series { name, observations }
    }
}

/// Inclusive date bounds; either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|s| date >= s) && self.end.is_none_or(|e| date <= e)
    }
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(s: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
