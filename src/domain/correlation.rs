//! Rolling Pearson correlation between two date-aligned series.
//!
//! The two inputs are inner-joined on date, then a trailing window of
//! `window` joined pairs is slid across the result. The first `window - 1`
//! joined dates produce no output. A window where either side is constant has
//! no defined coefficient and yields `None` at that date.

use chrono::NaiveDate;
use std::cmp::Ordering;

use crate::domain::error::ExplorerError;
use crate::domain::series::Series;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JoinedPoint {
    pub date: NaiveDate,
    pub a: f64,
    pub b: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrelationPoint {
    pub date: NaiveDate,
    pub coefficient: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationSeries {
    pub window: usize,
    pub points: Vec<CorrelationPoint>,
}

impl CorrelationSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Drop dates whose coefficient is undefined.
    pub fn drop_undefined(self) -> CorrelationSeries {
        CorrelationSeries {
            window: self.window,
            points: self
                .points
                .into_iter()
                .filter(|p| p.coefficient.is_some())
                .collect(),
        }
    }

    /// `(date, coefficient)` for every defined point.
    pub fn defined(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.points
            .iter()
            .filter_map(|p| p.coefficient.map(|c| (p.date, c)))
    }

    /// Column label used when the series is published.
    pub fn label(&self) -> String {
        format!("Rolling Correlation (Window={})", self.window)
    }
}

/// Dates present in both series, ascending, paired with each side's value.
pub fn inner_join(a: &Series, b: &Series) -> Vec<JoinedPoint> {
    let (a, b) = (a.observations(), b.observations());
    let mut joined = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        match a[i].date.cmp(&b[j].date) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                joined.push(JoinedPoint {
                    date: a[i].date,
                    a: a[i].value,
                    b: b[j].value,
                });
                i += 1;
                j += 1;
            }
        }
    }

    joined
}

pub fn rolling_correlation(
    a: &Series,
    b: &Series,
    window: usize,
) -> Result<CorrelationSeries, ExplorerError> {
    if window <= 1 {
        return Err(ExplorerError::invalid(format!(
            "window must be >1, got {window}"
        )));
    }

    let joined = inner_join(a, b);
    if joined.is_empty() {
        return Err(ExplorerError::InsufficientData {
            reason: format!("{} and {} share no dates", a.name(), b.name()),
        });
    }

    let points = joined
        .windows(window)
        .map(|win| CorrelationPoint {
            date: win[window - 1].date,
            coefficient: pearson(win),
        })
        .collect();

    Ok(CorrelationSeries { window, points })
}

/// Sample Pearson coefficient over one window; the N-1 factors cancel.
fn pearson(win: &[JoinedPoint]) -> Option<f64> {
    if is_constant(win.iter().map(|p| p.a)) || is_constant(win.iter().map(|p| p.b)) {
        return None;
    }

    let n = win.len() as f64;
    let mean_a = win.iter().map(|p| p.a).sum::<f64>() / n;
    let mean_b = win.iter().map(|p| p.b).sum::<f64>() / n;

    let (mut sab, mut saa, mut sbb) = (0.0, 0.0, 0.0);
    for p in win {
        let da = p.a - mean_a;
        let db = p.b - mean_b;
        sab += da * db;
        saa += da * da;
        sbb += db * db;
    }

    let denom = saa.sqrt() * sbb.sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return None;
    }
    Some((sab / denom).clamp(-1.0, 1.0))
}

fn is_constant(mut values: impl Iterator<Item = f64>) -> bool {
    match values.next() {
        Some(first) => values.all(|v| v == first),
        None => true,
    }
}
