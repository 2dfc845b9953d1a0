//! Series normalization.

use std::fmt;
use std::str::FromStr;

use crate::domain::error::ExplorerError;
use crate::domain::series::Series;

pub const INDEX_BASE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeMethod {
    /// Rebase so the first observation equals 100.
    Index100,
}

impl FromStr for NormalizeMethod {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "index_100" => Ok(NormalizeMethod::Index100),
            other => Err(ExplorerError::UnsupportedMethod {
                method: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for NormalizeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizeMethod::Index100 => f.write_str("index_100"),
        }
    }
}

/// Normalize `series` with the method named by `method`.
///
/// Fails with `UnsupportedMethod` for an unknown token, `EmptyInput` for an
/// empty series and `DegenerateInput` when the base value is zero.
pub fn normalize(series: &Series, method: &str) -> Result<Series, ExplorerError> {
    let method: NormalizeMethod = method.parse()?;
    normalize_with(series, method)
}

pub fn normalize_with(series: &Series, method: NormalizeMethod) -> Result<Series, ExplorerError> {
    match method {
        NormalizeMethod::Index100 => index_to(series, INDEX_BASE),
    }
}

fn index_to(series: &Series, base: f64) -> Result<Series, ExplorerError> {
    let first = series.first().ok_or(ExplorerError::EmptyInput)?.value;
    if first == 0.0 {
        return Err(ExplorerError::DegenerateInput {
            reason: "cannot index to 100 from a zero base".into(),
        });
    }
    Ok(series.map_values(|v| v / first * base))
}
