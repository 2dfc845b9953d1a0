//! Frequency resampling by last value per period.
//!
//! Each period is labeled by its end date: days end on themselves, weeks on
//! Sunday, months, quarters and years on their last calendar day. The final
//! period is labeled no later than the last input observation, so a trailing
//! partial period carries the date of the data it actually holds.

use chrono::{Datelike, Days, NaiveDate};
use std::fmt;
use std::str::FromStr;

use crate::domain::error::ExplorerError;
use crate::domain::series::{Observation, Series};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResampleRule {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Annual,
}

impl ResampleRule {
    /// End date of the period containing `date`.
    pub fn period_end(self, date: NaiveDate) -> NaiveDate {
        match self {
            ResampleRule::Daily => date,
            ResampleRule::Weekly => {
                let to_sunday = 7 - date.weekday().number_from_monday();
                date.checked_add_days(Days::new(u64::from(to_sunday)))
                    .unwrap_or(date)
            }
            ResampleRule::Monthly => last_day_of_month(date.year(), date.month()).unwrap_or(date),
            ResampleRule::Quarterly => {
                let quarter_end_month = date.month0() / 3 * 3 + 3;
                last_day_of_month(date.year(), quarter_end_month).unwrap_or(date)
            }
            ResampleRule::Annual => last_day_of_month(date.year(), 12).unwrap_or(date),
        }
    }
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

impl FromStr for ResampleRule {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "d" | "daily" => Ok(ResampleRule::Daily),
            "w" | "weekly" => Ok(ResampleRule::Weekly),
            "m" | "monthly" => Ok(ResampleRule::Monthly),
            "q" | "quarterly" => Ok(ResampleRule::Quarterly),
            "a" | "annual" | "yearly" => Ok(ResampleRule::Annual),
            other => Err(ExplorerError::invalid(format!(
                "unknown resample rule '{other}' (expected d, w, m, q or a)"
            ))),
        }
    }
}

impl fmt::Display for ResampleRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResampleRule::Daily => "daily",
            ResampleRule::Weekly => "weekly",
            ResampleRule::Monthly => "monthly",
            ResampleRule::Quarterly => "quarterly",
            ResampleRule::Annual => "annual",
        };
        f.write_str(name)
    }
}

/// Keep the last observation of every non-empty period, dated at the period end.
pub fn resample(series: &Series, rule: ResampleRule) -> Series {
    let Some(last_date) = series.last().map(|o| o.date) else {
        return series.clone();
    };

    let mut out: Vec<Observation> = Vec::new();
    let mut current: Option<(NaiveDate, f64)> = None;

    for obs in series.observations() {
        let boundary = rule.period_end(obs.date);
        match current {
            Some((end, _)) if end == boundary => current = Some((end, obs.value)),
            Some((end, value)) => {
                out.push(Observation::new(end, value));
                current = Some((boundary, obs.value));
            }
            None => current = Some((boundary, obs.value)),
        }
    }

    if let Some((end, value)) = current {
        out.push(Observation::new(end.min(last_date), value));
    }

    Series::from_ordered(series.name().to_string(), out)
}
