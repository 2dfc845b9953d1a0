//! FRED HTTP API source.
//!
//! Talks to `series/observations` and `category/series` with a blocking
//! `reqwest` client. Transient failures (429 and 5xx gateway statuses, plus
//! transport errors) are retried with exponential backoff. A 400 from FRED
//! means the series id is unknown and is reported as "no data".

use std::thread;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::domain::error::ExplorerError;
use crate::domain::series::{format_date, parse_date, DateRange, Observation, Series};
use crate::ports::config_port::ConfigPort;
use crate::ports::source_port::ObservationSource;

pub const DEFAULT_BASE_URL: &str = "https://api.stlouisfed.org/fred/";
pub const API_KEY_ENV: &str = "FRED_API_KEY";

const MISSING_VALUE: &str = ".";
const MAX_BACKOFF: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq)]
pub struct FredSettings {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub backoff: Duration,
    /// Category listed by `available_series` ("Monetary Data" by default).
    pub category_id: u64,
    pub limit: u64,
}

impl FredSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(15),
            max_retries: 4,
            backoff: Duration::from_millis(500),
            category_id: 329,
            limit: 100,
        }
    }

    /// Read the `[fred]` section. The API key falls back to `FRED_API_KEY`.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, ExplorerError> {
        let api_key = config
            .get_string("fred", "api_key")
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok().filter(|k| !k.trim().is_empty()))
            .ok_or_else(|| ExplorerError::ConfigMissing {
                section: "fred".into(),
                key: "api_key".into(),
            })?;

        let max_retries = u32::try_from(config.get_positive("fred", "max_retries", 4)?)
            .map_err(|e| ExplorerError::ConfigInvalid {
                section: "fred".into(),
                key: "max_retries".into(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            api_key,
            base_url: config.get_string_or("fred", "base_url", DEFAULT_BASE_URL),
            timeout: Duration::from_secs(config.get_positive("fred", "timeout_secs", 15)?),
            max_retries,
            backoff: Duration::from_millis(config.get_positive("fred", "backoff_ms", 500)?),
            category_id: config.get_positive("fred", "category_id", 329)?,
            limit: config.get_positive("fred", "limit", 100)?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    #[serde(default)]
    observations: Vec<RawObservation>,
}

#[derive(Debug, Deserialize)]
struct RawObservation {
    date: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct CategorySeriesResponse {
    #[serde(default, alias = "series")]
    seriess: Vec<SeriesEntry>,
}

#[derive(Debug, Deserialize)]
struct SeriesEntry {
    id: String,
}

pub struct FredClient {
    client: Client,
    settings: FredSettings,
}

impl FredClient {
    pub fn new(settings: FredSettings) -> Result<Self, ExplorerError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| ExplorerError::Source {
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client, settings })
    }

    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, ExplorerError> {
        Self::new(FredSettings::from_config(config)?)
    }

    pub fn settings(&self) -> &FredSettings {
        &self.settings
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.settings.base_url.trim_end_matches('/'), endpoint)
    }

    /// GET `endpoint` and decode the JSON body. `Ok(None)` on HTTP 400.
    fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<Option<T>, ExplorerError> {
        let url = self.url(endpoint);
        let mut query: Vec<(&str, String)> = vec![
            ("api_key", self.settings.api_key.clone()),
            ("file_type", "json".to_string()),
        ];
        query.extend(params.iter().cloned());

        let mut attempt = 0;
        loop {
            debug!(%url, attempt, "FRED GET");
            let failure = match self.client.get(&url).query(&query).send() {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response.json::<T>().map(Some).map_err(|e| {
                            ExplorerError::Source {
                                reason: format!("invalid FRED response from {endpoint}: {e}"),
                            }
                        });
                    }
                    if status == StatusCode::BAD_REQUEST {
                        warn!(endpoint, "FRED returned 400, treating as no data");
                        return Ok(None);
                    }
                    if !is_retryable(status) {
                        return Err(ExplorerError::Source {
                            reason: format!("FRED HTTP {status} for {endpoint}"),
                        });
                    }
                    format!("HTTP {status}")
                }
                Err(e) => format!("network error: {e}"),
            };

            if attempt >= self.settings.max_retries {
                return Err(ExplorerError::Source {
                    reason: format!(
                        "FRED {endpoint} failed after {} attempts: {failure}",
                        attempt + 1
                    ),
                });
            }

            let delay = backoff_delay(self.settings.backoff, attempt);
            warn!(endpoint, attempt, ?delay, %failure, "retrying FRED request");
            thread::sleep(delay);
            attempt += 1;
        }
    }
}

/// `base * 2^attempt`, capped at `MAX_BACKOFF`.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    2u32.checked_pow(attempt)
        .and_then(|factor| base.checked_mul(factor))
        .map_or(MAX_BACKOFF, |delay| delay.min(MAX_BACKOFF))
}

fn is_retryable(status: StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503 | 504)
}

fn parse_observations(
    series_id: &str,
    raw: Vec<RawObservation>,
) -> Result<Series, ExplorerError> {
    let mut observations = Vec::with_capacity(raw.len());
    for obs in raw {
        let value = obs.value.trim();
        if value == MISSING_VALUE || value.is_empty() {
            continue;
        }
        let date = parse_date(&obs.date).map_err(|e| ExplorerError::Source {
            reason: format!("{series_id}: invalid date '{}': {e}", obs.date),
        })?;
        let value: f64 = value.parse().map_err(|e| ExplorerError::Source {
            reason: format!("{series_id}: invalid value '{value}' on {}: {e}", obs.date),
        })?;
        observations.push(Observation::new(date, value));
    }
    Ok(Series::new(series_id, observations))
}

impl ObservationSource for FredClient {
    fn available_series(&self) -> Result<Vec<String>, ExplorerError> {
        info!(
            category = self.settings.category_id,
            limit = self.settings.limit,
            "fetching FRED series list"
        );
        let params = [
            ("category_id", self.settings.category_id.to_string()),
            ("limit", self.settings.limit.to_string()),
        ];
        let response: Option<CategorySeriesResponse> = self.get_json("category/series", &params)?;
        Ok(response
            .map(|r| r.seriess.into_iter().map(|s| s.id).collect())
            .unwrap_or_default())
    }

    fn fetch_observations(
        &self,
        series_id: &str,
        range: &DateRange,
    ) -> Result<Option<Series>, ExplorerError> {
        let mut params = vec![("series_id", series_id.to_string())];
        if let Some(start) = range.start {
            params.push(("observation_start", format_date(start)));
        }
        if let Some(end) = range.end {
            params.push(("observation_end", format_date(end)));
        }

        let Some(response) =
            self.get_json::<ObservationsResponse>("series/observations", &params)?
        else {
            return Ok(None);
        };

        let series = parse_observations(series_id, response.observations)?;
        Ok((!series.is_empty()).then_some(series))
    }
}
