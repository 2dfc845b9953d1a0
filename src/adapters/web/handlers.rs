//! HTTP request handlers for the JSON API.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::sync::Arc;

use crate::domain::correlation::CorrelationSeries;
use crate::domain::error::ExplorerError;
use crate::domain::query::{run_correlation_query, run_series_query, SeriesQuery, DEFAULT_WINDOW};
use crate::domain::resample::ResampleRule;
use crate::domain::series::{format_date, parse_date, DateRange, Series};

use super::{AppState, WebError};

#[derive(Debug, Default, Deserialize)]
pub struct DataParams {
    pub start: Option<String>,
    pub end: Option<String>,
    pub frequency: Option<String>,
    pub transform: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CorrelationParams {
    pub series1: Option<String>,
    pub series2: Option<String>,
    pub window: Option<String>,
}

/// Query-string values arrive as `?start=`; treat blank like absent.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_bound(value: &Option<String>, name: &str) -> Result<Option<chrono::NaiveDate>, WebError> {
    present(value)
        .map(|raw| {
            parse_date(raw).map_err(|_| {
                WebError::bad_request(format!("Invalid {name} date '{raw}', expected YYYY-MM-DD"))
            })
        })
        .transpose()
}

fn record(date: chrono::NaiveDate, key: &str, value: f64) -> Value {
    let mut row = Map::new();
    row.insert("date".to_string(), Value::String(format_date(date)));
    row.insert(key.to_string(), json!(value));
    Value::Object(row)
}

fn series_records(series: &Series) -> Vec<Value> {
    series
        .observations()
        .iter()
        .map(|obs| record(obs.date, series.name(), obs.value))
        .collect()
}

fn correlation_records(correlation: &CorrelationSeries) -> Vec<Value> {
    let label = correlation.label();
    correlation
        .defined()
        .map(|(date, coefficient)| record(date, &label, coefficient))
        .collect()
}

pub async fn healthz(State(state): State<Arc<AppState>>) -> Response {
    match state.series_port.health_check() {
        Ok(()) => Json(json!({ "ok": true })).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "health check failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "ok": false }))).into_response()
        }
    }
}

pub async fn datasets(State(state): State<Arc<AppState>>) -> Result<Json<Vec<String>>, WebError> {
    Ok(Json(state.series_port.list_series()?))
}

pub async fn data(
    State(state): State<Arc<AppState>>,
    Path(dataset): Path<String>,
    Query(params): Query<DataParams>,
) -> Result<Json<Vec<Value>>, WebError> {
    let range = DateRange::new(
        parse_bound(&params.start, "start")?,
        parse_bound(&params.end, "end")?,
    );
    let frequency = present(&params.frequency)
        .map(|f| f.parse::<ResampleRule>())
        .transpose()
        .map_err(|_| WebError::bad_request("Invalid frequency"))?;
    let query = SeriesQuery {
        range,
        frequency,
        transform: present(&params.transform).map(str::to_string),
    };

    match run_series_query(&*state.series_port, &dataset, &query) {
        Ok(series) => Ok(Json(series_records(&series))),
        Err(ExplorerError::NoData { .. }) => Err(WebError::not_found("No data in selected range")),
        Err(e) => Err(e.into()),
    }
}

pub async fn correlation(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CorrelationParams>,
) -> Result<Json<Vec<Value>>, WebError> {
    let (Some(first), Some(second)) = (present(&params.series1), present(&params.series2)) else {
        return Err(WebError::bad_request("series1 and series2 are required"));
    };

    let window = match present(&params.window) {
        Some(raw) => raw
            .parse::<i64>()
            .map_err(|_| WebError::bad_request("window must be integer"))?,
        None => state
            .config
            .get_int("api", "default_window", DEFAULT_WINDOW as i64),
    };
    let window = usize::try_from(window)
        .ok()
        .filter(|w| *w > 1)
        .ok_or_else(|| WebError::bad_request("window must be >1"))?;

    match run_correlation_query(&*state.series_port, first, second, window) {
        Ok(correlation) => Ok(Json(correlation_records(&correlation))),
        Err(ExplorerError::NoData { .. }) => Err(WebError::not_found("Series not found or empty")),
        Err(ExplorerError::ComputationFailed { reason }) => {
            tracing::warn!(series1 = first, series2 = second, window, %reason, "correlation failed");
            Err(WebError::internal("Could not compute correlation"))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn not_found() -> WebError {
    WebError::not_found("Not found")
}
