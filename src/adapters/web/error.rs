//! JSON error responses for the web adapter.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::domain::error::ExplorerError;

#[derive(Debug)]
pub struct WebError {
    pub status: StatusCode,
    pub message: String,
}

impl WebError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

pub fn status_from_error(err: &ExplorerError) -> StatusCode {
    match err {
        ExplorerError::InvalidArgument { .. } | ExplorerError::UnsupportedMethod { .. } => {
            StatusCode::BAD_REQUEST
        }
        ExplorerError::EmptyInput
        | ExplorerError::InsufficientData { .. }
        | ExplorerError::DegenerateInput { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ExplorerError::NotFound { .. } | ExplorerError::NoData { .. } => StatusCode::NOT_FOUND,
        ExplorerError::Source { .. } => StatusCode::BAD_GATEWAY,
        ExplorerError::ComputationFailed { .. }
        | ExplorerError::Database { .. }
        | ExplorerError::DatabaseQuery { .. }
        | ExplorerError::ConfigParse { .. }
        | ExplorerError::ConfigMissing { .. }
        | ExplorerError::ConfigInvalid { .. }
        | ExplorerError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<ExplorerError> for WebError {
    fn from(err: ExplorerError) -> Self {
        let status = status_from_error(&err);
        if status.is_server_error() {
            tracing::error!(error = %err, status = status.as_u16(), "request failed");
        }
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_table() {
        let cases = [
            (ExplorerError::invalid("bad"), StatusCode::BAD_REQUEST),
            (
                ExplorerError::UnsupportedMethod { method: "z".into() },
                StatusCode::BAD_REQUEST,
            ),
            (ExplorerError::EmptyInput, StatusCode::UNPROCESSABLE_ENTITY),
            (
                ExplorerError::DegenerateInput { reason: "zero".into() },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ExplorerError::NotFound { series: "X".into() },
                StatusCode::NOT_FOUND,
            ),
            (
                ExplorerError::ComputationFailed { reason: "none".into() },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ExplorerError::DatabaseQuery { reason: "locked".into() },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ExplorerError::Source { reason: "down".into() },
                StatusCode::BAD_GATEWAY,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(status_from_error(&err), expected, "{err}");
        }
    }

    #[test]
    fn from_explorer_error_keeps_message() {
        let web: WebError = ExplorerError::NotFound {
            series: "GDP".into(),
        }
        .into();
        assert_eq!(web.status, StatusCode::NOT_FOUND);
        assert_eq!(web.message, "Series 'GDP' not found");
    }
}
