//! Domain error types.

/// Top-level error type for finexplorer.
#[derive(Debug, thiserror::Error)]
pub enum ExplorerError {
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("unsupported normalization method '{method}'")]
    UnsupportedMethod { method: String },

    #[error("empty input series")]
    EmptyInput,

    #[error("insufficient data: {reason}")]
    InsufficientData { reason: String },

    #[error("degenerate input: {reason}")]
    DegenerateInput { reason: String },

    #[error("computation failed: {reason}")]
    ComputationFailed { reason: String },

    #[error("Series '{series}' not found")]
    NotFound { series: String },

    #[error("no data for {series} in selected range")]
    NoData { series: String },

    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("observation source error: {reason}")]
    Source { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ExplorerError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        ExplorerError::InvalidArgument {
            reason: reason.into(),
        }
    }

    pub(crate) fn query(err: rusqlite::Error) -> Self {
        ExplorerError::DatabaseQuery {
            reason: err.to_string(),
        }
    }

    pub(crate) fn pool(err: r2d2::Error) -> Self {
        ExplorerError::Database {
            reason: err.to_string(),
        }
    }
}

impl From<&ExplorerError> for std::process::ExitCode {
    fn from(err: &ExplorerError) -> Self {
        let code: u8 = match err {
            ExplorerError::Io(_) => 1,
            ExplorerError::InvalidArgument { .. }
            | ExplorerError::UnsupportedMethod { .. }
            | ExplorerError::ConfigParse { .. }
            | ExplorerError::ConfigMissing { .. }
            | ExplorerError::ConfigInvalid { .. } => 2,
            ExplorerError::Database { .. } | ExplorerError::DatabaseQuery { .. } => 3,
            ExplorerError::Source { .. } => 4,
            ExplorerError::EmptyInput
            | ExplorerError::InsufficientData { .. }
            | ExplorerError::DegenerateInput { .. }
            | ExplorerError::ComputationFailed { .. }
            | ExplorerError::NotFound { .. }
            | ExplorerError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_series() {
        let err = ExplorerError::NotFound {
            series: "UNRATE".into(),
        };
        assert_eq!(err.to_string(), "Series 'UNRATE' not found");
    }

    #[test]
    fn invalid_helper_builds_invalid_argument() {
        let err = ExplorerError::invalid("window must be >1");
        assert!(
            matches!(err, ExplorerError::InvalidArgument { ref reason } if reason == "window must be >1")
        );
    }

    #[test]
    fn io_error_converts_transparently() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: ExplorerError = io.into();
        assert_eq!(err.to_string(), "gone");
    }
}
