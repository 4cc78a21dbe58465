//! Domain error types.
//!
//! Only contract violations surface here. Missing columns, short histories and
//! degenerate inputs are absorbed by the metric defaults and never become errors.

/// Top-level error type for fleet-telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
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

    #[error("malformed source {source_name}: {reason}")]
    MalformedSource { source_name: String, reason: String },

    #[error("no data: {reason}")]
    NoData { reason: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TelemetryError {
    pub fn malformed(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        TelemetryError::MalformedSource {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        TelemetryError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl TelemetryError {
    /// Process exit status for this error class.
    pub fn exit_status(&self) -> u8 {
        match self {
            TelemetryError::Io(_) | TelemetryError::Json(_) => 1,
            TelemetryError::ConfigParse { .. }
            | TelemetryError::ConfigMissing { .. }
            | TelemetryError::ConfigInvalid { .. } => 2,
            TelemetryError::MalformedSource { .. } => 4,
            TelemetryError::NoData { .. } => 5,
        }
    }
}

impl From<&TelemetryError> for std::process::ExitCode {
    fn from(err: &TelemetryError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}
