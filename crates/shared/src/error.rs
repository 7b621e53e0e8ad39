//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Errors raised while assembling a server or client from its settings.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded or is incomplete.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A time zone name is not in the IANA database.
    #[error("Invalid timezone '{name}': {reason}")]
    InvalidTimezone {
        /// Name as configured.
        name: String,
        /// Parser message.
        reason: String,
    },
}

impl AppError {
    /// Machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::InvalidTimezone { .. } => "INVALID_TIMEZONE",
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}
