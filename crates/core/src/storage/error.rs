//! Storage error types.

use thiserror::Error;

/// Ledger store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Blob not found in storage.
    #[error("not found: {key}")]
    NotFound {
        /// Storage key that was not found.
        key: String,
    },

    /// Storage provider configuration error.
    #[error("storage configuration error: {0}")]
    Configuration(String),

    /// OpenDAL operation error.
    #[error("storage operation failed: {0}")]
    Operation(String),

    /// Stored or received content is not valid ledger JSON.
    #[error("invalid ledger format: {0}")]
    Serialization(String),

    /// Invalid storage key or a ledger filed under the wrong key.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    /// The remote store rejected the caller's credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The remote store answered with an error status.
    #[error("remote store returned {status}: {message}")]
    Remote {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body.
        message: String,
    },
}

impl StorageError {
    /// Create a not found error.
    #[must_use]
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an operation error.
    #[must_use]
    pub fn operation(msg: impl Into<String>) -> Self {
        Self::Operation(msg.into())
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Configuration(_) => "STORAGE_CONFIGURATION_ERROR",
            Self::Operation(_) => "STORAGE_ERROR",
            Self::Serialization(_) => "INVALID_LEDGER_FORMAT",
            Self::InvalidKey(_) => "INVALID_STORAGE_KEY",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Remote { .. } => "REMOTE_STORE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Serialization(_) | Self::InvalidKey(_) => 400,
            Self::Unauthorized(_) => 401,
            Self::Remote { status, .. } => *status,
            Self::Configuration(_) | Self::Operation(_) => 500,
        }
    }
}

impl From<opendal::Error> for StorageError {
    fn from(err: opendal::Error) -> Self {
        match err.kind() {
            opendal::ErrorKind::NotFound => Self::NotFound {
                key: err.to_string(),
            },
            opendal::ErrorKind::ConfigInvalid => Self::Configuration(err.to_string()),
            _ => Self::Operation(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
