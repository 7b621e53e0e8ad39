//! Session error types.

use thiserror::Error;

use crate::ledger::{AccountType, LedgerError};

/// Errors returned synchronously by session commands.
///
/// Store failures are never returned here; they surface as a failed view or
/// a failed save outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The entry was rejected before any state changed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// No month set is loaded for the active account type.
    #[error("{ledger_type} ledger is not loaded")]
    NotReady {
        /// Active account type.
        ledger_type: AccountType,
    },
}

impl SessionError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Ledger(e) => e.error_code(),
            Self::NotReady { .. } => "LEDGER_NOT_READY",
        }
    }
}
