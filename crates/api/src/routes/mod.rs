//! API route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{error, warn};

use committee_core::ledger::{AccountType, LedgerError};
use committee_core::storage::StorageError;

use crate::AppState;

pub mod categories;
pub mod health;
pub mod import;
pub mod ledger;
pub mod reports;
pub mod statement;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(ledger::routes())
        .merge(categories::routes())
        .merge(import::routes())
        .merge(statement::routes())
        .merge(reports::routes())
}

// ============================================================================
// Shared Helpers
// ============================================================================

/// JSON error body `{"error": code, "message": message}`.
pub(crate) fn error_response(status: StatusCode, code: &str, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({
            "error": code,
            "message": message.into()
        })),
    )
        .into_response()
}

/// 400 response for a rejected ledger operation.
pub(crate) fn ledger_error_response(err: &LedgerError) -> Response {
    warn!(error = %err, "Rejected ledger request");
    error_response(StatusCode::BAD_REQUEST, err.error_code(), err.to_string())
}

/// Response for a failed store operation.
pub(crate) fn storage_error_response(err: &StorageError) -> Response {
    let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        error!(error = %err, "Ledger store operation failed");
        error_response(status, err.error_code(), "Storage operation failed")
    } else {
        warn!(error = %err, "Ledger store rejected request");
        error_response(status, err.error_code(), err.to_string())
    }
}

/// Parses the `type` query parameter.
pub(crate) fn parse_ledger_type(raw: Option<&str>) -> Result<AccountType, Response> {
    let raw = raw.map(str::trim).filter(|t| !t.is_empty()).ok_or_else(|| {
        error_response(StatusCode::BAD_REQUEST, "MISSING_FIELD", "Type is required")
    })?;
    raw.parse().map_err(|e: LedgerError| ledger_error_response(&e))
}
