//! Monthly ledger routes.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use committee_core::ledger::MonthlyLedger;
use committee_shared::types::Month;

use super::{error_response, parse_ledger_type, storage_error_response};
use crate::AppState;

/// Creates the ledger routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/ledger", get(get_ledger).post(save_ledger))
}

/// Query parameters for ledger routes.
#[derive(Debug, Default, Deserialize)]
pub struct LedgerQuery {
    /// Account type, `BANK`, `CASH` or `CARD`.
    #[serde(rename = "type")]
    pub ledger_type: Option<String>,
    /// Single month, `YYYY-MM`.
    pub month: Option<String>,
}

/// GET `/ledger?type=BANK` returns every stored month of the type.
/// GET `/ledger?type=BANK&month=2025-01` returns one month with its opening
/// balance carried from the nearest previous month.
async fn get_ledger(State(state): State<AppState>, Query(query): Query<LedgerQuery>) -> Response {
    let ledger_type = match parse_ledger_type(query.ledger_type.as_deref()) {
        Ok(t) => t,
        Err(response) => return response,
    };

    let Some(raw_month) = query.month.as_deref().map(str::trim).filter(|m| !m.is_empty()) else {
        return match state.store.fetch_all(ledger_type).await {
            Ok(ledgers) => Json(ledgers).into_response(),
            Err(e) => storage_error_response(&e),
        };
    };

    let Ok(month) = raw_month.parse::<Month>() else {
        warn!(month = raw_month, "Invalid month");
        return error_response(StatusCode::BAD_REQUEST, "INVALID_MONTH", "Month must be YYYY-MM");
    };

    match state.store.fetch_month(ledger_type, month).await {
        Ok(ledger) => Json(ledger).into_response(),
        Err(e) => storage_error_response(&e),
    }
}

/// POST `/ledger?type=BANK` saves each month in the body under its key.
async fn save_ledger(
    State(state): State<AppState>,
    Query(query): Query<LedgerQuery>,
    body: Bytes,
) -> Response {
    let ledger_type = match parse_ledger_type(query.ledger_type.as_deref()) {
        Ok(t) => t,
        Err(response) => return response,
    };

    let ledgers: Vec<MonthlyLedger> = match serde_json::from_slice(&body) {
        Ok(ledgers) => ledgers,
        Err(e) => {
            warn!(error = %e, "Invalid ledger post format");
            return error_response(StatusCode::BAD_REQUEST, "INVALID_FORMAT", "Invalid format");
        }
    };

    match state.store.save_all(ledger_type, &ledgers).await {
        Ok(()) => {
            info!(%ledger_type, months = ledgers.len(), "Ledger saved");
            (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response()
        }
        Err(e) => storage_error_response(&e),
    }
}
