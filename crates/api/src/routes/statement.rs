//! Monthly PDF statement route.

use axum::{
    Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tracing::{error, info, warn};

use committee_shared::types::Month;

use super::ledger::LedgerQuery;
use super::{error_response, parse_ledger_type, storage_error_response};
use crate::AppState;
use crate::pdf::render_ledger_pdf;

/// Creates the statement routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/ledger/pdf", get(ledger_pdf))
}

/// GET `/ledger/pdf?type=BANK&month=2025-01`
///
/// Renders one stored month, opened at the nearest previous closing balance.
async fn ledger_pdf(State(state): State<AppState>, Query(query): Query<LedgerQuery>) -> Response {
    let ledger_type = match parse_ledger_type(query.ledger_type.as_deref()) {
        Ok(t) => t,
        Err(response) => return response,
    };
    let Some(raw_month) = query.month.as_deref().map(str::trim).filter(|m| !m.is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "MISSING_FIELD", "Month is required");
    };
    let Ok(month) = raw_month.parse::<Month>() else {
        warn!(month = raw_month, "Invalid month");
        return error_response(StatusCode::BAD_REQUEST, "INVALID_MONTH", "Month must be YYYY-MM");
    };

    let ledger = match state.store.fetch_stored_month(ledger_type, month).await {
        Ok(ledger) => ledger,
        Err(e) => return storage_error_response(&e),
    };

    match render_ledger_pdf(&ledger) {
        Ok(bytes) => {
            info!(%ledger_type, %month, size = bytes.len(), "Ledger statement rendered");
            let filename = format!("attachment; filename=\"ledger-{ledger_type}-{month}.pdf\"");
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "application/pdf".to_string()),
                    (header::CONTENT_DISPOSITION, filename),
                ],
                bytes,
            )
                .into_response()
        }
        Err(e) => {
            error!(%ledger_type, %month, error = %e, "Failed to build ledger PDF");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "PDF_ERROR",
                "Failed to build ledger PDF",
            )
        }
    }
}
