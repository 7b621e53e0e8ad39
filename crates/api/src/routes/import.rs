//! Bank statement import route.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{info, warn};

use committee_core::ledger::{AccountType, import_statement};

use super::{error_response, ledger_error_response, parse_ledger_type, storage_error_response};
use crate::AppState;

/// Creates the import routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/ledger/import", post(import_bank_statement))
}

/// Query parameters for an import.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportQuery {
    /// Target account type.
    #[serde(rename = "type")]
    pub ledger_type: Option<String>,
    /// Account balance after the newest statement row.
    pub current_balance: Option<String>,
}

/// JSON form of the import body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportBody {
    /// Raw statement text.
    #[serde(default)]
    pub csv: String,
    /// Account balance after the newest statement row.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub current_balance: Option<Decimal>,
    /// Target account type.
    #[serde(default, rename = "type")]
    pub ledger_type: Option<String>,
}

/// POST `/ledger/import?type=BANK&currentBalance=1234.56`
///
/// The body is either the raw statement or an [`ImportBody`]. Query
/// parameters take precedence over body fields.
async fn import_bank_statement(
    State(state): State<AppState>,
    Query(query): Query<ImportQuery>,
    body: Bytes,
) -> Response {
    let mut current_balance = match query.current_balance.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => match raw.parse::<Decimal>() {
            Ok(balance) => Some(balance),
            Err(_) => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    "INVALID_AMOUNT",
                    "Current balance must be a number",
                );
            }
        },
    };
    let mut ledger_type = query
        .ledger_type
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    let raw = String::from_utf8_lossy(&body);
    let mut csv = raw.trim().to_string();
    if let Ok(json) = serde_json::from_slice::<ImportBody>(&body) {
        if !json.csv.trim().is_empty() {
            csv = json.csv;
        }
        if ledger_type.is_none() {
            ledger_type = json.ledger_type.filter(|t| !t.trim().is_empty());
        }
        if current_balance.is_none() {
            current_balance = json.current_balance;
        }
    }

    let Some(current_balance) = current_balance else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "MISSING_FIELD",
            "Current balance is required",
        );
    };
    if csv.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "MISSING_FIELD", "CSV content is required");
    }

    let ledger_type = match ledger_type {
        Some(raw) => match parse_ledger_type(Some(&raw)) {
            Ok(t) => t,
            Err(response) => return response,
        },
        None => AccountType::Bank,
    };

    let outcome = match import_statement(&csv, ledger_type, current_balance) {
        Ok(outcome) => outcome,
        Err(e) => return ledger_error_response(&e),
    };

    if let Err(e) = state.store.save_all(ledger_type, &outcome.ledgers).await {
        warn!(%ledger_type, "Import could not be stored");
        return storage_error_response(&e);
    }

    info!(
        %ledger_type,
        months = outcome.ledgers.len(),
        transactions = outcome.transaction_count,
        "Bank statement imported"
    );
    (StatusCode::OK, Json(outcome.summary(ledger_type))).into_response()
}
