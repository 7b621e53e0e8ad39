//! Financial report route.

use std::collections::BTreeMap;

use axum::{
    Json, Router,
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use tracing::info;

use committee_core::ledger::{AccountType, ReportPeriod, build_report, resolve_period};

use super::{ledger_error_response, storage_error_response};
use crate::AppState;

/// Creates the report routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/reports/financial", get(financial_report))
}

/// Query parameters for the financial report.
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    /// `ytd` (default), `fy-1` or `fy-2`.
    pub period: Option<String>,
}

/// GET `/reports/financial?period=fy-1`
async fn financial_report(State(state): State<AppState>, Query(query): Query<ReportQuery>) -> Response {
    let period = match query.period.as_deref().unwrap_or_default().parse::<ReportPeriod>() {
        Ok(period) => period,
        Err(e) => return ledger_error_response(&e),
    };
    let range = match resolve_period(period, state.clock.today()) {
        Ok(range) => range,
        Err(e) => return ledger_error_response(&e),
    };

    let mut ledgers = BTreeMap::new();
    for ledger_type in AccountType::ALL {
        match state.store.fetch_all(ledger_type).await {
            Ok(months) if !months.is_empty() => {
                ledgers.insert(ledger_type, months);
            }
            Ok(_) => {}
            Err(e) => return storage_error_response(&e),
        }
    }

    match build_report(&range, &ledgers) {
        Ok(report) => {
            info!(%period, start = %range.start, end = %range.end, "Financial report built");
            Json(report).into_response()
        }
        Err(e) => ledger_error_response(&e),
    }
}
