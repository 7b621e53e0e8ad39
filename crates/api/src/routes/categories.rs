//! Category list routes.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use tracing::{info, warn};

use committee_core::ledger::CategoryList;

use super::{error_response, storage_error_response};
use crate::AppState;

/// Creates the category routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/ledger/categories", get(list_categories).post(save_categories))
}

/// GET `/ledger/categories`
async fn list_categories(State(state): State<AppState>) -> Response {
    match state.store.load_categories().await {
        Ok(categories) => Json(categories).into_response(),
        Err(e) => storage_error_response(&e),
    }
}

/// POST `/ledger/categories` replaces the stored list.
async fn save_categories(State(state): State<AppState>, body: Bytes) -> Response {
    let categories: CategoryList = match serde_json::from_slice(&body) {
        Ok(categories) => categories,
        Err(e) => {
            warn!(error = %e, "Invalid categories post format");
            return error_response(StatusCode::BAD_REQUEST, "INVALID_FORMAT", "Invalid format");
        }
    };

    match state.store.store_categories(&categories).await {
        Ok(()) => {
            info!(count = categories.len(), "Categories saved");
            (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response()
        }
        Err(e) => storage_error_response(&e),
    }
}
