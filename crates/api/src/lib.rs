//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes for ledgers, categories, bank statement import,
//!   monthly PDF statements and the financial report
//! - Shared application state
//! - JSON error responses

pub mod pdf;
pub mod routes;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use committee_core::clock::{Clock, SystemClock};
use committee_core::storage::{BlobLedgerStore, StorageConfig, StorageError};
use committee_shared::AppConfig;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Largest accepted request body; bank statements are the biggest payload.
pub const MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Blob-backed ledger store.
    pub store: Arc<BlobLedgerStore>,
    /// Source of today's date for report periods.
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Wraps a ledger store, reading dates from the UTC wall clock.
    #[must_use]
    pub fn new(store: BlobLedgerStore) -> Self {
        Self {
            store: Arc::new(store),
            clock: Arc::new(SystemClock::default()),
        }
    }

    /// Replaces the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Builds the ledger store described by the application configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage settings are invalid or the backend
    /// cannot be initialized.
    pub fn from_config(config: &AppConfig) -> Result<Self, StorageError> {
        let store = BlobLedgerStore::from_config(StorageConfig::from_app_config(config)?)?;
        Ok(Self::new(store))
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::api_routes())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
