//! Ledger session state.
//!
//! A session owns the month set shown for the active account type. It
//! guards type switches against out-of-order fetch responses and turns
//! optimistic edits into versioned save requests.

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::SessionError;
pub use service::{persist, LedgerSession};
pub use types::{FetchApplied, FetchTicket, LedgerView, SaveOutcome, SaveRequest};
