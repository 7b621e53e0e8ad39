//! Session state and command types.

use crate::ledger::{AccountType, CategoryList, MonthlyLedger};

/// What the ledger screen shows for the active account type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerView {
    /// A fetch for the active type is outstanding.
    Loading,
    /// Reconciled month set of the active type.
    Ready(Vec<MonthlyLedger>),
    /// The fetch for the active type failed.
    Failed(String),
}

impl LedgerView {
    /// Reconciled months, if loaded.
    #[must_use]
    pub fn ledgers(&self) -> Option<&[MonthlyLedger]> {
        match self {
            Self::Ready(ledgers) => Some(ledgers),
            Self::Loading | Self::Failed(_) => None,
        }
    }
}

/// Identifies one fetch so its response can be matched to the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchTicket {
    /// Account type the fetch was issued for.
    pub ledger_type: AccountType,
    /// Session generation at the time of issue.
    pub generation: u64,
}

/// Whether a fetch response reached the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchApplied {
    /// The response belonged to the latest fetch and updated the view.
    Applied,
    /// A newer fetch was issued since; the response was discarded.
    Stale,
}

/// Persistence command produced by an optimistic local edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    /// Account type of the month set.
    pub ledger_type: AccountType,
    /// Monotonically increasing edit version.
    pub version: u64,
    /// Full month set to save, placeholder months excluded.
    pub ledgers: Vec<MonthlyLedger>,
    /// Category list to save first, when the edit introduced a category.
    pub categories: Option<CategoryList>,
}

/// Result of applying a store response to a save request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The latest edit is persisted.
    Acknowledged,
    /// An older edit was persisted; a newer one is still outstanding.
    Superseded,
    /// The store rejected the save; local state was kept.
    Failed(String),
}
