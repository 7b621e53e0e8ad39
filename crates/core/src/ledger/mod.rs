//! Monthly ledger logic.
//!
//! This module implements the core ledger functionality:
//! - Transaction and monthly ledger types
//! - Chronological ordering and running balance calculation
//! - Balance reconciliation across a month set
//! - Transaction entry validation and insertion
//! - The shared category list
//! - Bank statement import
//! - The financial report across account types
//! - Error types for ledger operations

pub mod balance;
pub mod categories;
pub mod error;
pub mod import;
pub mod insert;
pub mod ordering;
pub mod reconcile;
pub mod report;
pub mod types;

#[cfg(test)]
mod reconcile_props;

pub use balance::{apply_running_balances, RunningBalance};
pub use categories::CategoryList;
pub use error::LedgerError;
pub use import::{import_statement, ImportOutcome, ImportSummary, StatementRow};
pub use insert::{add_transaction, TransactionDraft};
pub use ordering::sort_transactions;
pub use reconcile::{close_month, reconcile};
pub use report::{build_report, resolve_period, FinancialReport, PeriodRange, ReportPeriod};
pub use types::{AccountType, LedgerKey, MonthlyLedger, Transaction};
