//! Ledger error types for validation and reconciliation errors.
//!
//! This module defines all errors that can occur during ledger operations:
//! transaction entry validation, month-set preconditions checked by the
//! reconciler, bank statement import failures and report periods.

use chrono::NaiveDate;
use committee_shared::types::Month;
use rust_decimal::Decimal;
use thiserror::Error;

use super::types::AccountType;

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// A required transaction field was not supplied.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Transaction date does not fall within the month it is added to.
    #[error("Date {date} is outside ledger month {month}")]
    DateOutsideMonth {
        /// Supplied transaction date.
        date: NaiveDate,
        /// Month the transaction was added to.
        month: Month,
    },

    /// Amount could not be parsed or has more than two decimal places.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Amount exceeds the accepted range.
    #[error("Amount {0} is out of range")]
    AmountOutOfRange(Decimal),

    /// A running or carried balance left the representable range.
    #[error("Balance is out of range")]
    BalanceOutOfRange,

    /// Unknown account type.
    #[error("Invalid ledger type: {0}")]
    InvalidAccountType(String),

    /// Unparseable month.
    #[error("Month must be YYYY-MM: {0}")]
    InvalidMonth(String),

    /// Category label is empty.
    #[error("Category name cannot be empty")]
    EmptyCategory,

    // ========== Month Set Errors ==========
    /// A month set contains a ledger belonging to another account type.
    #[error("Ledger {month} has type {found}, expected {expected}")]
    MixedAccountTypes {
        /// Account type being reconciled.
        expected: AccountType,
        /// Account type found on the offending ledger.
        found: AccountType,
        /// Month of the offending ledger.
        month: Month,
    },

    /// A month set contains two ledgers for the same month.
    #[error("Duplicate ledger for month {0}")]
    DuplicateMonth(Month),

    // ========== Import Errors ==========
    /// Bank statement could not be read.
    #[error("invalid csv: {0}")]
    InvalidCsv(String),

    /// Bank statement contained no usable rows.
    #[error("no transactions found")]
    NoTransactionsFound,

    // ========== Report Errors ==========
    /// Unknown financial report period.
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "MISSING_FIELD",
            Self::DateOutsideMonth { .. } => "DATE_OUTSIDE_MONTH",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::AmountOutOfRange(_) => "AMOUNT_OUT_OF_RANGE",
            Self::BalanceOutOfRange => "BALANCE_OUT_OF_RANGE",
            Self::InvalidAccountType(_) => "INVALID_LEDGER_TYPE",
            Self::InvalidMonth(_) => "INVALID_MONTH",
            Self::EmptyCategory => "EMPTY_CATEGORY",
            Self::MixedAccountTypes { .. } => "MIXED_ACCOUNT_TYPES",
            Self::DuplicateMonth(_) => "DUPLICATE_MONTH",
            Self::InvalidCsv(_) => "INVALID_CSV",
            Self::NoTransactionsFound => "NO_TRANSACTIONS_FOUND",
            Self::InvalidPeriod(_) => "INVALID_PERIOD",
        }
    }

    /// Returns the HTTP status code for this error.
    ///
    /// Every ledger error is caused by the request content.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        400
    }
}

impl From<committee_shared::types::MonthParseError> for LedgerError {
    fn from(err: committee_shared::types::MonthParseError) -> Self {
        Self::InvalidMonth(err.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(LedgerError::MissingField("date").error_code(), "MISSING_FIELD");
        assert_eq!(
            LedgerError::AmountOutOfRange(dec!(1)).error_code(),
            "AMOUNT_OUT_OF_RANGE"
        );
        assert_eq!(LedgerError::BalanceOutOfRange.error_code(), "BALANCE_OUT_OF_RANGE");
        assert_eq!(LedgerError::NoTransactionsFound.error_code(), "NO_TRANSACTIONS_FOUND");
        assert_eq!(LedgerError::InvalidPeriod("fy-9".into()).error_code(), "INVALID_PERIOD");
        assert_eq!(LedgerError::NoTransactionsFound.http_status_code(), 400);
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::DateOutsideMonth {
            date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            month: "2025-01".parse().unwrap(),
        };
        assert_eq!(err.to_string(), "Date 2025-02-01 is outside ledger month 2025-01");

        let err = LedgerError::MixedAccountTypes {
            expected: AccountType::Bank,
            found: AccountType::Cash,
            month: "2025-01".parse().unwrap(),
        };
        assert_eq!(err.to_string(), "Ledger 2025-01 has type CASH, expected BANK");
        assert_eq!(LedgerError::NoTransactionsFound.to_string(), "no transactions found");
    }

    #[test]
    fn test_from_month_parse_error() {
        let err: LedgerError = "2025-13".parse::<Month>().unwrap_err().into();
        assert_eq!(err, LedgerError::InvalidMonth("2025-13".to_string()));
    }
}
