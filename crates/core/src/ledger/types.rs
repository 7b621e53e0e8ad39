//! Ledger domain types.
//!
//! This module defines the records the reconciliation engine works on: dated
//! transactions grouped into monthly ledgers, one sequence per account type.
//! Field names on the wire are camelCase to match the stored JSON documents.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use committee_shared::types::{Month, TransactionId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::LedgerError;

/// Account type partitioning the ledger into independent balance sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountType {
    /// Bank account.
    Bank,
    /// Petty cash.
    Cash,
    /// Credit card.
    Card,
}

impl AccountType {
    /// All account types, in display order.
    pub const ALL: [Self; 3] = [Self::Bank, Self::Cash, Self::Card];

    /// Upper-case wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bank => "BANK",
            Self::Cash => "CASH",
            Self::Card => "CARD",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BANK" => Ok(Self::Bank),
            "CASH" => Ok(Self::Cash),
            "CARD" => Ok(Self::Card),
            _ => Err(LedgerError::InvalidAccountType(s.to_string())),
        }
    }
}

/// A single dated money movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Opaque identifier.
    pub id: TransactionId,
    /// Booking date; must fall within the owning month.
    pub date: NaiveDate,
    /// Category label.
    pub category: String,
    /// Free text, may be empty.
    #[serde(default)]
    pub description: String,
    /// Signed amount: positive is a credit, negative a debit.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// Balance after this transaction. Always recomputed by reconciliation.
    #[serde(default, with = "rust_decimal::serde::float")]
    pub running_balance: Decimal,
}

impl Transaction {
    /// Creates a transaction with a fresh identifier and no running balance.
    #[must_use]
    pub fn new(
        date: NaiveDate,
        category: impl Into<String>,
        description: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            date,
            category: category.into(),
            description: description.into(),
            amount,
            running_balance: Decimal::ZERO,
        }
    }
}

/// Composite identity of a monthly ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LedgerKey {
    /// Account type.
    pub ledger_type: AccountType,
    /// Calendar month.
    pub month: Month,
}

impl fmt::Display for LedgerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LEDGER#{}#{}", self.ledger_type, self.month)
    }
}

/// All transactions of one account type for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyLedger {
    /// Partition key, `LEDGER#<TYPE>#<YYYY-MM>`.
    #[serde(default)]
    pub pk: String,
    /// Calendar month.
    pub month: Month,
    /// Account type.
    #[serde(rename = "type")]
    pub ledger_type: AccountType,
    /// Balance carried in from the previous month.
    #[serde(default, with = "rust_decimal::serde::float")]
    pub opening_balance: Decimal,
    /// Opening balance plus this month's transactions.
    #[serde(default, with = "rust_decimal::serde::float")]
    pub closing_balance: Decimal,
    /// Transactions in any order; reconciliation sorts them.
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    /// Set on the in-memory placeholder for a month the store has never seen.
    #[serde(skip)]
    pub synthetic: bool,
}

impl MonthlyLedger {
    /// Creates an empty ledger for a month.
    #[must_use]
    pub fn new(ledger_type: AccountType, month: Month, opening_balance: Decimal) -> Self {
        let key = LedgerKey { ledger_type, month };
        Self {
            pk: key.to_string(),
            month,
            ledger_type,
            opening_balance,
            closing_balance: opening_balance,
            transactions: Vec::new(),
            synthetic: false,
        }
    }

    /// Creates the not-yet-persisted placeholder for a month.
    #[must_use]
    pub fn synthetic(ledger_type: AccountType, month: Month) -> Self {
        Self {
            synthetic: true,
            ..Self::new(ledger_type, month, Decimal::ZERO)
        }
    }

    /// Composite identity.
    #[must_use]
    pub fn key(&self) -> LedgerKey {
        LedgerKey {
            ledger_type: self.ledger_type,
            month: self.month,
        }
    }

    /// Sum of all transaction amounts, `None` on overflow.
    #[must_use]
    pub fn net_change(&self) -> Option<Decimal> {
        self.transactions
            .iter()
            .try_fold(Decimal::ZERO, |sum, tx| sum.checked_add(tx.amount))
    }
}
