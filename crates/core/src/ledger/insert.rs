//! Transaction entry: draft validation and insertion into a month set.

use chrono::NaiveDate;
use committee_shared::types::money::{has_currency_precision, parse_amount, MAX_TRANSACTION_AMOUNT};
use committee_shared::types::{Month, TransactionId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::LedgerError;
use super::reconcile::reconcile;
use super::types::{AccountType, MonthlyLedger, Transaction};

/// A transaction as typed into the entry form, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDraft {
    /// Booking date.
    pub date: Option<NaiveDate>,
    /// Category label.
    pub category: Option<String>,
    /// Free text.
    #[serde(default)]
    pub description: String,
    /// Amount as entered, e.g. `"-12.50"` or `"$1,200"`.
    pub amount: Option<String>,
}

impl TransactionDraft {
    /// Validates the draft for `month` and turns it into a transaction with a
    /// fresh identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if a required field is missing, the date lies outside
    /// `month`, or the amount is not a currency value within range.
    pub fn validate(&self, month: Month) -> Result<Transaction, LedgerError> {
        let date = self.date.ok_or(LedgerError::MissingField("date"))?;
        if !month.contains(date) {
            return Err(LedgerError::DateOutsideMonth { date, month });
        }

        let category = self
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or(LedgerError::MissingField("category"))?;

        let raw_amount = self
            .amount
            .as_deref()
            .filter(|a| !a.trim().is_empty())
            .ok_or(LedgerError::MissingField("amount"))?;
        let amount = validate_amount(raw_amount)?;

        Ok(Transaction {
            id: TransactionId::new(),
            date,
            category: category.to_string(),
            description: self.description.trim().to_string(),
            amount,
            running_balance: Decimal::ZERO,
        })
    }
}

/// Parses and range-checks an entered amount.
///
/// # Errors
///
/// Returns [`LedgerError::InvalidAmount`] for unparseable values or values
/// with more than two decimal places, and [`LedgerError::AmountOutOfRange`]
/// beyond the accepted magnitude.
pub fn validate_amount(raw: &str) -> Result<Decimal, LedgerError> {
    let amount = parse_amount(raw).ok_or_else(|| LedgerError::InvalidAmount(raw.to_string()))?;
    if !has_currency_precision(amount) {
        return Err(LedgerError::InvalidAmount(raw.to_string()));
    }
    if amount.abs() > MAX_TRANSACTION_AMOUNT {
        return Err(LedgerError::AmountOutOfRange(amount));
    }
    Ok(amount.normalize())
}

/// Adds a validated transaction to `month` and re-reconciles the whole set.
///
/// The month is materialized if the set has no ledger for it; adding to the
/// synthetic current-month placeholder makes it a real ledger. A month
/// materialized before every existing month takes over their seed opening
/// balance.
///
/// # Errors
///
/// Returns [`LedgerError::DateOutsideMonth`] if the transaction does not
/// belong to `month`, or any precondition error from [`reconcile`].
pub fn add_transaction(
    mut ledgers: Vec<MonthlyLedger>,
    ledger_type: AccountType,
    month: Month,
    transaction: Transaction,
    current_month: Month,
) -> Result<Vec<MonthlyLedger>, LedgerError> {
    if !month.contains(transaction.date) {
        return Err(LedgerError::DateOutsideMonth {
            date: transaction.date,
            month,
        });
    }

    match ledgers.iter_mut().find(|l| l.month == month) {
        Some(ledger) => {
            ledger.synthetic = false;
            ledger.transactions.push(transaction);
        }
        None => {
            let opening = match ledgers.iter().min_by_key(|l| l.month) {
                Some(earliest) if earliest.month > month => earliest.opening_balance,
                _ => Decimal::ZERO,
            };
            let mut ledger = MonthlyLedger::new(ledger_type, month, opening);
            ledger.transactions.push(transaction);
            ledgers.push(ledger);
        }
    }

    reconcile(ledgers, ledger_type, current_month)
}
