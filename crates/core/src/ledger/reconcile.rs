//! Balance reconciliation across a month set.
//!
//! Given every monthly ledger of one account type, produce the chronologically
//! ordered, balance-consistent view:
//!
//! 1. inject an empty placeholder for the current month if the set lacks one;
//! 2. order months ascending;
//! 3. keep the earliest month's opening balance as the seed and overwrite every
//!    later month's opening balance with the previous month's closing balance;
//! 4. within each month sort transactions by date and recompute running and
//!    closing balances.
//!
//! Opening balances after the first month are never trusted from storage, so
//! reconciling the output again yields the same result.

use std::collections::BTreeMap;

use committee_shared::types::Month;
use rust_decimal::Decimal;

use super::balance::apply_running_balances;
use super::error::LedgerError;
use super::ordering::sort_transactions;
use super::types::{AccountType, MonthlyLedger};

/// Recomputes one month in place from the given opening balance.
///
/// Sorts the transactions, writes running balances and the closing balance,
/// and restores the partition key.
///
/// # Errors
///
/// Returns [`LedgerError::BalanceOutOfRange`] if a running balance overflows.
pub fn close_month(ledger: &mut MonthlyLedger, opening_balance: Decimal) -> Result<(), LedgerError> {
    ledger.opening_balance = opening_balance;
    sort_transactions(&mut ledger.transactions);
    ledger.closing_balance = apply_running_balances(opening_balance, &mut ledger.transactions)?;
    ledger.pk = ledger.key().to_string();
    Ok(())
}

/// Reconciles all monthly ledgers of one account type.
///
/// `current_month` is the caller's notion of "now"; a placeholder is injected
/// for it when missing. A placeholder that lands before every stored month
/// opens at the earliest stored month's opening balance.
///
/// # Errors
///
/// Returns [`LedgerError::MixedAccountTypes`] if a ledger of another type is
/// present, [`LedgerError::DuplicateMonth`] if two ledgers share a month and
/// [`LedgerError::BalanceOutOfRange`] if a running balance overflows.
pub fn reconcile<I>(
    ledgers: I,
    ledger_type: AccountType,
    current_month: Month,
) -> Result<Vec<MonthlyLedger>, LedgerError>
where
    I: IntoIterator<Item = MonthlyLedger>,
{
    let mut by_month: BTreeMap<Month, MonthlyLedger> = BTreeMap::new();
    for ledger in ledgers {
        if ledger.ledger_type != ledger_type {
            return Err(LedgerError::MixedAccountTypes {
                expected: ledger_type,
                found: ledger.ledger_type,
                month: ledger.month,
            });
        }
        let month = ledger.month;
        if by_month.insert(month, ledger).is_some() {
            return Err(LedgerError::DuplicateMonth(month));
        }
    }

    if !by_month.contains_key(&current_month) {
        let mut placeholder = MonthlyLedger::synthetic(ledger_type, current_month);
        if let Some(next) = by_month.values().next()
            && next.month > current_month
        {
            placeholder.opening_balance = next.opening_balance;
        }
        by_month.insert(current_month, placeholder);
    }

    let mut carried: Option<Decimal> = None;
    for ledger in by_month.values_mut() {
        let opening = carried.unwrap_or(ledger.opening_balance);
        close_month(ledger, opening)?;
        carried = Some(ledger.closing_balance);
    }

    Ok(by_month.into_values().collect())
}
