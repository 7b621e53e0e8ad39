//! Running balance calculation.
//!
//! Balances are rounded to currency precision after every step, never only at
//! month close, so many small transactions cannot accumulate drift.

use committee_shared::types::round_currency;
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::Transaction;

/// Running balance accumulator for one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunningBalance {
    current: Decimal,
}

impl RunningBalance {
    /// Starts from an opening balance.
    #[must_use]
    pub fn start(opening_balance: Decimal) -> Self {
        Self {
            current: round_currency(opening_balance),
        }
    }

    /// Applies one amount and returns the new, rounded balance.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::BalanceOutOfRange`] if the sum overflows.
    pub fn apply(&mut self, amount: Decimal) -> Result<Decimal, LedgerError> {
        let next = self
            .current
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOutOfRange)?;
        self.current = round_currency(next);
        Ok(self.current)
    }

    /// Current balance.
    #[must_use]
    pub fn current(self) -> Decimal {
        self.current
    }
}

/// Writes running balances onto `transactions` in their current order and
/// returns the closing balance.
///
/// # Errors
///
/// Returns [`LedgerError::BalanceOutOfRange`] if a balance overflows; the
/// transactions before the overflow keep their new running balances.
pub fn apply_running_balances(
    opening_balance: Decimal,
    transactions: &mut [Transaction],
) -> Result<Decimal, LedgerError> {
    let mut balance = RunningBalance::start(opening_balance);
    for tx in transactions.iter_mut() {
        tx.running_balance = balance.apply(tx.amount)?;
    }
    Ok(balance.current())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn tx(amount: Decimal) -> Transaction {
        Transaction::new(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), "Misc", "", amount)
    }

    #[test]
    fn test_running_balance_chain() {
        let mut balance = RunningBalance::start(dec!(100));
        assert_eq!(balance.apply(dec!(50)), Ok(dec!(150)));
        assert_eq!(balance.apply(dec!(-30)), Ok(dec!(120)));
        assert_eq!(balance.current(), dec!(120));
    }

    #[test]
    fn test_rounds_after_every_step() {
        // Rounding only the final total would give 0.02 (0.015 + 0.005 = 0.020).
        let mut balance = RunningBalance::start(Decimal::ZERO);
        assert_eq!(balance.apply(dec!(0.015)), Ok(dec!(0.02)));
        assert_eq!(balance.apply(dec!(0.005)), Ok(dec!(0.03)));
    }

    #[test]
    fn test_overflow_is_an_error() {
        let mut balance = RunningBalance::start(Decimal::MAX);
        assert_eq!(balance.apply(dec!(1)), Err(LedgerError::BalanceOutOfRange));
        assert_eq!(balance.current(), Decimal::MAX);

        let mut txs = vec![tx(Decimal::MAX), tx(Decimal::MAX)];
        assert_eq!(
            apply_running_balances(Decimal::ZERO, &mut txs),
            Err(LedgerError::BalanceOutOfRange)
        );
    }

    #[test]
    fn test_opening_balance_is_rounded() {
        assert_eq!(RunningBalance::start(dec!(10.005)).current(), dec!(10.01));
    }

    #[test]
    fn test_apply_running_balances_empty_month() {
        let mut txs: Vec<Transaction> = vec![];
        assert_eq!(apply_running_balances(dec!(42.10), &mut txs), Ok(dec!(42.10)));
    }

    #[test]
    fn test_apply_running_balances_overwrites_supplied_values() {
        let mut txs = vec![tx(dec!(-50)), tx(dec!(25.5))];
        txs[0].running_balance = dec!(123456);
        let closing = apply_running_balances(dec!(1000), &mut txs).unwrap();
        assert_eq!(txs[0].running_balance, dec!(950));
        assert_eq!(txs[1].running_balance, dec!(975.5));
        assert_eq!(closing, dec!(975.5));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Final balance equals opening plus the sum of cent amounts.
        #[test]
        fn prop_final_balance_equals_sum_of_changes(
            opening in -1_000_000i64..1_000_000i64,
            cents in prop::collection::vec(-100_000i64..100_000i64, 0..30),
        ) {
            let opening = Decimal::new(opening, 2);
            let mut txs: Vec<Transaction> = cents.iter().map(|c| tx(Decimal::new(*c, 2))).collect();
            let closing = apply_running_balances(opening, &mut txs).unwrap();
            let expected = opening + cents.iter().map(|c| Decimal::new(*c, 2)).sum::<Decimal>();
            prop_assert_eq!(closing, expected);
        }

        /// Each running balance is the previous one plus the amount.
        #[test]
        fn prop_each_step_extends_previous(
            cents in prop::collection::vec(-100_000i64..100_000i64, 1..30),
        ) {
            let mut txs: Vec<Transaction> = cents.iter().map(|c| tx(Decimal::new(*c, 2))).collect();
            apply_running_balances(Decimal::ZERO, &mut txs).unwrap();
            let mut previous = Decimal::ZERO;
            for t in &txs {
                prop_assert_eq!(t.running_balance, previous + t.amount);
                previous = t.running_balance;
            }
        }
    }
}
