//! Property-based tests for reconciliation.
//!
//! - Property 1: Idempotence
//! - Property 2: Balance continuity
//! - Property 3: Sum consistency
//! - Property 4: Stable same-day ordering
//! - Property 5: Current-month injection

use chrono::NaiveDate;
use committee_shared::types::{round_currency, Month, TransactionId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::reconcile::reconcile;
use super::types::{AccountType, MonthlyLedger, Transaction};

/// Strategy for cent amounts between -10,000.00 and 10,000.00.
fn amount() -> impl Strategy<Value = Decimal> {
    (-1_000_000i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for a month in 2023-2026.
fn month() -> impl Strategy<Value = Month> {
    (2023i32..=2026, 1u32..=12).prop_map(|(y, m)| Month::new(y, m).unwrap())
}

/// Strategy for one month's transactions (day, amount) with a stored opening.
fn month_body() -> impl Strategy<Value = (Decimal, Vec<(u32, Decimal)>)> {
    (amount(), prop::collection::vec((1u32..=28, amount()), 0..8))
}

/// Strategy for a whole month set with distinct months.
fn month_set() -> impl Strategy<Value = Vec<MonthlyLedger>> {
    prop::collection::btree_map(month(), month_body(), 0..8).prop_map(|months| {
        months
            .into_iter()
            .map(|(m, (opening, txs))| {
                let mut ledger = MonthlyLedger::new(AccountType::Bank, m, opening);
                ledger.transactions = txs
                    .into_iter()
                    .enumerate()
                    .map(|(i, (day, amount))| Transaction {
                        id: TransactionId::from_string(format!("{m}-{i}")),
                        date: NaiveDate::from_ymd_opt(m.year(), m.month(), day).unwrap(),
                        category: "Misc".to_string(),
                        description: String::new(),
                        amount,
                        running_balance: Decimal::ZERO,
                    })
                    .collect();
                ledger
            })
            .rev()
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property 1: reconciling reconciled output changes nothing.
    #[test]
    fn prop_reconcile_is_idempotent(set in month_set(), current in month()) {
        let once = reconcile(set, AccountType::Bank, current).unwrap();
        let twice = reconcile(once.clone(), AccountType::Bank, current).unwrap();
        prop_assert_eq!(once, twice);
    }

    /// Property 2: each month opens at the previous month's close.
    #[test]
    fn prop_balance_continuity(set in month_set(), current in month()) {
        let out = reconcile(set, AccountType::Bank, current).unwrap();
        for pair in out.windows(2) {
            prop_assert!(pair[0].month < pair[1].month);
            prop_assert_eq!(pair[1].opening_balance, pair[0].closing_balance);
        }
    }

    /// Property 3: closing equals rounded opening plus the month's amounts.
    #[test]
    fn prop_sum_consistency(set in month_set(), current in month()) {
        let out = reconcile(set, AccountType::Bank, current).unwrap();
        for ledger in &out {
            let expected = round_currency(ledger.opening_balance + ledger.net_change().unwrap());
            prop_assert_eq!(ledger.closing_balance, expected);
            if let Some(last) = ledger.transactions.last() {
                prop_assert_eq!(last.running_balance, ledger.closing_balance);
            }
        }
    }

    /// Property 4: dates ascend, and same-day entries keep insertion order.
    #[test]
    fn prop_stable_same_day_ordering(set in month_set(), current in month()) {
        let out = reconcile(set, AccountType::Bank, current).unwrap();
        for ledger in &out {
            for pair in ledger.transactions.windows(2) {
                prop_assert!(pair[0].date <= pair[1].date);
                if pair[0].date == pair[1].date {
                    let index = |tx: &Transaction| -> usize {
                        tx.id.as_str().rsplit('-').next().unwrap().parse().unwrap()
                    };
                    prop_assert!(index(&pair[0]) < index(&pair[1]));
                }
            }
        }
    }

    /// Property 5: exactly one current-month entry, carrying the prior close,
    /// or the stored seed when it comes first.
    #[test]
    fn prop_current_month_injected_once(set in month_set(), current in month()) {
        let had_current = set.iter().any(|l| l.month == current);
        let stored_seed = set
            .iter()
            .min_by_key(|l| l.month)
            .map_or(Decimal::ZERO, |l| l.opening_balance);
        let out = reconcile(set, AccountType::Bank, current).unwrap();

        let matching: Vec<usize> = out
            .iter()
            .enumerate()
            .filter(|(_, l)| l.month == current)
            .map(|(i, _)| i)
            .collect();
        prop_assert_eq!(matching.len(), 1);

        let index = matching[0];
        if !had_current {
            let injected = &out[index];
            prop_assert!(injected.synthetic);
            prop_assert!(injected.transactions.is_empty());
            let expected_opening = if index == 0 {
                stored_seed
            } else {
                out[index - 1].closing_balance
            };
            prop_assert_eq!(injected.opening_balance, expected_opening);
        }
    }
}
