//! Chronological transaction ordering.

use super::types::Transaction;

/// Sorts transactions by ascending date.
///
/// The sort is stable: transactions sharing a date keep their insertion
/// order, since nothing else disambiguates same-day entries.
pub fn sort_transactions(transactions: &mut [Transaction]) {
    transactions.sort_by_key(|tx| tx.date);
}
