//! Currency amount helpers.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts are `rust_decimal::Decimal` everywhere; floats only appear at the
//! JSON boundary.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places kept for currency values.
pub const CURRENCY_SCALE: u32 = 2;

/// Largest absolute amount accepted for a single transaction.
pub const MAX_TRANSACTION_AMOUNT: Decimal = Decimal::from_parts(1_215_752_191, 23, 0, false, 2);

/// Rounds a value to currency precision, midpoints away from zero.
#[must_use]
pub fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Strips thousands separators, currency symbols and whitespace.
///
/// `"$1,234.50"` becomes `"1234.50"`.
#[must_use]
pub fn normalize_amount(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != ',' && *c != '$' && !c.is_whitespace())
        .collect()
}

/// Parses a user- or bank-supplied amount string.
///
/// Returns `None` for anything that is not a plain decimal number after
/// normalization.
#[must_use]
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let normalized = normalize_amount(raw);
    if normalized.is_empty() {
        return None;
    }
    Decimal::from_str(&normalized).ok()
}

/// Returns true if the value carries no more than two significant decimal places.
#[must_use]
pub fn has_currency_precision(value: Decimal) -> bool {
    value.normalize().scale() <= CURRENCY_SCALE
}
