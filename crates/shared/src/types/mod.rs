//! Common types used across the workspace.

pub mod id;
pub mod money;
pub mod month;

pub use id::TransactionId;
pub use money::{round_currency, CURRENCY_SCALE};
pub use month::{Month, MonthParseError};
