//! Calendar month (`YYYY-MM`) value type.
//!
//! Ledgers are partitioned by calendar month. `Month` orders by (year, month),
//! which is the same order as the lexical order of its `YYYY-MM` form for all
//! four-digit years.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a string is not a valid `YYYY-MM` month.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid month '{0}', expected YYYY-MM")]
pub struct MonthParseError(pub String);

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    /// Creates a month, returning `None` when out of range.
    #[must_use]
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) && (0..=9999).contains(&year) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// The month containing `date`.
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Calendar year.
    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    /// Month number, 1-12.
    #[must_use]
    pub const fn month(self) -> u32 {
        self.month
    }

    /// The month before this one.
    #[must_use]
    pub fn pred(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// The month after this one.
    #[must_use]
    pub fn succ(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// First day of the month.
    #[must_use]
    pub fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Last day of the month.
    #[must_use]
    pub fn last_day(self) -> NaiveDate {
        self.succ()
            .first_day()
            .pred_opt()
            .unwrap_or(NaiveDate::MAX)
    }

    /// Returns true if `date` falls within this month.
    #[must_use]
    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = MonthParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || MonthParseError(s.to_string());
        let (year, month) = s.split_once('-').ok_or_else(err)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(err());
        }
        if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        let year: i32 = year.parse().map_err(|_| err())?;
        let month: u32 = month.parse().map_err(|_| err())?;
        Self::new(year, month).ok_or_else(err)
    }
}

impl TryFrom<String> for Month {
    type Error = MonthParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Month> for String {
    fn from(value: Month) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn month(s: &str) -> Month {
        s.parse().unwrap()
    }

    #[rstest]
    #[case("2025-01", 2025, 1)]
    #[case("1999-12", 1999, 12)]
    #[case("0001-06", 1, 6)]
    fn test_parse_valid(#[case] raw: &str, #[case] year: i32, #[case] m: u32) {
        let parsed = month(raw);
        assert_eq!(parsed.year(), year);
        assert_eq!(parsed.month(), m);
        assert_eq!(parsed.to_string(), raw);
    }

    #[rstest]
    #[case("2025-13")]
    #[case("2025-00")]
    #[case("2025-1")]
    #[case("25-01")]
    #[case("2025/01")]
    #[case("2025-01-05")]
    #[case("+025-01")]
    #[case("")]
    fn test_parse_invalid(#[case] raw: &str) {
        assert_eq!(raw.parse::<Month>(), Err(MonthParseError(raw.to_string())));
    }

    #[test]
    fn test_order_matches_lexical_order() {
        let mut months = vec![month("2025-02"), month("2024-12"), month("2025-10"), month("2025-01")];
        let mut labels: Vec<String> = months.iter().map(ToString::to_string).collect();
        months.sort();
        labels.sort();
        let sorted: Vec<String> = months.iter().map(ToString::to_string).collect();
        assert_eq!(sorted, labels);
    }

    #[test]
    fn test_pred_and_succ_wrap_years() {
        assert_eq!(month("2025-01").pred(), month("2024-12"));
        assert_eq!(month("2024-12").succ(), month("2025-01"));
        assert_eq!(month("2025-06").pred().succ(), month("2025-06"));
    }

    #[test]
    fn test_day_bounds() {
        let feb = month("2024-02");
        assert_eq!(feb.first_day(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(feb.last_day(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(
            month("2025-12").last_day(),
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()
        );
    }

    #[test]
    fn test_contains() {
        let jan = month("2025-01");
        assert!(jan.contains(NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()));
        assert!(!jan.contains(NaiveDate::from_ymd_opt(2025, 2, 1).unwrap()));
        assert!(!jan.contains(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()));
        assert_eq!(Month::of(NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()), jan);
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&month("2025-03")).unwrap();
        assert_eq!(json, "\"2025-03\"");
        let back: Month = serde_json::from_str(&json).unwrap();
        assert_eq!(back, month("2025-03"));
        assert!(serde_json::from_str::<Month>("\"2025-3\"").is_err());
    }
}
