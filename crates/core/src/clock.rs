//! Source of the current date and month.
//!
//! The reconciler never reads the wall clock itself; callers inject a
//! [`Clock`] so "now" is explicit and tests can pin it.

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use committee_shared::types::Month;
use committee_shared::{AppError, AppResult};

/// Provides the current calendar date.
pub trait Clock: Send + Sync {
    /// Today's date.
    fn today(&self) -> NaiveDate;

    /// Month containing [`Clock::today`].
    fn current_month(&self) -> Month {
        Month::of(self.today())
    }
}

/// Wall clock evaluated in a fixed IANA time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemClock {
    tz: Tz,
}

impl SystemClock {
    /// Clock in the given time zone.
    #[must_use]
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Clock in a time zone named like `Australia/Perth`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidTimezone`] for an unknown zone name.
    pub fn from_name(name: &str) -> AppResult<Self> {
        let name = name.trim();
        let tz = name.parse::<Tz>().map_err(|e| AppError::InvalidTimezone {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::new(tz))
    }

    /// Configured time zone.
    #[must_use]
    pub fn timezone(&self) -> Tz {
        self.tz
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(Tz::UTC)
    }
}

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.tz).date_naive()
    }
}

/// Clock pinned to one month. Today is the month's last day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub Month);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0.last_day()
    }

    fn current_month(&self) -> Month {
        self.0
    }
}
