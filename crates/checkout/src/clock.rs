//! Source of "today" for card expiration ranges.

use chrono::{Datelike, Local, NaiveDate};

/// Supplies the current date.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;

    /// Current month, 1-based.
    fn current_month(&self) -> u32 {
        self.today().month()
    }

    fn current_year(&self) -> i32 {
        self.today().year()
    }
}

/// The local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock stuck on one date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl FixedClock {
    /// A clock on the first day of the given month.
    ///
    /// Returns `None` for an invalid year/month.
    #[must_use]
    pub fn on(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Self)
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
