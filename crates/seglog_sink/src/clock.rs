//! Calendar source for date-based rotation.

use chrono::{Days, Local, NaiveDate};
use parking_lot::Mutex;
use std::fmt;

/// Supplies the current calendar day to a [`super::RotatingFileWriter`].
pub trait Clock: Send + Sync + fmt::Debug {
    /// Today's date in the clock's time zone.
    fn today(&self) -> NaiveDate;
}

/// The local wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock that only moves when told to.
///
/// Used to simulate day boundaries in tests and tools.
#[derive(Debug)]
pub struct ManualClock {
    day: Mutex<NaiveDate>,
}

impl ManualClock {
    /// Creates a clock fixed at `day`.
    #[must_use]
    pub fn new(day: NaiveDate) -> Self {
        Self {
            day: Mutex::new(day),
        }
    }

    /// Moves the clock to `day`.
    pub fn set(&self, day: NaiveDate) {
        *self.day.lock() = day;
    }

    /// Moves the clock forward by `days`.
    pub fn advance_days(&self, days: u64) {
        let mut day = self.day.lock();
        if let Some(next) = day.checked_add_days(Days::new(days)) {
            *day = next;
        }
    }
}

impl Clock for ManualClock {
    fn today(&self) -> NaiveDate {
        *self.day.lock()
    }
}
