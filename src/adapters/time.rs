//! Clock adapters.
//!
//! - [`SystemClock`] — local wall clock via `chrono::Local`, for real runs.
//! - [`FixedClock`] — a settable instant for tests and `--today` overrides.

use std::cell::Cell;

use chrono::{Local, NaiveDate, NaiveDateTime};

use crate::app::ports::ClockPort;

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ClockPort for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock pinned to a chosen instant.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Cell<NaiveDateTime>,
}

impl FixedClock {
    pub fn at(now: NaiveDateTime) -> Self {
        Self { now: Cell::new(now) }
    }

    /// Noon on `date`.
    pub fn on(date: NaiveDate) -> Self {
        Self::at(date.and_hms_opt(12, 0, 0).unwrap_or_default())
    }

    pub fn set(&self, now: NaiveDateTime) {
        self.now.set(now);
    }

    pub fn advance_days(&self, days: i64) {
        self.now.set(self.now.get() + chrono::TimeDelta::days(days));
    }
}

impl ClockPort for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.now.get()
    }
}
