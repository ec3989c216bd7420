//! ============================================================================
//! Clock - Source of "today" for the once-per-day rule
//! ============================================================================
//! Entitlements are metered in calendar days, so the only thing the engine
//! ever asks the host is today's date (local time, no time component).
//! ============================================================================

use chrono::NaiveDate;
use std::cell::Cell;
use std::rc::Rc;

use crate::types::GatekeeperError;

/// Wire format for stored dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Provides the current calendar date
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Local wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// Manually driven clock. Clones share the same date, so a test can keep a
/// handle and move time forward after handing the clock to the engine.
#[derive(Debug, Clone)]
pub struct FixedClock {
    date: Rc<Cell<NaiveDate>>,
}

impl FixedClock {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date: Rc::new(Cell::new(date)),
        }
    }

    pub fn set(&self, date: NaiveDate) {
        self.date.set(date);
    }

    /// Move forward by whole days
    pub fn advance_days(&self, days: u64) {
        let current = self.date.get();
        if let Some(next) = current.checked_add_days(chrono::Days::new(days)) {
            self.date.set(next);
        }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.date.get()
    }
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(s: &str) -> Result<NaiveDate, GatekeeperError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| GatekeeperError::InvalidDate(s.to_string()))
}
