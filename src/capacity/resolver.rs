//! Calendar resolution: is the factory open on a date, and at what capacity.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};

use crate::models::{CalendarDay, WorkingDays};

/// Answers open/closed and capacity-multiplier queries for single dates.
///
/// Explicit calendar entries win; dates without an entry fall back to the
/// working-days bitmask with a multiplier of 1.0. Never fails: malformed
/// entries degrade to "closed".
#[derive(Debug, Clone)]
pub struct CalendarResolver {
    entries: HashMap<NaiveDate, CalendarDay>,
    working_days: WorkingDays,
}

impl CalendarResolver {
    /// Builds a resolver. Later entries for the same date replace earlier ones.
    pub fn new(calendar: &[CalendarDay], working_days: WorkingDays) -> Self {
        let mut entries = HashMap::with_capacity(calendar.len());
        for day in calendar {
            if entries.insert(day.date, day.clone()).is_some() {
                tracing::debug!(date = %day.date, "duplicate calendar entry, keeping the last one");
            }
        }
        Self {
            entries,
            working_days,
        }
    }

    /// Whether the factory is open on `date`.
    pub fn is_open(&self, date: NaiveDate) -> bool {
        match self.entries.get(&date) {
            Some(entry) => entry.is_open(),
            None => self.working_days.contains(date.weekday()),
        }
    }

    /// Capacity multiplier for `date` (1.0 without an explicit entry).
    pub fn capacity_multiplier(&self, date: NaiveDate) -> f64 {
        self.entries
            .get(&date)
            .map(CalendarDay::effective_multiplier)
            .unwrap_or(1.0)
    }

    /// Explicit entry for `date`, if any.
    pub fn entry(&self, date: NaiveDate) -> Option<&CalendarDay> {
        self.entries.get(&date)
    }

    pub fn working_days(&self) -> WorkingDays {
        self.working_days
    }
}
