//! Scheduling context for dispatching rule evaluation.

use chrono::NaiveDate;

/// Run-level facts available to dispatching rules.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulingContext {
    /// First date the run may allocate on.
    pub today: NaiveDate,
    /// Normal hours per open day.
    pub daily_hours: f64,
}

impl SchedulingContext {
    /// Creates a context for a run starting on `today` (10h days).
    pub fn at_date(today: NaiveDate) -> Self {
        Self {
            today,
            daily_hours: 10.0,
        }
    }

    /// Sets the normal hours per open day.
    pub fn with_daily_hours(mut self, daily_hours: f64) -> Self {
        self.daily_hours = daily_hours;
        self
    }
}
