//! Per-cell, per-day hour ledger for a single scheduling run.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use super::CalendarResolver;

/// Tracks hours committed per (cell, date) against derived daily capacity.
///
/// Daily capacity = `daily_hours` × calendar multiplier, or 0 when the
/// calendar says closed or the cell is unknown. One tracker belongs to one
/// run; nothing carries over between runs.
#[derive(Debug, Clone)]
pub struct CapacityTracker {
    resolver: CalendarResolver,
    cells: HashSet<String>,
    daily_hours: f64,
    committed: HashMap<String, HashMap<NaiveDate, f64>>,
}

impl CapacityTracker {
    /// Creates an empty ledger.
    ///
    /// A non-positive or non-finite `daily_hours` yields zero capacity on
    /// every date.
    pub fn new(
        resolver: CalendarResolver,
        cells: impl IntoIterator<Item = String>,
        daily_hours: f64,
    ) -> Self {
        let daily_hours = if daily_hours.is_finite() && daily_hours > 0.0 {
            daily_hours
        } else {
            0.0
        };
        Self {
            resolver,
            cells: cells.into_iter().collect(),
            daily_hours,
            committed: HashMap::new(),
        }
    }

    pub fn resolver(&self) -> &CalendarResolver {
        &self.resolver
    }

    pub fn has_cell(&self, cell_id: &str) -> bool {
        self.cells.contains(cell_id)
    }

    /// Capacity of a cell on a date before any commitments.
    pub fn daily_capacity(&self, cell_id: &str, date: NaiveDate) -> f64 {
        if !self.has_cell(cell_id) || !self.resolver.is_open(date) {
            return 0.0;
        }
        (self.daily_hours * self.resolver.capacity_multiplier(date)).max(0.0)
    }

    /// Hours already committed to a cell on a date in this run.
    pub fn committed_hours(&self, cell_id: &str, date: NaiveDate) -> f64 {
        self.committed
            .get(cell_id)
            .and_then(|days| days.get(&date))
            .copied()
            .unwrap_or(0.0)
    }

    /// Remaining capacity, floored at zero.
    pub fn available_hours(&self, cell_id: &str, date: NaiveDate) -> f64 {
        (self.daily_capacity(cell_id, date) - self.committed_hours(cell_id, date)).max(0.0)
    }

    /// Records hours used. Non-positive amounts are ignored.
    pub fn commit(&mut self, cell_id: &str, date: NaiveDate, hours: f64) {
        if hours.is_nan() || hours <= 0.0 {
            return;
        }
        *self
            .committed
            .entry(cell_id.to_string())
            .or_default()
            .entry(date)
            .or_insert(0.0) += hours;
    }

    /// Returns previously committed hours to the pool.
    pub fn release(&mut self, cell_id: &str, date: NaiveDate, hours: f64) {
        if let Some(slot) = self
            .committed
            .get_mut(cell_id)
            .and_then(|days| days.get_mut(&date))
        {
            *slot = (*slot - hours).max(0.0);
        }
    }

    /// Clears all commitments.
    pub fn reset(&mut self) {
        self.committed.clear();
    }
}
