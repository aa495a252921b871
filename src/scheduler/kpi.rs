//! Schedule quality metrics (KPIs).
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Scheduled / Unscheduled | Count of eligible operations placed / not placed |
//! | Total Hours | Sum of allocated hours |
//! | Late Operations | planned_end date after the job due date |
//! | On-Time Rate | Fraction of scheduled operations with a due date that are not late |
//! | Utilization | allocated hours / capacity over each cell's allocated span |
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 1.2: Performance Measures

use std::collections::HashMap;

use chrono::NaiveDate;

use super::ScheduleRequest;
use crate::capacity::{CalendarResolver, CapacityTracker};
use crate::models::ScheduleResult;

/// Schedule performance indicators.
#[derive(Debug, Clone)]
pub struct ScheduleKpi {
    pub scheduled_count: usize,
    pub unscheduled_count: usize,
    /// Sum of allocated hours.
    pub total_hours: f64,
    /// Ids of scheduled operations finishing after their due date.
    pub late_operations: Vec<String>,
    /// Fraction of scheduled operations with a due date that finish on time.
    pub on_time_rate: f64,
    /// Per-cell utilization (0.0..1.0) between first and last allocated day.
    pub utilization_by_cell: HashMap<String, f64>,
    /// Mean of per-cell utilization.
    pub avg_utilization: f64,
}

impl ScheduleKpi {
    /// Computes KPIs from a result and the request that produced it.
    pub fn calculate(result: &ScheduleResult, request: &ScheduleRequest) -> Self {
        let mut late_operations = Vec::new();
        let mut with_due_date = 0usize;

        for s in result.scheduled() {
            if let (Some(due), Some(end)) = (s.operation.job_due_date, s.operation.planned_end) {
                with_due_date += 1;
                if end.date() > due {
                    late_operations.push(s.operation.id.clone());
                }
            }
        }

        let on_time_rate = if with_due_date == 0 {
            1.0
        } else {
            (with_due_date - late_operations.len()) as f64 / with_due_date as f64
        };

        let utilization_by_cell = cell_utilization(result, request);
        let avg_utilization = if utilization_by_cell.is_empty() {
            0.0
        } else {
            utilization_by_cell.values().sum::<f64>() / utilization_by_cell.len() as f64
        };

        Self {
            scheduled_count: result.scheduled_count(),
            unscheduled_count: result.unscheduled().len(),
            total_hours: result.total_hours(),
            late_operations,
            on_time_rate,
            utilization_by_cell,
            avg_utilization,
        }
    }

    /// Whether the schedule meets the given quality thresholds.
    pub fn meets_thresholds(&self, max_late: usize, min_on_time_rate: f64) -> bool {
        self.late_operations.len() <= max_late && self.on_time_rate >= min_on_time_rate
    }
}

fn cell_utilization(result: &ScheduleResult, request: &ScheduleRequest) -> HashMap<String, f64> {
    let mut spans: HashMap<&str, (NaiveDate, NaiveDate, f64)> = HashMap::new();
    for a in result.allocations() {
        let entry = spans
            .entry(a.cell_id.as_str())
            .or_insert((a.date, a.date, 0.0));
        entry.0 = entry.0.min(a.date);
        entry.1 = entry.1.max(a.date);
        entry.2 += a.hours_allocated;
    }

    let resolver = CalendarResolver::new(&request.calendar, request.config.working_days);
    let tracker = CapacityTracker::new(
        resolver,
        request.cells.iter().map(|c| c.id.clone()),
        request.config.daily_hours(),
    );

    spans
        .into_iter()
        .filter_map(|(cell, (first, last, hours))| {
            let capacity: f64 = first
                .iter_days()
                .take_while(|d| *d <= last)
                .map(|d| tracker.daily_capacity(cell, d))
                .sum();
            (capacity > 0.0).then(|| (cell.to_string(), hours / capacity))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CalendarDay, Cell, JobPriority, Operation};
    use crate::scheduler::SchedulerEngine;

    fn day(offset: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19 + offset).unwrap()
    }

    fn kpi_for(request: &ScheduleRequest) -> ScheduleKpi {
        let result = SchedulerEngine::new().schedule(request).unwrap();
        ScheduleKpi::calculate(&result, request)
    }

    #[test]
    fn test_counts_and_hours() {
        let request = ScheduleRequest::new(
            vec![
                Operation::new("a", "C1", 6.0),
                Operation::new("b", "C1", 6.0),
                Operation::new("x", "missing", 1.0),
            ],
            vec![Cell::new("C1")],
            day(0),
        );
        let kpi = kpi_for(&request);
        assert_eq!(kpi.scheduled_count, 2);
        assert_eq!(kpi.unscheduled_count, 1);
        assert!((kpi.total_hours - 12.0).abs() < 1e-10);
    }

    #[test]
    fn test_late_operations() {
        // Urgent op eats Monday, so the normal one finishes Tuesday
        let request = ScheduleRequest::new(
            vec![
                Operation::new("urgent", "C1", 10.0).with_priority(JobPriority::Urgent),
                Operation::new("due-monday", "C1", 2.0).with_due_date(day(0)),
                Operation::new("due-friday", "C1", 2.0).with_due_date(day(4)),
            ],
            vec![Cell::new("C1")],
            day(0),
        );
        let kpi = kpi_for(&request);
        assert_eq!(kpi.late_operations, vec!["due-monday".to_string()]);
        assert!((kpi.on_time_rate - 0.5).abs() < 1e-10);
        assert!(!kpi.meets_thresholds(0, 0.9));
        assert!(kpi.meets_thresholds(1, 0.5));
    }

    #[test]
    fn test_utilization_over_span() {
        // 15h on a 10h/day cell: Mon 10h + Tue 5h over 20h of capacity
        let request = ScheduleRequest::new(
            vec![Operation::new("a", "C1", 15.0)],
            vec![Cell::new("C1")],
            day(0),
        );
        let kpi = kpi_for(&request);
        assert!((kpi.utilization_by_cell["C1"] - 0.75).abs() < 1e-10);
        assert!((kpi.avg_utilization - 0.75).abs() < 1e-10);
    }

    #[test]
    fn test_utilization_skips_closed_days() {
        let request = ScheduleRequest::new(
            vec![Operation::new("a", "C1", 20.0)],
            vec![Cell::new("C1")],
            day(0),
        )
        .with_calendar(vec![CalendarDay::non_working(day(1))]);
        let kpi = kpi_for(&request);
        // Mon + Wed fully used, Tue closed contributes no capacity
        assert!((kpi.utilization_by_cell["C1"] - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_empty_schedule() {
        let request = ScheduleRequest::new(vec![], vec![], day(0));
        let kpi = kpi_for(&request);
        assert_eq!(kpi.scheduled_count, 0);
        assert_eq!(kpi.on_time_rate, 1.0);
        assert_eq!(kpi.avg_utilization, 0.0);
        assert!(kpi.utilization_by_cell.is_empty());
    }
}
