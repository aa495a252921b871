//! Capacity-aware day-by-day scheduler.
//!
//! # Algorithm
//!
//! 1. Validate configuration (fatal on impossible configs).
//! 2. Order operations with the rule engine (priority → due date →
//!    sequence → id by default).
//! 3. For each eligible operation, walk forward one day at a time from
//!    max(today, existing planned start), skipping closed days, and place
//!    min(remaining, available) hours into the cell's daily capacity.
//! 4. Capacity committed by earlier operations constrains later ones.
//!
//! # Complexity
//! O(n log n + n * h) where n = operations, h = horizon days.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

use crate::capacity::{CalendarResolver, CapacityTracker};
use crate::config::SchedulingConfig;
use crate::dispatching::{RuleEngine, SchedulingContext, TieBreaker};
use crate::error::{Result, ScheduleError};
use crate::models::{
    CalendarDay, Cell, DayAllocation, Operation, Placement, ScheduleResult, ScheduledOperation,
    UnscheduledReason,
};
use crate::validation;

/// Hours below this are treated as zero.
pub const HOURS_EPSILON: f64 = 1e-9;

/// Input snapshot for one scheduling run.
#[derive(Debug, Clone)]
pub struct ScheduleRequest {
    /// Operations to consider (completed/cancelled ones pass through).
    pub operations: Vec<Operation>,
    /// Cells operations may be routed to.
    pub cells: Vec<Cell>,
    /// Calendar entries covering the horizon.
    pub calendar: Vec<CalendarDay>,
    pub config: SchedulingConfig,
    /// First date the run may allocate on.
    pub today: NaiveDate,
}

impl ScheduleRequest {
    /// Creates a request with the default configuration and no calendar.
    pub fn new(operations: Vec<Operation>, cells: Vec<Cell>, today: NaiveDate) -> Self {
        Self {
            operations,
            cells,
            calendar: Vec::new(),
            config: SchedulingConfig::default(),
            today,
        }
    }

    /// Sets calendar entries.
    pub fn with_calendar(mut self, calendar: Vec<CalendarDay>) -> Self {
        self.calendar = calendar;
        self
    }

    /// Sets the configuration.
    pub fn with_config(mut self, config: SchedulingConfig) -> Self {
        self.config = config;
        self
    }

    /// Last date allocations may land on.
    pub fn horizon_end(&self) -> NaiveDate {
        self.config.horizon_end(self.today)
    }

    /// Eligible operations that already carry planned dates and would be
    /// overwritten by this run.
    pub fn operations_with_existing_schedule(&self) -> Vec<&Operation> {
        self.operations
            .iter()
            .filter(|op| op.is_eligible() && op.has_existing_schedule())
            .collect()
    }
}

/// Capacity-aware scheduler.
///
/// Pure: no I/O, no shared state. Identical requests give identical results.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use mes_schedule::models::{Cell, Operation};
/// use mes_schedule::scheduler::{ScheduleRequest, SchedulerEngine};
///
/// let monday = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
/// let request = ScheduleRequest::new(
///     vec![Operation::new("op-1", "cnc", 25.0)],
///     vec![Cell::new("cnc")],
///     monday,
/// );
///
/// let result = SchedulerEngine::new().schedule(&request).unwrap();
/// let op = result.get("op-1").unwrap();
/// assert_eq!(op.day_allocations.len(), 3); // 10h + 10h + 5h
/// ```
#[derive(Debug, Clone, Default)]
pub struct SchedulerEngine {
    rule_engine: RuleEngine,
}

impl SchedulerEngine {
    /// Creates an engine with the production ordering policy.
    pub fn new() -> Self {
        Self {
            rule_engine: RuleEngine::production_default(),
        }
    }

    /// Replaces the ordering policy.
    ///
    /// Ties left by the supplied rules are always broken by operation id.
    pub fn with_rule_engine(mut self, engine: RuleEngine) -> Self {
        self.rule_engine = engine.with_final_tie_breaker(TieBreaker::ById);
        self
    }

    /// Computes a full schedule.
    ///
    /// # Errors
    /// [`ScheduleError::Config`] when the configuration admits no capacity at
    /// all. Problems with individual operations never fail the run.
    pub fn schedule(&self, request: &ScheduleRequest) -> Result<ScheduleResult> {
        let config = &request.config;
        config.validate(&request.calendar, request.today)?;

        let horizon_end = request.horizon_end();
        let resolver = CalendarResolver::new(&request.calendar, config.working_days);
        let mut tracker = CapacityTracker::new(
            resolver,
            request.cells.iter().map(|c| c.id.clone()),
            config.daily_hours(),
        );
        let cell_ids: HashSet<&str> = request.cells.iter().map(|c| c.id.as_str()).collect();

        // First occurrence in input order keeps the id.
        let mut seen = HashSet::new();
        let duplicate: Vec<bool> = request
            .operations
            .iter()
            .map(|op| !seen.insert(op.id.as_str()))
            .collect();

        let context = SchedulingContext::at_date(request.today).with_daily_hours(config.daily_hours());
        let order = self.rule_engine.sort_indices(&request.operations, &context);

        let mut placed: Vec<Option<ScheduledOperation>> = vec![None; request.operations.len()];
        for idx in order {
            let op = &request.operations[idx];
            let outcome = if !op.is_eligible() {
                ScheduledOperation::not_eligible(op.clone())
            } else if duplicate[idx] {
                ScheduledOperation::unscheduled(op.clone(), UnscheduledReason::DuplicateOperation)
            } else if let Some(reason) = validation::operation_issue(op, &cell_ids) {
                ScheduledOperation::unscheduled(op.clone(), reason)
            } else {
                place_operation(
                    op,
                    request.today,
                    horizon_end,
                    config.factory_opening_time,
                    &mut tracker,
                )
            };

            if let Some(reason) = outcome.unscheduled_reason() {
                tracing::warn!(
                    operation_id = %op.id,
                    cell_id = %op.cell_id,
                    reason = %reason.message(),
                    "operation left unscheduled"
                );
            }
            placed[idx] = Some(outcome);
        }

        let result = ScheduleResult {
            operations: placed.into_iter().flatten().collect(),
            horizon_end,
        };

        tracing::info!(
            operations = result.operations.len(),
            scheduled = result.scheduled_count(),
            unscheduled = result.unscheduled().len(),
            hours = result.total_hours(),
            %horizon_end,
            "schedule computed"
        );

        Ok(result)
    }
}

/// Places one eligible, validated operation.
fn place_operation(
    op: &Operation,
    today: NaiveDate,
    horizon_end: NaiveDate,
    opening: NaiveTime,
    tracker: &mut CapacityTracker,
) -> ScheduledOperation {
    let candidate = op
        .planned_start
        .map(|start| start.date())
        .filter(|date| *date > today)
        .unwrap_or(today);
    let zero_hours = op.estimated_hours <= HOURS_EPSILON;

    let mut remaining = op.estimated_hours;
    let mut allocations: Vec<DayAllocation> = Vec::new();
    let mut day = candidate;

    while day <= horizon_end {
        if tracker.resolver().is_open(day) {
            if zero_hours {
                let at = day.and_time(opening);
                allocations.push(allocation(op, day, 0.0, at, at));
                remaining = 0.0;
                break;
            }

            let available = tracker.available_hours(&op.cell_id, day);
            if available > HOURS_EPSILON {
                let hours = remaining.min(available);
                let committed = tracker.committed_hours(&op.cell_id, day);
                let Some((slice_start, slice_end)) = day_slice(day, opening, committed, hours)
                else {
                    return abandon(op, &allocations, tracker, overflow(op));
                };
                allocations.push(allocation(op, day, hours, slice_start, slice_end));
                tracker.commit(&op.cell_id, day, hours);
                remaining -= hours;
                if remaining <= HOURS_EPSILON {
                    break;
                }
            }
        }

        day = match day.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    let complete = if zero_hours {
        !allocations.is_empty()
    } else {
        remaining <= HOURS_EPSILON
    };
    let horizon_exceeded = UnscheduledReason::HorizonExceeded {
        horizon_end,
        remaining_hours: remaining.max(0.0),
    };

    if !complete {
        return abandon(op, &allocations, tracker, horizon_exceeded);
    }

    let (planned_start, planned_end) = match (allocations.first(), allocations.last()) {
        (Some(first), Some(last)) => {
            let end = day_slice(last.date, opening, 0.0, last.hours_allocated).map(|(_, end)| end);
            match end {
                Some(end) => (first.date.and_time(opening), end),
                None => return abandon(op, &allocations, tracker, overflow(op)),
            }
        }
        _ => return abandon(op, &allocations, tracker, horizon_exceeded),
    };

    tracing::debug!(
        operation_id = %op.id,
        cell_id = %op.cell_id,
        days = allocations.len(),
        %planned_start,
        %planned_end,
        "operation placed"
    );

    let mut operation = op.clone();
    operation.planned_start = Some(planned_start);
    operation.planned_end = Some(planned_end);
    ScheduledOperation {
        operation,
        day_allocations: allocations,
        placement: Placement::Scheduled,
    }
}

/// Gives tentative hours back so later operations can use them.
fn abandon(
    op: &Operation,
    allocations: &[DayAllocation],
    tracker: &mut CapacityTracker,
    reason: UnscheduledReason,
) -> ScheduledOperation {
    for a in allocations {
        tracker.release(&a.cell_id, a.date, a.hours_allocated);
    }
    ScheduledOperation::unscheduled(op.clone(), reason)
}

fn overflow(op: &Operation) -> UnscheduledReason {
    UnscheduledReason::TimestampOverflow {
        estimated_hours: op.estimated_hours,
    }
}

/// Start and end of `hours` placed after `offset_hours` on `day`.
///
/// `None` when either bound is not a representable date-time.
fn day_slice(
    day: NaiveDate,
    opening: NaiveTime,
    offset_hours: f64,
    hours: f64,
) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let start = day
        .and_time(opening)
        .checked_add_signed(hours_to_delta(offset_hours)?)?;
    let end = start.checked_add_signed(hours_to_delta(hours)?)?;
    Some((start, end))
}

fn allocation(
    op: &Operation,
    date: NaiveDate,
    hours: f64,
    slice_start: NaiveDateTime,
    slice_end: NaiveDateTime,
) -> DayAllocation {
    DayAllocation {
        operation_id: op.id.clone(),
        cell_id: op.cell_id.clone(),
        date,
        hours_allocated: hours,
        slice_start,
        slice_end,
    }
}

/// Converts fractional hours to a millisecond-precision delta.
///
/// `None` when the value does not fit a [`TimeDelta`].
pub(crate) fn hours_to_delta(hours: f64) -> Option<TimeDelta> {
    let millis = (hours * 3_600_000.0).round();
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        return None;
    }
    TimeDelta::try_milliseconds(millis as i64)
}
