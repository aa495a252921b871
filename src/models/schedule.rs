//! Schedule (solution) model.
//!
//! A scheduling run returns every input operation, in input order, annotated
//! with its planned window and the per-day hour allocations that make it up.
//! Operations the engine could not place carry an [`UnscheduledReason`]
//! instead of a planned window.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::Operation;

/// Hours allocated to one operation in one cell on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayAllocation {
    pub operation_id: String,
    pub cell_id: String,
    pub date: NaiveDate,
    pub hours_allocated: f64,
    /// Start of this day's slice (opening time + hours already committed
    /// to the cell that day).
    pub slice_start: NaiveDateTime,
    /// End of this day's slice.
    pub slice_end: NaiveDateTime,
}

/// Why an eligible operation received no schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum UnscheduledReason {
    /// The operation's cell is not in the supplied cell list.
    UnknownCell { cell_id: String },
    /// Estimated hours are negative or not a finite number.
    InvalidEstimate { estimated_hours: f64 },
    /// Another operation earlier in the input has the same id.
    DuplicateOperation,
    /// Not enough open capacity before the end of the calendar horizon.
    HorizonExceeded {
        horizon_end: NaiveDate,
        remaining_hours: f64,
    },
    /// A day slice or planned window falls outside the representable
    /// date-time range (absurd estimate or capacity multiplier).
    TimestampOverflow { estimated_hours: f64 },
}

impl UnscheduledReason {
    /// Human-readable description.
    pub fn message(&self) -> String {
        match self {
            UnscheduledReason::UnknownCell { cell_id } => {
                format!("cell '{cell_id}' does not exist")
            }
            UnscheduledReason::InvalidEstimate { estimated_hours } => {
                format!("invalid estimated hours: {estimated_hours}")
            }
            UnscheduledReason::DuplicateOperation => "duplicate operation id".to_string(),
            UnscheduledReason::HorizonExceeded {
                horizon_end,
                remaining_hours,
            } => format!("{remaining_hours:.2}h could not be placed before {horizon_end}"),
            UnscheduledReason::TimestampOverflow { estimated_hours } => {
                format!("{estimated_hours}h cannot be laid out as timestamps")
            }
        }
    }
}

/// Outcome of placing one operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "placement", rename_all = "snake_case")]
pub enum Placement {
    /// Planned window and allocations computed.
    Scheduled,
    /// Completed or cancelled; passed through unchanged.
    NotEligible,
    /// Eligible but could not be placed.
    Unscheduled(UnscheduledReason),
}

/// One operation of a schedule result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledOperation {
    /// The operation with `planned_start`/`planned_end` as computed.
    pub operation: Operation,
    /// Allocations in ascending date order.
    pub day_allocations: Vec<DayAllocation>,
    pub placement: Placement,
}

impl ScheduledOperation {
    /// Passes an ineligible operation through unchanged.
    pub fn not_eligible(operation: Operation) -> Self {
        Self {
            operation,
            day_allocations: Vec::new(),
            placement: Placement::NotEligible,
        }
    }

    /// Flags an operation as unscheduled and clears its planned window.
    pub fn unscheduled(mut operation: Operation, reason: UnscheduledReason) -> Self {
        operation.planned_start = None;
        operation.planned_end = None;
        Self {
            operation,
            day_allocations: Vec::new(),
            placement: Placement::Unscheduled(reason),
        }
    }

    #[inline]
    pub fn is_scheduled(&self) -> bool {
        self.placement == Placement::Scheduled
    }

    /// The unscheduled reason, if any.
    pub fn unscheduled_reason(&self) -> Option<&UnscheduledReason> {
        match &self.placement {
            Placement::Unscheduled(reason) => Some(reason),
            _ => None,
        }
    }

    /// Sum of allocated hours.
    pub fn allocated_hours(&self) -> f64 {
        self.day_allocations.iter().map(|a| a.hours_allocated).sum()
    }
}

/// A complete scheduling result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleResult {
    /// Every input operation, in input order.
    pub operations: Vec<ScheduledOperation>,
    /// Last date the run was allowed to allocate on.
    pub horizon_end: NaiveDate,
}

impl ScheduleResult {
    /// Finds the entry for an operation id (first occurrence).
    pub fn get(&self, operation_id: &str) -> Option<&ScheduledOperation> {
        self.operations
            .iter()
            .find(|s| s.operation.id == operation_id)
    }

    /// All allocations across all operations.
    pub fn allocations(&self) -> impl Iterator<Item = &DayAllocation> {
        self.operations.iter().flat_map(|s| s.day_allocations.iter())
    }

    /// Allocations for a given cell.
    pub fn allocations_for_cell(&self, cell_id: &str) -> Vec<&DayAllocation> {
        self.allocations().filter(|a| a.cell_id == cell_id).collect()
    }

    /// Hours allocated to a cell on a date.
    pub fn hours_on(&self, cell_id: &str, date: NaiveDate) -> f64 {
        self.allocations()
            .filter(|a| a.cell_id == cell_id && a.date == date)
            .map(|a| a.hours_allocated)
            .sum()
    }

    /// Operations that received a schedule.
    pub fn scheduled(&self) -> impl Iterator<Item = &ScheduledOperation> {
        self.operations.iter().filter(|s| s.is_scheduled())
    }

    /// Eligible operations that could not be placed.
    pub fn unscheduled(&self) -> Vec<&ScheduledOperation> {
        self.operations
            .iter()
            .filter(|s| s.unscheduled_reason().is_some())
            .collect()
    }

    pub fn scheduled_count(&self) -> usize {
        self.scheduled().count()
    }

    /// Total allocated hours.
    pub fn total_hours(&self) -> f64 {
        self.allocations().map(|a| a.hours_allocated).sum()
    }
}
