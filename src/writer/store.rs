//! Storage ports for the schedule writer and the auto-schedule service.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::models::{
    CalendarDay, Cell, DayAllocation, Job, Operation, Placement, ScheduledOperation,
    UnscheduledReason,
};

/// New schedule for one operation, guarded by the values the run read.
///
/// An update with no planned window and no allocations clears the
/// operation's stored schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationScheduleUpdate {
    pub operation_id: String,
    /// `planned_start` observed in the snapshot.
    pub expected_start: Option<NaiveDateTime>,
    /// `planned_end` observed in the snapshot.
    pub expected_end: Option<NaiveDateTime>,
    pub planned_start: Option<NaiveDateTime>,
    pub planned_end: Option<NaiveDateTime>,
    /// Replaces every stored allocation of this operation.
    pub allocations: Vec<DayAllocation>,
}

impl OperationScheduleUpdate {
    /// Builds the update for one entry of a schedule result.
    ///
    /// Scheduled entries carry their new window and allocations. Unscheduled
    /// entries clear both. Returns `None` for entries that must not touch
    /// the store: not-eligible operations, and duplicate ids whose row
    /// belongs to the first occurrence.
    pub fn from_scheduled(scheduled: &ScheduledOperation, previous: &Operation) -> Option<Self> {
        match &scheduled.placement {
            Placement::NotEligible
            | Placement::Unscheduled(UnscheduledReason::DuplicateOperation) => return None,
            Placement::Scheduled | Placement::Unscheduled(_) => {}
        }
        Some(Self {
            operation_id: scheduled.operation.id.clone(),
            expected_start: previous.planned_start,
            expected_end: previous.planned_end,
            planned_start: scheduled.operation.planned_start,
            planned_end: scheduled.operation.planned_end,
            allocations: scheduled.day_allocations.clone(),
        })
    }

    /// Whether this update removes the stored schedule.
    pub fn is_clearing(&self) -> bool {
        self.planned_start.is_none() && self.allocations.is_empty()
    }
}

/// Write side of the schedule persistence.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Atomically, for one operation: check the stored planned window still
    /// equals `expected_*`, delete its day allocations, insert
    /// `allocations`, and set the new planned window (possibly empty).
    ///
    /// # Errors
    /// [`StoreError::Conflict`] when the stored window changed since the
    /// snapshot; [`StoreError::Unavailable`] for retryable failures.
    async fn apply_operation_schedule(
        &self,
        update: &OperationScheduleUpdate,
    ) -> Result<(), StoreError>;
}

/// Read side: the snapshot a scheduling run works from.
#[async_trait]
pub trait ScheduleSource: Send + Sync {
    async fn load_jobs(&self) -> Result<Vec<Job>, StoreError>;

    async fn load_operations(&self) -> Result<Vec<Operation>, StoreError>;

    async fn load_cells(&self) -> Result<Vec<Cell>, StoreError>;

    /// Calendar entries with `from <= date <= to`.
    async fn load_calendar(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<CalendarDay>, StoreError>;
}
