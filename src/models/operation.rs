//! Operation model.
//!
//! An operation is the smallest schedulable unit of manufacturing work. It
//! belongs to a part within a job, is routed through exactly one cell, and
//! carries an estimated duration in hours.
//!
//! Job priority and due date are denormalized onto the operation so the
//! scheduler can order operations without a separate job lookup.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Lifecycle status of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    #[default]
    NotStarted,
    InProgress,
    Paused,
    Completed,
    Cancelled,
}

/// Priority of the owning job.
///
/// Unknown values deserialize as [`JobPriority::Normal`]. Variant order is
/// not the ranking; see [`JobPriority::rank`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobPriority {
    Urgent,
    High,
    Low,
    #[default]
    #[serde(other)]
    Normal,
}

impl JobPriority {
    /// Numeric rank (higher = more important).
    pub fn rank(&self) -> i32 {
        match self {
            JobPriority::Urgent => 3,
            JobPriority::High => 2,
            JobPriority::Normal => 1,
            JobPriority::Low => 0,
        }
    }
}

/// A schedulable operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Unique operation identifier.
    pub id: String,
    /// Owning job identifier.
    #[serde(default)]
    pub job_id: String,
    /// Cell this operation is routed through.
    pub cell_id: String,
    /// Estimated work in hours.
    #[serde(alias = "estimated_time")]
    pub estimated_hours: f64,
    /// Lifecycle status.
    #[serde(default)]
    pub status: OperationStatus,
    /// Existing planned start, if previously scheduled.
    #[serde(default)]
    pub planned_start: Option<NaiveDateTime>,
    /// Existing planned end, if previously scheduled.
    #[serde(default)]
    pub planned_end: Option<NaiveDateTime>,
    /// Position within the parent part's routing.
    #[serde(default)]
    pub sequence: i32,
    /// Priority of the owning job.
    #[serde(default)]
    pub job_priority: JobPriority,
    /// Due date of the owning job.
    #[serde(default)]
    pub job_due_date: Option<NaiveDate>,
}

impl Operation {
    /// Creates a not-started operation.
    pub fn new(id: impl Into<String>, cell_id: impl Into<String>, estimated_hours: f64) -> Self {
        Self {
            id: id.into(),
            job_id: String::new(),
            cell_id: cell_id.into(),
            estimated_hours,
            status: OperationStatus::NotStarted,
            planned_start: None,
            planned_end: None,
            sequence: 0,
            job_priority: JobPriority::Normal,
            job_due_date: None,
        }
    }

    pub fn with_job(mut self, job_id: impl Into<String>) -> Self {
        self.job_id = job_id.into();
        self
    }

    pub fn with_status(mut self, status: OperationStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_sequence(mut self, sequence: i32) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn with_priority(mut self, priority: JobPriority) -> Self {
        self.job_priority = priority;
        self
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.job_due_date = Some(due_date);
        self
    }

    /// Sets an existing planned window.
    pub fn with_planned(mut self, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        self.planned_start = Some(start);
        self.planned_end = Some(end);
        self
    }

    /// Whether the scheduler should place this operation.
    ///
    /// Completed and cancelled operations keep whatever schedule they have.
    pub fn is_eligible(&self) -> bool {
        !matches!(
            self.status,
            OperationStatus::Completed | OperationStatus::Cancelled
        )
    }

    /// Whether a previous run already assigned planned dates.
    pub fn has_existing_schedule(&self) -> bool {
        self.planned_start.is_some() || self.planned_end.is_some()
    }
}
