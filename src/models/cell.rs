//! Production cell model.
//!
//! A cell is a work-center that operations are routed through. It does not
//! store hour capacity: daily hours are derived from factory opening hours
//! and the production calendar, and tracked per run by
//! [`CapacityTracker`](crate::capacity::CapacityTracker).

use serde::{Deserialize, Serialize};

/// A production cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Unique cell identifier.
    pub id: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Maximum concurrently in-progress operations (not used for hours).
    #[serde(default)]
    pub wip_limit: Option<u32>,
    /// WIP count at which the floor UI starts warning.
    #[serde(default)]
    pub wip_warning_threshold: Option<u32>,
}

impl Cell {
    /// Creates a cell.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            wip_limit: None,
            wip_warning_threshold: None,
        }
    }

    /// Sets the cell name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the WIP limit and warning threshold.
    pub fn with_wip_limit(mut self, limit: u32, warning_threshold: Option<u32>) -> Self {
        self.wip_limit = Some(limit);
        self.wip_warning_threshold = warning_threshold;
        self
    }
}

/// A job, as loaded from storage. Supplies priority and due date to its
/// operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Unique job identifier.
    pub id: String,
    /// Scheduling priority.
    #[serde(default)]
    pub priority: super::JobPriority,
    /// Requested completion date.
    #[serde(default)]
    pub due_date: Option<chrono::NaiveDate>,
}

impl Job {
    /// Creates a normal-priority job without a due date.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            priority: super::JobPriority::Normal,
            due_date: None,
        }
    }

    pub fn with_priority(mut self, priority: super::JobPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_due_date(mut self, due_date: chrono::NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }
}
