//! Built-in dispatching rules.
//!
//! # Categories
//!
//! - **Priority**: PRIORITY (job priority), SEQ (routing sequence)
//! - **Due-date**: EDD, MST
//! - **Time-based**: SPT
//!
//! # Score Convention
//! All rules return lower scores for operations that should be placed first.
//!
//! # References
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4
//! - Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

use chrono::Datelike;

use super::{DispatchingRule, RuleScore, SchedulingContext};
use crate::models::Operation;

// ======================== Priority-based rules ========================

/// Job priority: urgent > high > normal > low.
#[derive(Debug, Clone, Copy)]
pub struct Priority;

impl DispatchingRule for Priority {
    fn name(&self) -> &'static str {
        "PRIORITY"
    }

    fn evaluate(&self, operation: &Operation, _context: &SchedulingContext) -> RuleScore {
        -(operation.job_priority.rank() as f64)
    }

    fn description(&self) -> &'static str {
        "Job Priority"
    }
}

/// Routing sequence: earlier steps of a part first.
#[derive(Debug, Clone, Copy)]
pub struct Sequence;

impl DispatchingRule for Sequence {
    fn name(&self) -> &'static str {
        "SEQ"
    }

    fn evaluate(&self, operation: &Operation, _context: &SchedulingContext) -> RuleScore {
        operation.sequence as f64
    }

    fn description(&self) -> &'static str {
        "Routing Sequence"
    }
}

// ======================== Due-date rules ========================

/// Earliest Due Date.
///
/// Operations without a due date go last.
///
/// # Reference
/// Jackson (1955), optimal for minimizing maximum lateness on single machine.
#[derive(Debug, Clone, Copy)]
pub struct Edd;

impl DispatchingRule for Edd {
    fn name(&self) -> &'static str {
        "EDD"
    }

    fn evaluate(&self, operation: &Operation, _context: &SchedulingContext) -> RuleScore {
        operation
            .job_due_date
            .map(|d| d.num_days_from_ce() as f64)
            .unwrap_or(f64::MAX)
    }

    fn description(&self) -> &'static str {
        "Earliest Due Date"
    }
}

/// Minimum Slack Time, in days.
///
/// Slack = (due date − today) − estimated hours / daily hours.
/// Operations without a due date get maximum slack.
#[derive(Debug, Clone, Copy)]
pub struct Mst;

impl DispatchingRule for Mst {
    fn name(&self) -> &'static str {
        "MST"
    }

    fn evaluate(&self, operation: &Operation, context: &SchedulingContext) -> RuleScore {
        let due = match operation.job_due_date {
            Some(d) => d,
            None => return f64::MAX,
        };
        let days_left = (due - context.today).num_days() as f64;
        let work_days = if context.daily_hours > 0.0 && operation.estimated_hours.is_finite() {
            operation.estimated_hours / context.daily_hours
        } else {
            0.0
        };
        days_left - work_days
    }

    fn description(&self) -> &'static str {
        "Minimum Slack Time"
    }
}

// ======================== Time-based rules ========================

/// Shortest Processing Time (estimated hours).
///
/// # Reference
/// Smith (1956), optimal for minimizing mean flow time on single machine.
#[derive(Debug, Clone, Copy)]
pub struct Spt;

impl DispatchingRule for Spt {
    fn name(&self) -> &'static str {
        "SPT"
    }

    fn evaluate(&self, operation: &Operation, _context: &SchedulingContext) -> RuleScore {
        if operation.estimated_hours.is_finite() {
            operation.estimated_hours
        } else {
            f64::MAX
        }
    }

    fn description(&self) -> &'static str {
        "Shortest Processing Time"
    }
}
