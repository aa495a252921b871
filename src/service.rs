//! Auto-schedule action.
//!
//! Loads a snapshot from the store, asks for confirmation before replacing
//! existing plans, runs the engine and writes the result back.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::{SchedulerSettings, SchedulingConfig};
use crate::error::Result;
use crate::models::{Job, Operation, ScheduleResult};
use crate::scheduler::{ScheduleRequest, SchedulerEngine};
use crate::writer::{ScheduleSource, ScheduleStore, ScheduleWriter, WriteReport};

/// Options for one auto-schedule run.
#[derive(Debug, Clone, Default)]
pub struct AutoScheduleOptions {
    /// First schedulable date. Defaults to the local date.
    pub today: Option<NaiveDate>,
    /// Replace plans that already exist without asking.
    pub confirm_overwrite: bool,
}

impl AutoScheduleOptions {
    pub fn at_date(today: NaiveDate) -> Self {
        Self {
            today: Some(today),
            ..Self::default()
        }
    }

    pub fn confirmed(mut self) -> Self {
        self.confirm_overwrite = true;
        self
    }
}

/// Aggregate counts for the user-facing notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AutoScheduleSummary {
    pub scheduled: usize,
    pub unscheduled: usize,
    pub written: usize,
    pub conflicts: usize,
    pub failed: usize,
}

impl AutoScheduleSummary {
    fn new(result: &ScheduleResult, report: &WriteReport) -> Self {
        Self {
            scheduled: result.scheduled_count(),
            unscheduled: result.unscheduled().len(),
            written: report.written_count(),
            conflicts: report.conflict_count(),
            failed: report.failed_count(),
        }
    }

    /// One-line message, e.g. "Scheduled 12 operations (2 unscheduled)".
    pub fn message(&self) -> String {
        let mut msg = format!("Scheduled {} operations", self.scheduled);
        let mut notes = Vec::new();
        if self.unscheduled > 0 {
            notes.push(format!("{} unscheduled", self.unscheduled));
        }
        if self.conflicts > 0 {
            notes.push(format!("{} changed concurrently", self.conflicts));
        }
        if self.failed > 0 {
            notes.push(format!("{} failed to save", self.failed));
        }
        if !notes.is_empty() {
            msg.push_str(&format!(" ({})", notes.join(", ")));
        }
        msg
    }
}

/// Result of [`AutoScheduleService::run`].
#[derive(Debug, Clone)]
pub enum AutoScheduleOutcome {
    /// Existing plans would be replaced; nothing was computed or written.
    ConfirmationRequired { existing: Vec<String> },
    Completed {
        result: ScheduleResult,
        report: WriteReport,
        summary: AutoScheduleSummary,
    },
}

impl AutoScheduleOutcome {
    pub fn summary(&self) -> Option<&AutoScheduleSummary> {
        match self {
            AutoScheduleOutcome::Completed { summary, .. } => Some(summary),
            AutoScheduleOutcome::ConfirmationRequired { .. } => None,
        }
    }
}

/// The "auto-schedule" action over a store.
#[derive(Debug)]
pub struct AutoScheduleService<S> {
    store: Arc<S>,
    config: SchedulingConfig,
    engine: SchedulerEngine,
    writer: ScheduleWriter,
}

impl<S> AutoScheduleService<S>
where
    S: ScheduleSource + ScheduleStore,
{
    pub fn new(store: Arc<S>, config: SchedulingConfig) -> Self {
        Self {
            store,
            config,
            engine: SchedulerEngine::new(),
            writer: ScheduleWriter::default(),
        }
    }

    pub fn from_settings(store: Arc<S>, settings: SchedulerSettings) -> Self {
        Self::new(store, settings.scheduling).with_writer(ScheduleWriter::new(settings.writer))
    }

    pub fn with_engine(mut self, engine: SchedulerEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_writer(mut self, writer: ScheduleWriter) -> Self {
        self.writer = writer;
        self
    }

    /// Runs one auto-schedule pass.
    ///
    /// # Errors
    /// Fails when the snapshot cannot be loaded or the configuration is
    /// unusable. Per-operation write failures are reported in the outcome.
    pub async fn run(&self, options: AutoScheduleOptions) -> Result<AutoScheduleOutcome> {
        let today = options
            .today
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        let horizon_end = self.config.horizon_end(today);

        let (jobs, operations, cells, calendar) = tokio::try_join!(
            self.store.load_jobs(),
            self.store.load_operations(),
            self.store.load_cells(),
            self.store.load_calendar(today, horizon_end),
        )?;
        tracing::debug!(
            jobs = jobs.len(),
            operations = operations.len(),
            cells = cells.len(),
            calendar_days = calendar.len(),
            "scheduling snapshot loaded"
        );

        let operations = join_jobs(operations, &jobs);
        let request = ScheduleRequest::new(operations, cells, today)
            .with_calendar(calendar)
            .with_config(self.config.clone());

        let existing: Vec<String> = request
            .operations_with_existing_schedule()
            .into_iter()
            .map(|op| op.id.clone())
            .collect();
        if !existing.is_empty() && !options.confirm_overwrite {
            tracing::info!(
                existing = existing.len(),
                "existing schedules found, confirmation required"
            );
            return Ok(AutoScheduleOutcome::ConfirmationRequired { existing });
        }

        let result = self.engine.schedule(&request)?;
        let report = self
            .writer
            .write(self.store.as_ref(), &result, &request.operations)
            .await;
        let summary = AutoScheduleSummary::new(&result, &report);
        tracing::info!(
            scheduled = summary.scheduled,
            unscheduled = summary.unscheduled,
            written = summary.written,
            conflicts = summary.conflicts,
            failed = summary.failed,
            "auto-schedule finished"
        );

        Ok(AutoScheduleOutcome::Completed {
            result,
            report,
            summary,
        })
    }
}

/// Copies job priority and due date onto each operation of that job.
fn join_jobs(mut operations: Vec<Operation>, jobs: &[Job]) -> Vec<Operation> {
    let by_id: HashMap<&str, &Job> = jobs.iter().map(|j| (j.id.as_str(), j)).collect();
    for op in &mut operations {
        if let Some(job) = by_id.get(op.job_id.as_str()) {
            op.job_priority = job.priority;
            op.job_due_date = job.due_date;
        }
    }
    operations
}
