//! Schedule write-back.
//!
//! Persists a [`ScheduleResult`] one operation at a time: each operation's
//! allocations are replaced and its planned window is set in a single
//! atomic store call, so re-running a schedule never duplicates rows and a
//! failure on one operation leaves the others written. Operations the run
//! could not place have their stored window and allocations cleared.
//!
//! Transient failures are retried with linear backoff. A concurrent
//! reschedule (the stored window no longer matches the snapshot) is
//! reported as a conflict and not retried.

mod memory;
mod store;

pub use memory::InMemoryScheduleStore;
pub use store::{OperationScheduleUpdate, ScheduleSource, ScheduleStore};

use std::collections::HashMap;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use serde::Serialize;

use crate::config::WriterConfig;
use crate::error::StoreError;
use crate::models::{Operation, ScheduleResult, ScheduledOperation};

/// Final state of one operation's write-back.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WriteStatus {
    Written { attempts: u32 },
    /// Another writer changed the operation after the snapshot was read.
    Conflict,
    Failed { error: String, attempts: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationWriteOutcome {
    pub operation_id: String,
    #[serde(flatten)]
    pub status: WriteStatus,
}

/// Per-operation write-back report.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WriteReport {
    /// One entry per scheduled or cleared operation, sorted by id.
    pub outcomes: Vec<OperationWriteOutcome>,
    /// Operations not written: not eligible, or duplicate ids.
    pub skipped: Vec<String>,
}

impl WriteReport {
    pub fn written_count(&self) -> usize {
        self.count(|s| matches!(s, WriteStatus::Written { .. }))
    }

    pub fn conflict_count(&self) -> usize {
        self.count(|s| matches!(s, WriteStatus::Conflict))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|s| matches!(s, WriteStatus::Failed { .. }))
    }

    /// True when every update was written.
    pub fn is_complete(&self) -> bool {
        self.written_count() == self.outcomes.len()
    }

    /// Ids of operations that were not written (failed or conflicting).
    pub fn failed_ids(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| !matches!(o.status, WriteStatus::Written { .. }))
            .map(|o| o.operation_id.as_str())
            .collect()
    }

    pub fn outcome(&self, operation_id: &str) -> Option<&WriteStatus> {
        self.outcomes
            .iter()
            .find(|o| o.operation_id == operation_id)
            .map(|o| &o.status)
    }

    fn count(&self, pred: impl Fn(&WriteStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}

/// Writes schedule results back through a [`ScheduleStore`].
#[derive(Debug, Clone, Default)]
pub struct ScheduleWriter {
    config: WriterConfig,
}

impl ScheduleWriter {
    pub fn new(config: WriterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    /// Writes every scheduled operation of `result` and clears the stored
    /// schedule of every unscheduled one.
    ///
    /// `snapshot` is the operation list the run was computed from; its
    /// planned windows guard against concurrent reschedules. For a repeated
    /// id the first occurrence is the one the run scheduled.
    pub async fn write<S>(
        &self,
        store: &S,
        result: &ScheduleResult,
        snapshot: &[Operation],
    ) -> WriteReport
    where
        S: ScheduleStore + ?Sized,
    {
        let mut previous: HashMap<&str, &Operation> = HashMap::with_capacity(snapshot.len());
        for op in snapshot {
            previous.entry(op.id.as_str()).or_insert(op);
        }

        let mut updates = Vec::new();
        let mut skipped = Vec::new();
        for scheduled in &result.operations {
            match self.prepare(scheduled, &previous) {
                Some(update) => updates.push(update),
                None => skipped.push(scheduled.operation.id.clone()),
            }
        }

        let mut outcomes: Vec<OperationWriteOutcome> = stream::iter(updates)
            .map(|update| async move {
                let status = self.write_one(store, &update).await;
                OperationWriteOutcome {
                    operation_id: update.operation_id,
                    status,
                }
            })
            .buffer_unordered(self.config.concurrency.max(1))
            .collect()
            .await;
        outcomes.sort_by(|a, b| a.operation_id.cmp(&b.operation_id));

        let report = WriteReport { outcomes, skipped };
        tracing::info!(
            written = report.written_count(),
            conflicts = report.conflict_count(),
            failed = report.failed_count(),
            skipped = report.skipped.len(),
            "schedule write-back finished"
        );
        report
    }

    fn prepare(
        &self,
        scheduled: &ScheduledOperation,
        previous: &HashMap<&str, &Operation>,
    ) -> Option<OperationScheduleUpdate> {
        let previous = previous
            .get(scheduled.operation.id.as_str())
            .copied()
            .unwrap_or(&scheduled.operation);
        OperationScheduleUpdate::from_scheduled(scheduled, previous)
    }

    async fn write_one<S>(&self, store: &S, update: &OperationScheduleUpdate) -> WriteStatus
    where
        S: ScheduleStore + ?Sized,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match store.apply_operation_schedule(update).await {
                Ok(()) => return WriteStatus::Written { attempts: attempt },
                Err(StoreError::Conflict { .. }) => {
                    tracing::warn!(
                        operation_id = %update.operation_id,
                        "operation rescheduled concurrently, not overwriting"
                    );
                    return WriteStatus::Conflict;
                }
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    tracing::warn!(
                        operation_id = %update.operation_id,
                        attempt,
                        error = %e,
                        "schedule write failed, retrying"
                    );
                    let delay = self.config.retry_backoff_ms * u64::from(attempt);
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
                Err(e) => {
                    tracing::error!(
                        operation_id = %update.operation_id,
                        attempts = attempt,
                        error = %e,
                        "schedule write failed"
                    );
                    return WriteStatus::Failed {
                        error: e.to_string(),
                        attempts: attempt,
                    };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::models::Cell;
    use crate::scheduler::{ScheduleRequest, SchedulerEngine};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn fast_writer(max_attempts: u32) -> ScheduleWriter {
        ScheduleWriter::new(WriterConfig {
            max_attempts,
            retry_backoff_ms: 0,
            concurrency: 4,
        })
    }

    fn make_ops() -> Vec<Operation> {
        vec![
            Operation::new("O1", "C1", 12.0),
            Operation::new("O2", "C1", 4.0),
            Operation::new("O3", "C2", 3.0),
            Operation::new("X", "missing", 1.0),
        ]
    }

    fn make_store(ops: &[Operation]) -> InMemoryScheduleStore {
        InMemoryScheduleStore::new()
            .with_operations(ops.to_vec())
            .with_cells(vec![Cell::new("C1"), Cell::new("C2")])
    }

    fn schedule(ops: &[Operation]) -> ScheduleResult {
        let request =
            ScheduleRequest::new(ops.to_vec(), vec![Cell::new("C1"), Cell::new("C2")], today());
        SchedulerEngine::new().schedule(&request).unwrap()
    }

    #[tokio::test]
    async fn test_write_all_scheduled() {
        let ops = make_ops();
        let store = make_store(&ops);
        let result = schedule(&ops);

        let report = fast_writer(3).write(&store, &result, &ops).await;

        assert!(report.is_complete());
        assert_eq!(report.written_count(), 4);
        assert!(report.skipped.is_empty());
        let ids: Vec<_> = report.outcomes.iter().map(|o| o.operation_id.as_str()).collect();
        assert_eq!(ids, vec!["O1", "O2", "O3", "X"]);

        assert_eq!(store.allocations_for("O1").await.len(), 2);
        let o1 = store.operation("O1").await.unwrap();
        assert_eq!(o1.planned_start, result.get("O1").unwrap().operation.planned_start);
        assert!(store.operation("X").await.unwrap().planned_start.is_none());
        assert!(store.allocations_for("X").await.is_empty());
    }

    #[tokio::test]
    async fn test_operation_that_no_longer_fits_is_cleared() {
        let ops = vec![Operation::new("O1", "C1", 25.0)];
        let store = make_store(&ops);
        let writer = fast_writer(3);

        writer.write(&store, &schedule(&ops), &ops).await;
        assert_eq!(store.allocations_for("O1").await.len(), 3);

        // Rerun with a horizon too short for 25h
        let snapshot = vec![store.operation("O1").await.unwrap()];
        let request = ScheduleRequest::new(snapshot.clone(), vec![Cell::new("C1")], today())
            .with_config(crate::config::SchedulingConfig::default().with_horizon_days(1));
        let result = SchedulerEngine::new().schedule(&request).unwrap();
        assert!(!result.get("O1").unwrap().is_scheduled());

        let report = writer.write(&store, &result, &snapshot).await;
        assert_eq!(report.outcome("O1"), Some(&WriteStatus::Written { attempts: 1 }));
        assert!(store.allocations_for("O1").await.is_empty());
        let stored = store.operation("O1").await.unwrap();
        assert!(stored.planned_start.is_none());
        assert!(stored.planned_end.is_none());
    }

    #[tokio::test]
    async fn test_not_eligible_and_duplicate_ids_are_skipped() {
        let first_window = today().and_hms_opt(7, 0, 0).unwrap() + chrono::TimeDelta::days(2);
        let other_window = today().and_hms_opt(7, 0, 0).unwrap() + chrono::TimeDelta::days(4);
        let ops = vec![
            Operation::new("A", "C1", 2.0).with_planned(first_window, first_window),
            Operation::new("A", "C1", 3.0).with_planned(other_window, other_window),
            Operation::new("D", "C1", 1.0)
                .with_status(crate::models::OperationStatus::Completed)
                .with_planned(first_window, first_window),
        ];
        let store = make_store(&ops);

        let report = fast_writer(3).write(&store, &schedule(&ops), &ops).await;

        // The scheduled first occurrence is guarded by its own window
        assert_eq!(report.outcome("A"), Some(&WriteStatus::Written { attempts: 1 }));
        assert_eq!(report.conflict_count(), 0);
        assert_eq!(report.skipped, vec!["A".to_string(), "D".to_string()]);
        assert_eq!(store.allocations_for("A").await.len(), 1);
        assert_eq!(
            store.operation("D").await.unwrap().planned_start,
            Some(first_window)
        );
    }

    #[tokio::test]
    async fn test_rerun_replaces_rows() {
        let ops = make_ops();
        let store = make_store(&ops);
        let writer = fast_writer(3);

        let first = schedule(&ops);
        writer.write(&store, &first, &ops).await;
        let rows = store.allocation_count().await;

        // Second run reads the updated operations as its snapshot
        let mut snapshot = Vec::new();
        for op in &ops {
            snapshot.push(store.operation(&op.id).await.unwrap());
        }
        let second = schedule(&snapshot);
        let report = writer.write(&store, &second, &snapshot).await;

        assert!(report.is_complete());
        assert_eq!(store.allocation_count().await, rows);
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let ops = make_ops();
        let store = make_store(&ops);
        store.fail_next_writes("O2", 2).await;

        let report = fast_writer(3).write(&store, &schedule(&ops), &ops).await;

        assert!(report.is_complete());
        assert_eq!(report.outcome("O2"), Some(&WriteStatus::Written { attempts: 3 }));
        assert_eq!(report.outcome("O1"), Some(&WriteStatus::Written { attempts: 1 }));
    }

    #[tokio::test]
    async fn test_exhausted_retries_do_not_block_others() {
        let ops = make_ops();
        let store = make_store(&ops);
        store.fail_next_writes("O2", 5).await;

        let report = fast_writer(2).write(&store, &schedule(&ops), &ops).await;

        assert!(!report.is_complete());
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.failed_ids(), vec!["O2"]);
        assert!(matches!(
            report.outcome("O2"),
            Some(WriteStatus::Failed { attempts: 2, .. })
        ));
        assert!(store.allocations_for("O2").await.is_empty());
        assert!(!store.allocations_for("O1").await.is_empty());
        assert!(!store.allocations_for("O3").await.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_reschedule_is_conflict() {
        let ops = make_ops();
        let store = make_store(&ops);
        let result = schedule(&ops);

        let other = today().and_hms_opt(9, 0, 0).unwrap();
        store.set_planned("O3", Some(other), Some(other)).await.unwrap();

        let report = fast_writer(3).write(&store, &result, &ops).await;

        assert_eq!(report.outcome("O3"), Some(&WriteStatus::Conflict));
        assert_eq!(report.conflict_count(), 1);
        assert_eq!(store.operation("O3").await.unwrap().planned_start, Some(other));
        assert_eq!(report.written_count(), 3);
    }

    #[tokio::test]
    async fn test_missing_operation_fails_without_retry() {
        let ops = make_ops();
        let store = InMemoryScheduleStore::new().with_operations(ops[1..].to_vec());

        let report = fast_writer(3).write(&store, &schedule(&ops), &ops).await;

        assert!(matches!(
            report.outcome("O1"),
            Some(WriteStatus::Failed { attempts: 1, .. })
        ));
    }

    #[test]
    fn test_report_serializes_status_tag() {
        let report = WriteReport {
            outcomes: vec![OperationWriteOutcome {
                operation_id: "O1".into(),
                status: WriteStatus::Written { attempts: 1 },
            }],
            skipped: vec![],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outcomes"][0]["status"], "written");
        assert_eq!(json["outcomes"][0]["operation_id"], "O1");
    }
}
