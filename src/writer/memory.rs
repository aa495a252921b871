//! In-process store implementing both storage ports.
//!
//! Used by tests and by hosts that keep the floor state in memory. Each
//! operation update runs under one write lock, so it is all-or-nothing.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use tokio::sync::RwLock;

use super::store::{OperationScheduleUpdate, ScheduleSource, ScheduleStore};
use crate::error::StoreError;
use crate::models::{CalendarDay, Cell, DayAllocation, Job, Operation};

#[derive(Debug, Default)]
struct StoreState {
    jobs: Vec<Job>,
    operations: Vec<Operation>,
    cells: Vec<Cell>,
    calendar: Vec<CalendarDay>,
    allocations: Vec<DayAllocation>,
    /// Remaining injected transient failures per operation id.
    failing_writes: HashMap<String, u32>,
    reads_unavailable: bool,
}

/// Thread-safe in-memory schedule store.
#[derive(Debug, Default)]
pub struct InMemoryScheduleStore {
    state: RwLock<StoreState>,
}

impl InMemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_jobs(mut self, jobs: Vec<Job>) -> Self {
        self.state.get_mut().jobs = jobs;
        self
    }

    pub fn with_operations(mut self, operations: Vec<Operation>) -> Self {
        self.state.get_mut().operations = operations;
        self
    }

    pub fn with_cells(mut self, cells: Vec<Cell>) -> Self {
        self.state.get_mut().cells = cells;
        self
    }

    pub fn with_calendar(mut self, calendar: Vec<CalendarDay>) -> Self {
        self.state.get_mut().calendar = calendar;
        self
    }

    pub fn with_allocations(mut self, allocations: Vec<DayAllocation>) -> Self {
        self.state.get_mut().allocations = allocations;
        self
    }

    /// Makes the next `count` writes for an operation fail as unavailable.
    pub async fn fail_next_writes(&self, operation_id: &str, count: u32) {
        self.state
            .write()
            .await
            .failing_writes
            .insert(operation_id.to_string(), count);
    }

    /// Makes every read fail as unavailable.
    pub async fn set_reads_unavailable(&self, unavailable: bool) {
        self.state.write().await.reads_unavailable = unavailable;
    }

    /// Overwrites a planned window directly, as another writer would.
    pub async fn set_planned(
        &self,
        operation_id: &str,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let op = state
            .operations
            .iter_mut()
            .find(|op| op.id == operation_id)
            .ok_or_else(|| StoreError::NotFound(operation_id.to_string()))?;
        op.planned_start = start;
        op.planned_end = end;
        Ok(())
    }

    pub async fn operation(&self, operation_id: &str) -> Option<Operation> {
        self.state
            .read()
            .await
            .operations
            .iter()
            .find(|op| op.id == operation_id)
            .cloned()
    }

    pub async fn allocations_for(&self, operation_id: &str) -> Vec<DayAllocation> {
        self.state
            .read()
            .await
            .allocations
            .iter()
            .filter(|a| a.operation_id == operation_id)
            .cloned()
            .collect()
    }

    pub async fn allocation_count(&self) -> usize {
        self.state.read().await.allocations.len()
    }

    fn check_reads(state: &StoreState) -> Result<(), StoreError> {
        if state.reads_unavailable {
            return Err(StoreError::unavailable("reads disabled"));
        }
        Ok(())
    }
}

#[async_trait]
impl ScheduleStore for InMemoryScheduleStore {
    async fn apply_operation_schedule(
        &self,
        update: &OperationScheduleUpdate,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write().await;

        if let Some(remaining) = state.failing_writes.get_mut(&update.operation_id) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(StoreError::unavailable(format!(
                    "injected failure for {}",
                    update.operation_id
                )));
            }
        }

        let op = state
            .operations
            .iter_mut()
            .find(|op| op.id == update.operation_id)
            .ok_or_else(|| StoreError::NotFound(update.operation_id.clone()))?;

        if op.planned_start != update.expected_start || op.planned_end != update.expected_end {
            return Err(StoreError::Conflict {
                operation_id: update.operation_id.clone(),
            });
        }
        op.planned_start = update.planned_start;
        op.planned_end = update.planned_end;

        state
            .allocations
            .retain(|a| a.operation_id != update.operation_id);
        state.allocations.extend(update.allocations.iter().cloned());
        Ok(())
    }
}

#[async_trait]
impl ScheduleSource for InMemoryScheduleStore {
    async fn load_jobs(&self) -> Result<Vec<Job>, StoreError> {
        let state = self.state.read().await;
        Self::check_reads(&state)?;
        Ok(state.jobs.clone())
    }

    async fn load_operations(&self) -> Result<Vec<Operation>, StoreError> {
        let state = self.state.read().await;
        Self::check_reads(&state)?;
        Ok(state.operations.clone())
    }

    async fn load_cells(&self) -> Result<Vec<Cell>, StoreError> {
        let state = self.state.read().await;
        Self::check_reads(&state)?;
        Ok(state.cells.clone())
    }

    async fn load_calendar(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<CalendarDay>, StoreError> {
        let state = self.state.read().await;
        Self::check_reads(&state)?;
        Ok(state
            .calendar
            .iter()
            .filter(|d| d.date >= from && d.date <= to)
            .cloned()
            .collect())
    }
}
