//! Capacity-aware production scheduler for manufacturing cells.
//!
//! Assigns planned start/end times to job operations, splitting each one
//! across working days so no cell is booked beyond its daily capacity.
//! Capacity comes from factory hours, a working-days bitmask and
//! per-date calendar overrides.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Operation`, `Cell`, `Job`, `CalendarDay`,
//!   `WorkingDays`, `DayAllocation`, `ScheduleResult`
//! - **`capacity`**: Calendar resolution and the per-run capacity ledger
//! - **`dispatching`**: Ordering rules (priority, due date, sequence) and
//!   the rule engine that composes them
//! - **`scheduler`**: Day-by-day allocation engine and schedule KPIs
//! - **`writer`**: Storage ports and retrying per-operation write-back
//! - **`service`**: The auto-schedule action (load, confirm, schedule, write)
//! - **`validation`**: Input integrity checks (duplicate IDs, cell refs,
//!   estimates)
//! - **`config`**: Factory hours, horizon and writer settings
//!
//! # Architecture
//!
//! The engine is pure and synchronous: the same snapshot always yields the
//! same schedule. All I/O lives behind the `writer` ports and is driven by
//! `service`.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Baker & Trietsch (2019), "Principles of Sequencing and Scheduling"

pub mod capacity;
pub mod config;
pub mod dispatching;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod service;
pub mod validation;
pub mod writer;

pub use config::{SchedulerSettings, SchedulingConfig, WriterConfig};
pub use error::{ConfigError, ScheduleError, StoreError};
pub use scheduler::{ScheduleRequest, SchedulerEngine};
pub use service::{AutoScheduleOptions, AutoScheduleOutcome, AutoScheduleService};
