//! Capacity-aware scheduler and KPI evaluation.
//!
//! # Algorithm
//!
//! `SchedulerEngine` orders operations with a dispatching rule chain and
//! packs each one, day by day, into its cell's remaining daily capacity.
//! It is greedy and not optimal, but deterministic and fast: bounded by
//! operations × horizon days, with no I/O.
//!
//! # KPI
//!
//! `ScheduleKpi` summarizes a result: counts, hours, lateness against job
//! due dates and per-cell utilization.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 3-4
//! - Baker & Trietsch (2019), "Principles of Sequencing and Scheduling"

mod engine;
mod kpi;

pub use engine::{ScheduleRequest, SchedulerEngine, HOURS_EPSILON};
pub use kpi::ScheduleKpi;
