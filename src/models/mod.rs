//! Scheduling domain models.
//!
//! Plain data snapshots handed to the scheduler by the persistence layer,
//! and the result records it hands back.
//!
//! # Domain Mappings
//!
//! | mes-schedule | Shop floor | Storage |
//! |--------------|------------|---------|
//! | Operation | Routing step of a part | `operations` row |
//! | Job | Customer order | `jobs` row |
//! | Cell | Work-center | `cells` row |
//! | CalendarDay | Holiday / overtime day | `factory_calendar` row |
//! | DayAllocation | Hours booked on a date | `operation_day_allocations` row |

mod calendar;
mod cell;
mod operation;
mod schedule;

pub use calendar::{CalendarDay, DayType, WorkingDays};
pub use cell::{Cell, Job};
pub use operation::{JobPriority, Operation, OperationStatus};
pub use schedule::{DayAllocation, Placement, ScheduleResult, ScheduledOperation, UnscheduledReason};
