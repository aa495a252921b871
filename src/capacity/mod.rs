//! Calendar-aware cell capacity.
//!
//! - [`CalendarResolver`]: open/closed and capacity multiplier per date.
//! - [`CapacityTracker`]: per-run ledger of hours committed per cell per day.

mod resolver;
mod tracker;

pub use resolver::CalendarResolver;
pub use tracker::CapacityTracker;
