//! Error taxonomy.
//!
//! Only conditions that make a whole scheduling run impossible are errors.
//! Individual operations that cannot be placed are reported as data
//! ([`UnscheduledReason`](crate::models::UnscheduledReason)), and write-back
//! failures are reported per operation in a
//! [`WriteReport`](crate::writer::WriteReport).

use chrono::NaiveTime;

/// Result alias for scheduler entry points.
pub type Result<T, E = ScheduleError> = std::result::Result<T, E>;

/// Fatal configuration problems detected before scheduling starts.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("factory closing time {closing} must be after opening time {opening}")]
    EmptyWorkingDay {
        opening: NaiveTime,
        closing: NaiveTime,
    },

    #[error("working-days mask {mask:#09b} selects no weekday and no calendar day is open")]
    NoWorkingDays { mask: u8 },

    #[error("scheduling horizon must cover at least one day")]
    ZeroHorizon,

    #[error("invalid scheduler settings: {0}")]
    Parse(String),
}

/// Errors raised by a persistence backend.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Transient failure (network interruption, timeout). Safe to retry.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("operation not found: {0}")]
    NotFound(String),

    /// The stored schedule changed since the snapshot was read.
    #[error("operation {operation_id} was rescheduled concurrently")]
    Conflict { operation_id: String },

    #[error("store error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn unavailable<T: Into<String>>(msg: T) -> Self {
        StoreError::Unavailable(msg.into())
    }

    pub fn backend<T: Into<String>>(msg: T) -> Self {
        StoreError::Backend(msg.into())
    }

    /// Whether repeating the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

/// Errors surfaced to the caller of a scheduling run.
#[derive(thiserror::Error, Debug)]
pub enum ScheduleError {
    #[error("invalid scheduling configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to load scheduling snapshot: {0}")]
    Source(#[from] StoreError),
}
