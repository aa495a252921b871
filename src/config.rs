//! Scheduler configuration.
//!
//! Settings are plain serde structs so they can be embedded in a host
//! application's configuration or loaded from TOML:
//!
//! ```toml
//! [scheduling]
//! working_days_mask = 31          # bit 0 = Monday ... bit 6 = Sunday
//! factory_opening_time = "07:00"
//! factory_closing_time = "17:00"
//! horizon_days = 365
//!
//! [writer]
//! max_attempts = 3
//! retry_backoff_ms = 200
//! concurrency = 8
//! ```

use chrono::{Days, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::{CalendarDay, WorkingDays};

/// Upper bound on how far forward a run may allocate, in days.
///
/// Applied on top of `horizon_days` so a misconfigured horizon cannot make
/// the day-by-day search unbounded.
pub const MAX_HORIZON_DAYS: u32 = 3660;

/// Immutable per-run scheduling configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingConfig {
    /// Default open weekdays.
    #[serde(rename = "working_days_mask")]
    pub working_days: WorkingDays,
    /// Wall-clock opening time.
    #[serde(with = "hhmm")]
    pub factory_opening_time: NaiveTime,
    /// Wall-clock closing time.
    #[serde(with = "hhmm")]
    pub factory_closing_time: NaiveTime,
    /// Days past "today" covered by the fetched calendar.
    pub horizon_days: u32,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            working_days: WorkingDays::MON_FRI,
            factory_opening_time: NaiveTime::from_hms_opt(7, 0, 0).unwrap_or_default(),
            factory_closing_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or_default(),
            horizon_days: 365,
        }
    }
}

impl SchedulingConfig {
    /// Sets the default working weekdays.
    pub fn with_working_days(mut self, working_days: WorkingDays) -> Self {
        self.working_days = working_days;
        self
    }

    /// Sets factory opening and closing time.
    pub fn with_hours(mut self, opening: NaiveTime, closing: NaiveTime) -> Self {
        self.factory_opening_time = opening;
        self.factory_closing_time = closing;
        self
    }

    /// Sets the calendar horizon.
    pub fn with_horizon_days(mut self, days: u32) -> Self {
        self.horizon_days = days;
        self
    }

    /// Normal hours per open day (0 when closing is not after opening).
    pub fn daily_hours(&self) -> f64 {
        if self.factory_closing_time <= self.factory_opening_time {
            return 0.0;
        }
        (self.factory_closing_time - self.factory_opening_time).num_seconds() as f64 / 3600.0
    }

    /// Last date a run starting on `today` may allocate on.
    pub fn horizon_end(&self, today: NaiveDate) -> NaiveDate {
        let days = self.horizon_days.min(MAX_HORIZON_DAYS);
        today
            .checked_add_days(Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MAX)
    }

    /// Rejects configurations under which nothing can ever be scheduled.
    ///
    /// With an empty weekday mask, only open calendar entries between
    /// `today` and the horizon end count as capacity.
    pub fn validate(&self, calendar: &[CalendarDay], today: NaiveDate) -> Result<(), ConfigError> {
        if self.factory_closing_time <= self.factory_opening_time {
            return Err(ConfigError::EmptyWorkingDay {
                opening: self.factory_opening_time,
                closing: self.factory_closing_time,
            });
        }
        if self.horizon_days == 0 {
            return Err(ConfigError::ZeroHorizon);
        }
        let horizon_end = self.horizon_end(today);
        let open_in_window = calendar
            .iter()
            .any(|d| d.date >= today && d.date <= horizon_end && d.is_open());
        if self.working_days.is_empty() && !open_in_window {
            return Err(ConfigError::NoWorkingDays {
                mask: self.working_days.bits(),
            });
        }
        Ok(())
    }
}

/// Write-back tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    /// Attempts per operation (including the first).
    pub max_attempts: u32,
    /// Base delay between attempts; attempt `n` waits `n * retry_backoff_ms`.
    pub retry_backoff_ms: u64,
    /// Maximum in-flight operation updates.
    pub concurrency: usize,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_backoff_ms: 200,
            concurrency: 8,
        }
    }
}

/// Top-level settings document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerSettings {
    pub scheduling: SchedulingConfig,
    pub writer: WriterConfig,
}

impl SchedulerSettings {
    /// Parses settings from a TOML document. Missing keys take defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

/// `"HH:MM"` (or `"HH:MM:SS"`) wall-clock times.
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
            .map_err(|e| serde::de::Error::custom(format!("invalid time '{raw}': {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn test_default_config() {
        let c = SchedulingConfig::default();
        assert_eq!(c.working_days, WorkingDays::MON_FRI);
        assert!((c.daily_hours() - 10.0).abs() < 1e-10);
        assert!(c.validate(&[], today()).is_ok());
    }

    #[test]
    fn test_daily_hours_fractional() {
        let c = SchedulingConfig::default().with_hours(t(6, 30), t(15, 0));
        assert!((c.daily_hours() - 8.5).abs() < 1e-10);
    }

    #[test]
    fn test_inverted_hours_rejected() {
        let c = SchedulingConfig::default().with_hours(t(17, 0), t(7, 0));
        assert_eq!(c.daily_hours(), 0.0);
        assert!(matches!(
            c.validate(&[], today()),
            Err(ConfigError::EmptyWorkingDay { .. })
        ));

        let same = SchedulingConfig::default().with_hours(t(8, 0), t(8, 0));
        assert!(same.validate(&[], today()).is_err());
    }

    #[test]
    fn test_empty_mask_needs_open_override() {
        let c = SchedulingConfig::default().with_working_days(WorkingDays::NONE);
        assert_eq!(
            c.validate(&[], today()),
            Err(ConfigError::NoWorkingDays { mask: 0 })
        );

        let d = NaiveDate::from_ymd_opt(2026, 10, 24).unwrap();
        assert!(c.validate(&[CalendarDay::non_working(d)], today()).is_err());
        assert!(c.validate(&[CalendarDay::custom(d, 0.5)], today()).is_ok());
    }

    #[test]
    fn test_empty_mask_ignores_overrides_outside_horizon() {
        let c = SchedulingConfig::default()
            .with_working_days(WorkingDays::NONE)
            .with_horizon_days(30);
        let past = CalendarDay::working(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        let beyond = CalendarDay::working(NaiveDate::from_ymd_opt(2026, 12, 1).unwrap());
        let inside = CalendarDay::working(NaiveDate::from_ymd_opt(2026, 11, 18).unwrap());

        assert_eq!(
            c.validate(&[past.clone(), beyond.clone()], today()),
            Err(ConfigError::NoWorkingDays { mask: 0 })
        );
        assert!(c.validate(&[past, beyond, inside], today()).is_ok());
    }

    #[test]
    fn test_high_bit_only_mask_from_toml_rejected() {
        let s = SchedulerSettings::from_toml_str("[scheduling]\nworking_days_mask = 128\n")
            .unwrap();
        assert!(s.scheduling.working_days.is_empty());
        assert_eq!(
            s.scheduling.validate(&[], today()),
            Err(ConfigError::NoWorkingDays { mask: 0 })
        );
    }

    #[test]
    fn test_zero_horizon_rejected() {
        let c = SchedulingConfig::default().with_horizon_days(0);
        assert_eq!(c.validate(&[], today()), Err(ConfigError::ZeroHorizon));
    }

    #[test]
    fn test_horizon_end_capped() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let c = SchedulingConfig::default().with_horizon_days(10);
        assert_eq!(c.horizon_end(today), NaiveDate::from_ymd_opt(2026, 10, 29).unwrap());

        let huge = SchedulingConfig::default().with_horizon_days(u32::MAX);
        let capped = huge.horizon_end(today);
        assert_eq!((capped - today).num_days(), i64::from(MAX_HORIZON_DAYS));
    }

    #[test]
    fn test_settings_from_toml() {
        let s = SchedulerSettings::from_toml_str(
            r#"
            [scheduling]
            working_days_mask = 63
            factory_opening_time = "06:00"
            factory_closing_time = "14:30"

            [writer]
            max_attempts = 5
            "#,
        )
        .unwrap();

        assert_eq!(s.scheduling.working_days.bits(), 63);
        assert_eq!(s.scheduling.factory_opening_time, t(6, 0));
        assert!((s.scheduling.daily_hours() - 8.5).abs() < 1e-10);
        assert_eq!(s.scheduling.horizon_days, 365);
        assert_eq!(s.writer.max_attempts, 5);
        assert_eq!(s.writer.concurrency, 8);
    }

    #[test]
    fn test_settings_empty_document() {
        let s = SchedulerSettings::from_toml_str("").unwrap();
        assert_eq!(s, SchedulerSettings::default());
    }

    #[test]
    fn test_settings_bad_time() {
        let err = SchedulerSettings::from_toml_str(
            r#"
            [scheduling]
            factory_opening_time = "7am"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(msg) if msg.contains("7am")));
    }

    #[test]
    fn test_time_serializes_as_hhmm() {
        let json = serde_json::to_string(&SchedulingConfig::default()).unwrap();
        assert!(json.contains("\"factory_opening_time\":\"07:00\""));
        assert!(json.contains("\"working_days_mask\":31"));
    }
}
