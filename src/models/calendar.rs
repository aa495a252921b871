//! Production calendar models.
//!
//! Defines which days the factory is open: explicit per-date calendar
//! entries (holidays, half-days, overtime days) layered over a default
//! working-days bitmask.
//!
//! # Weekday Bitmask
//! Bit 0 = Monday, bit 1 = Tuesday, ..., bit 6 = Sunday (ISO weekday order,
//! `chrono::Weekday::num_days_from_monday`). Bit 7 is ignored.
//!
//! | Mask | Days |
//! |------|------|
//! | `0b001_1111` (31) | Mon–Fri |
//! | `0b011_1111` (63) | Mon–Sat |
//! | `0b111_1111` (127) | every day |
//!
//! # Precedence
//! An explicit [`CalendarDay`] always overrides the bitmask for its date.

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Weekdays the factory is open when no calendar entry exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct WorkingDays(u8);

impl WorkingDays {
    /// Monday through Friday.
    pub const MON_FRI: WorkingDays = WorkingDays(0b001_1111);
    /// Every day of the week.
    pub const ALL: WorkingDays = WorkingDays(0b111_1111);
    /// No weekday open by default.
    pub const NONE: WorkingDays = WorkingDays(0);

    const VALID_BITS: u8 = 0b111_1111;

    /// Creates a mask from raw bits (bit 7 is dropped).
    pub const fn from_bits(bits: u8) -> Self {
        WorkingDays(bits & Self::VALID_BITS)
    }

    /// Creates a mask from a list of weekdays.
    pub fn from_weekdays(days: &[Weekday]) -> Self {
        days.iter()
            .fold(Self::NONE, |mask, &day| WorkingDays(mask.0 | Self::bit(day)))
    }

    /// Bit assigned to a weekday.
    #[inline]
    pub fn bit(day: Weekday) -> u8 {
        1 << day.num_days_from_monday()
    }

    /// Raw bits.
    #[inline]
    pub fn bits(&self) -> u8 {
        self.0
    }

    /// Whether the weekday is a default working day.
    #[inline]
    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & Self::bit(day) != 0
    }

    /// Whether no weekday is selected.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl From<u8> for WorkingDays {
    fn from(bits: u8) -> Self {
        Self::from_bits(bits)
    }
}

impl From<WorkingDays> for u8 {
    fn from(mask: WorkingDays) -> Self {
        mask.0
    }
}

impl Default for WorkingDays {
    fn default() -> Self {
        Self::MON_FRI
    }
}

/// Classification of a calendar entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayType {
    /// Normal working day.
    Working,
    /// Closed (holiday, shutdown).
    NonWorking,
    /// Reduced or extended capacity (half-day, overtime).
    Custom,
}

/// A single date's production-calendar entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarDay {
    /// Calendar date (no time component).
    pub date: NaiveDate,
    /// Entry type.
    pub day_type: DayType,
    /// Scaling of the normal daily hours (1.0 = normal, 0 = closed).
    pub capacity_multiplier: f64,
}

impl CalendarDay {
    /// Creates an entry.
    pub fn new(date: NaiveDate, day_type: DayType, capacity_multiplier: f64) -> Self {
        Self {
            date,
            day_type,
            capacity_multiplier,
        }
    }

    /// A normal working day (multiplier 1.0).
    pub fn working(date: NaiveDate) -> Self {
        Self::new(date, DayType::Working, 1.0)
    }

    /// A closed day (multiplier 0).
    pub fn non_working(date: NaiveDate) -> Self {
        Self::new(date, DayType::NonWorking, 0.0)
    }

    /// A partial or overtime day.
    pub fn custom(date: NaiveDate, capacity_multiplier: f64) -> Self {
        Self::new(date, DayType::Custom, capacity_multiplier)
    }

    /// Multiplier with malformed values (negative, NaN, infinite) read as 0.
    pub fn effective_multiplier(&self) -> f64 {
        if self.capacity_multiplier.is_finite() && self.capacity_multiplier > 0.0 {
            self.capacity_multiplier
        } else {
            0.0
        }
    }

    /// Open iff the entry is not non-working and has a positive multiplier.
    pub fn is_open(&self) -> bool {
        self.day_type != DayType::NonWorking && self.effective_multiplier() > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_every_bit_position() {
        let expected = [
            (Weekday::Mon, 0b000_0001),
            (Weekday::Tue, 0b000_0010),
            (Weekday::Wed, 0b000_0100),
            (Weekday::Thu, 0b000_1000),
            (Weekday::Fri, 0b001_0000),
            (Weekday::Sat, 0b010_0000),
            (Weekday::Sun, 0b100_0000),
        ];
        for (day, bit) in expected {
            assert_eq!(WorkingDays::bit(day), bit, "{day:?}");
            let single = WorkingDays::from_bits(bit);
            for (other, _) in expected {
                assert_eq!(single.contains(other), other == day, "{day:?} vs {other:?}");
            }
        }
    }

    #[test]
    fn test_mon_fri_default() {
        let mask = WorkingDays::default();
        assert_eq!(mask.bits(), 31);
        assert!(mask.contains(Weekday::Mon));
        assert!(mask.contains(Weekday::Fri));
        assert!(!mask.contains(Weekday::Sat));
        assert!(!mask.contains(Weekday::Sun));
    }

    #[test]
    fn test_from_weekdays() {
        let mask = WorkingDays::from_weekdays(&[Weekday::Mon, Weekday::Wed, Weekday::Sun]);
        assert_eq!(mask.bits(), 0b100_0101);
        assert!(WorkingDays::from_weekdays(&[]).is_empty());
    }

    #[test]
    fn test_high_bit_ignored() {
        let mask = WorkingDays::from_bits(0b1000_0000);
        assert!(mask.is_empty());
        assert_eq!(WorkingDays::from_bits(0xFF), WorkingDays::ALL);
    }

    #[test]
    fn test_mask_serde_is_plain_number() {
        let json = serde_json::to_string(&WorkingDays::MON_FRI).unwrap();
        assert_eq!(json, "31");
        let back: WorkingDays = serde_json::from_str("96").unwrap();
        assert!(back.contains(Weekday::Sat));
        assert!(back.contains(Weekday::Sun));
    }

    #[test]
    fn test_deserialize_drops_high_bit() {
        let mask: WorkingDays = serde_json::from_str("128").unwrap();
        assert!(mask.is_empty());
        assert_eq!(mask.bits(), 0);

        let mask: WorkingDays = serde_json::from_str("129").unwrap();
        assert_eq!(mask.bits(), 1);
        assert!(mask.contains(Weekday::Mon));
    }

    #[test]
    fn test_calendar_day_open() {
        let d = date(2026, 10, 21);
        assert!(CalendarDay::working(d).is_open());
        assert!(!CalendarDay::non_working(d).is_open());
        assert!(CalendarDay::custom(d, 0.5).is_open());
        assert!(CalendarDay::custom(d, 1.5).is_open());
        assert!(!CalendarDay::custom(d, 0.0).is_open());
        // Non-working wins even with a positive multiplier
        assert!(!CalendarDay::new(d, DayType::NonWorking, 1.0).is_open());
    }

    #[test]
    fn test_malformed_multiplier() {
        let d = date(2026, 10, 21);
        assert_eq!(CalendarDay::custom(d, -1.0).effective_multiplier(), 0.0);
        assert_eq!(CalendarDay::custom(d, f64::NAN).effective_multiplier(), 0.0);
        assert!(!CalendarDay::custom(d, f64::INFINITY).is_open());
    }

    #[test]
    fn test_day_type_serde() {
        let d = CalendarDay::non_working(date(2026, 12, 25));
        let json = serde_json::to_string(&d).unwrap();
        assert!(json.contains("\"non_working\""));
        assert!(json.contains("\"2026-12-25\""));
    }
}
