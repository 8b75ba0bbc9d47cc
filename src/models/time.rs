//! Time-of-day, weekly grid, and shift models.
//!
//! The studio week is a grid of 15-minute cells from 07:00 to 20:00 on
//! each of seven days. Classes start on the grid and occupy whole cells:
//! a 45-minute class starting at 09:00 covers 09:00, 09:15 and 09:30.
//!
//! # Time Model
//! Times are minutes since midnight. Windows are half-open `[start, end)`,
//! matching the cell model: a class ending at 10:00 does not occupy the
//! 10:00 cell.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, ScheduleError};

/// Length of one grid cell in minutes.
pub const SLOT_MINUTES: u16 = 15;

/// First bookable start time (07:00).
pub const GRID_START: TimeOfDay = TimeOfDay::from_hm(7, 0);

/// Last bookable start time (20:00).
pub const GRID_END: TimeOfDay = TimeOfDay::from_hm(20, 0);

/// Days of the week in sweep order.
pub const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// A wall-clock time of day with minute resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    /// Creates a time from hours and minutes.
    pub const fn from_hm(hour: u16, minute: u16) -> Self {
        Self(hour * 60 + minute)
    }

    /// Creates a time from minutes since midnight.
    pub const fn from_minutes(minutes: u16) -> Self {
        Self(minutes)
    }

    /// Parses `HH:MM` or `HH:MM:SS`. Seconds are discarded.
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let parsed = NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
            .map_err(|_| ScheduleError::InvalidTime(s.to_string()))?;
        Ok(Self::from_hm(parsed.hour() as u16, parsed.minute() as u16))
    }

    /// Minutes since midnight.
    #[inline]
    pub fn minutes(self) -> u16 {
        self.0
    }

    #[inline]
    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    #[inline]
    pub fn minute(self) -> u16 {
        self.0 % 60
    }

    /// Returns this time shifted forward by `minutes`.
    #[inline]
    pub fn plus_minutes(self, minutes: u16) -> Self {
        Self(self.0 + minutes)
    }

    /// Whether this time is a bookable start on the weekly grid.
    pub fn is_on_grid(self) -> bool {
        self >= GRID_START && self <= GRID_END && self.0 % SLOT_MINUTES == 0
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// All bookable start times, 07:00 through 20:00 inclusive (53 slots).
pub fn grid_slots() -> impl Iterator<Item = TimeOfDay> {
    (GRID_START.minutes()..=GRID_END.minutes())
        .step_by(SLOT_MINUTES as usize)
        .map(TimeOfDay::from_minutes)
}

/// Number of grid cells a class of `duration_minutes` occupies
/// (rounded up to the next quarter hour).
pub fn cell_count(duration_minutes: u16) -> u16 {
    duration_minutes.div_ceil(SLOT_MINUTES)
}

/// Start times of the cells a class occupies.
pub fn occupied_cells(start: TimeOfDay, duration_minutes: u16) -> impl Iterator<Item = TimeOfDay> {
    (0..cell_count(duration_minutes)).map(move |i| start.plus_minutes(i * SLOT_MINUTES))
}

/// A time interval `[start, end)` within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Interval start (inclusive).
    pub start: TimeOfDay,
    /// Interval end (exclusive).
    pub end: TimeOfDay,
}

impl TimeWindow {
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Self {
        Self { start, end }
    }

    /// The cell-rounded span of a class starting at `start`.
    pub fn for_class(start: TimeOfDay, duration_minutes: u16) -> Self {
        Self::new(
            start,
            start.plus_minutes(cell_count(duration_minutes) * SLOT_MINUTES),
        )
    }

    /// Duration in minutes.
    #[inline]
    pub fn duration_minutes(&self) -> u16 {
        self.end.minutes().saturating_sub(self.start.minutes())
    }

    /// Whether a time falls within this window.
    #[inline]
    pub fn contains(&self, time: TimeOfDay) -> bool {
        time >= self.start && time < self.end
    }

    /// Whether two windows overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Staffing shift a start time belongs to.
///
/// Morning is 07:00–11:59 and evening 16:00–20:59 by hour; everything
/// else (early hours and the midday block) is `Afternoon`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shift {
    Morning,
    Afternoon,
    Evening,
}

impl Shift {
    /// Classifies a start time.
    pub fn of(time: TimeOfDay) -> Self {
        match time.hour() {
            7..=11 => Shift::Morning,
            16..=20 => Shift::Evening,
            _ => Shift::Afternoon,
        }
    }
}

/// Parses a day name ("Monday", "mon", ...).
pub fn parse_weekday(s: &str) -> Result<Weekday> {
    Weekday::from_str(s.trim()).map_err(|_| ScheduleError::InvalidDay(s.to_string()))
}

/// Position of a day in the week, Monday = 0.
#[inline]
pub fn day_index(day: Weekday) -> usize {
    day.num_days_from_monday() as usize
}

/// Whether a day falls on the weekend.
#[inline]
pub fn is_weekend(day: Weekday) -> bool {
    matches!(day, Weekday::Sat | Weekday::Sun)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time() {
        assert_eq!(TimeOfDay::parse("07:00").unwrap(), TimeOfDay::from_hm(7, 0));
        assert_eq!(TimeOfDay::parse("18:30:00").unwrap(), TimeOfDay::from_hm(18, 30));
        assert_eq!(TimeOfDay::parse(" 09:15 ").unwrap(), TimeOfDay::from_hm(9, 15));
        assert!(TimeOfDay::parse("25:00").is_err());
        assert!(TimeOfDay::parse("morning").is_err());
        assert!(TimeOfDay::parse("").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(TimeOfDay::from_hm(7, 5).to_string(), "07:05");
        assert_eq!(TimeOfDay::from_hm(20, 0).to_string(), "20:00");
    }

    #[test]
    fn test_grid() {
        let slots: Vec<_> = grid_slots().collect();
        assert_eq!(slots.len(), 53);
        assert_eq!(slots[0], GRID_START);
        assert_eq!(*slots.last().unwrap(), GRID_END);
        assert!(TimeOfDay::from_hm(9, 45).is_on_grid());
        assert!(!TimeOfDay::from_hm(9, 40).is_on_grid());
        assert!(!TimeOfDay::from_hm(6, 45).is_on_grid());
        assert!(!TimeOfDay::from_hm(20, 15).is_on_grid());
    }

    #[test]
    fn test_occupied_cells() {
        let start = TimeOfDay::from_hm(9, 0);
        let cells: Vec<_> = occupied_cells(start, 45).collect();
        assert_eq!(
            cells,
            vec![
                TimeOfDay::from_hm(9, 0),
                TimeOfDay::from_hm(9, 15),
                TimeOfDay::from_hm(9, 30)
            ]
        );
        assert_eq!(occupied_cells(start, 60).count(), 4);
        assert_eq!(occupied_cells(start, 30).count(), 2);
        // Partial quarter hours round up
        assert_eq!(occupied_cells(start, 50).count(), 4);
    }

    #[test]
    fn test_time_window() {
        let w = TimeWindow::for_class(TimeOfDay::from_hm(9, 0), 60);
        assert_eq!(w.end, TimeOfDay::from_hm(10, 0));
        assert_eq!(w.duration_minutes(), 60);
        assert!(w.contains(TimeOfDay::from_hm(9, 45)));
        assert!(!w.contains(TimeOfDay::from_hm(10, 0))); // exclusive end

        let next = TimeWindow::for_class(TimeOfDay::from_hm(10, 0), 60);
        assert!(!w.overlaps(&next)); // touching but not overlapping
        let inside = TimeWindow::for_class(TimeOfDay::from_hm(9, 15), 30);
        assert!(w.overlaps(&inside));
    }

    #[test]
    fn test_shift_of() {
        assert_eq!(Shift::of(TimeOfDay::from_hm(7, 0)), Shift::Morning);
        assert_eq!(Shift::of(TimeOfDay::from_hm(11, 45)), Shift::Morning);
        assert_eq!(Shift::of(TimeOfDay::from_hm(12, 0)), Shift::Afternoon);
        assert_eq!(Shift::of(TimeOfDay::from_hm(16, 0)), Shift::Evening);
        assert_eq!(Shift::of(TimeOfDay::from_hm(20, 0)), Shift::Evening);
    }

    #[test]
    fn test_weekday_helpers() {
        assert_eq!(parse_weekday("Monday").unwrap(), Weekday::Mon);
        assert_eq!(parse_weekday("sun").unwrap(), Weekday::Sun);
        assert!(parse_weekday("Funday").is_err());
        assert_eq!(day_index(Weekday::Mon), 0);
        assert_eq!(day_index(Weekday::Sun), 6);
        assert!(is_weekend(Weekday::Sat));
        assert!(!is_weekend(Weekday::Fri));
    }

    #[test]
    fn test_time_serde() {
        let t = TimeOfDay::from_hm(17, 30);
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, "\"17:30\"");
        let back: TimeOfDay = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }
}
