//! Scheduled class model.
//!
//! A scheduled class is one recurring weekly session: a format taught by a
//! teacher at a location, on a day, at a start time. It is the unit the
//! engine commits to the ledger and the unit manual edits operate on.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use super::format;
use super::time::{occupied_cells, Shift, TimeOfDay, TimeWindow};

/// A class placed on the weekly grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledClass {
    /// Unique class identifier (assigned by the ledger on commit).
    pub id: String,
    /// Day of week.
    pub day: Weekday,
    /// Start time.
    pub time: TimeOfDay,
    /// Studio location name.
    pub location: String,
    /// Class format name.
    pub format: String,
    /// Teacher full name.
    pub teacher: String,
    /// Duration in minutes, derived from the format.
    pub duration_minutes: u16,
    /// Estimated participants (rounded historical average).
    pub participants: u32,
    /// Historical average check-ins at or above the top-performer threshold.
    pub is_top_performer: bool,
    /// Private sessions may run inside the restricted midday window.
    pub is_private: bool,
    /// Locked classes are kept by callers across re-optimizations.
    pub is_locked: bool,
}

impl ScheduledClass {
    /// Creates a class; duration is derived from the format name.
    pub fn new(
        day: Weekday,
        time: TimeOfDay,
        location: impl Into<String>,
        format: impl Into<String>,
        teacher: impl Into<String>,
    ) -> Self {
        let format = format.into();
        Self {
            id: String::new(),
            day,
            time,
            location: location.into(),
            duration_minutes: format::duration_minutes(&format),
            format,
            teacher: teacher.into(),
            participants: 0,
            is_top_performer: false,
            is_private: false,
            is_locked: false,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Sets the estimated participants.
    pub fn with_participants(mut self, participants: u32) -> Self {
        self.participants = participants;
        self
    }

    pub fn with_top_performer(mut self, flag: bool) -> Self {
        self.is_top_performer = flag;
        self
    }

    /// Marks the class as a private session.
    pub fn private(mut self) -> Self {
        self.is_private = true;
        self
    }

    pub fn locked(mut self) -> Self {
        self.is_locked = true;
        self
    }

    /// Overrides the derived duration.
    pub fn with_duration(mut self, minutes: u16) -> Self {
        self.duration_minutes = minutes;
        self
    }

    /// Duration in hours.
    #[inline]
    pub fn duration_hours(&self) -> f64 {
        self.duration_minutes as f64 / 60.0
    }

    /// Cell-rounded span `[start, end)`.
    pub fn span(&self) -> TimeWindow {
        TimeWindow::for_class(self.time, self.duration_minutes)
    }

    /// Actual end time (not rounded to cells).
    pub fn end(&self) -> TimeOfDay {
        self.time.plus_minutes(self.duration_minutes)
    }

    /// Start times of the grid cells this class occupies.
    pub fn cells(&self) -> impl Iterator<Item = TimeOfDay> {
        occupied_cells(self.time, self.duration_minutes)
    }

    /// Shift of the start time.
    pub fn shift(&self) -> Shift {
        Shift::of(self.time)
    }

    /// Whether the class occupies the cell starting at `cell`.
    pub fn occupies(&self, cell: TimeOfDay) -> bool {
        self.span().contains(cell)
    }
}
