//! Historical performance records.
//!
//! One record is one past session: which format ran where and when, who
//! taught it, how many people checked in, and what it earned. Records are
//! supplied pre-normalized by the import layer as flat rows
//! ([`RawPerformanceRecord`]) and converted to typed [`PerformanceRecord`]s
//! at the crate boundary.

use std::convert::TryFrom;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use super::time::{parse_weekday, TimeOfDay};
use crate::error::{Result, ScheduleError};

/// A flat import row, field names as produced by the CSV normalizer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawPerformanceRecord {
    /// Normalized class format name.
    pub cleaned_class: String,
    pub location: String,
    /// Day name ("Monday").
    pub day_of_week: String,
    /// Start time ("07:30:00").
    pub class_time: String,
    pub teacher_name: String,
    pub checked_in: f64,
    pub total_revenue: f64,
}

/// A validated, immutable historical record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceRecord {
    pub format: String,
    pub location: String,
    pub day: Weekday,
    pub time: TimeOfDay,
    pub teacher: String,
    /// Checked-in participants.
    pub checked_in: f64,
    pub revenue: f64,
}

impl PerformanceRecord {
    /// Creates a record with zero revenue.
    pub fn new(
        format: impl Into<String>,
        location: impl Into<String>,
        day: Weekday,
        time: TimeOfDay,
        teacher: impl Into<String>,
        checked_in: f64,
    ) -> Self {
        Self {
            format: format.into(),
            location: location.into(),
            day,
            time,
            teacher: teacher.into(),
            checked_in,
            revenue: 0.0,
        }
    }

    /// Sets the revenue.
    pub fn with_revenue(mut self, revenue: f64) -> Self {
        self.revenue = revenue;
        self
    }
}

impl TryFrom<RawPerformanceRecord> for PerformanceRecord {
    type Error = ScheduleError;

    fn try_from(raw: RawPerformanceRecord) -> Result<Self> {
        let format = raw.cleaned_class.trim().to_string();
        if format.is_empty() {
            return Err(ScheduleError::invalid_record("cleanedClass", "empty"));
        }
        let location = raw.location.trim().to_string();
        if location.is_empty() {
            return Err(ScheduleError::invalid_record("location", "empty"));
        }
        if !raw.checked_in.is_finite() || raw.checked_in < 0.0 {
            return Err(ScheduleError::invalid_record(
                "checkedIn",
                format!("not a non-negative number: {}", raw.checked_in),
            ));
        }

        Ok(Self {
            format,
            location,
            day: parse_weekday(&raw.day_of_week)?,
            time: TimeOfDay::parse(&raw.class_time)?,
            teacher: raw.teacher_name.trim().to_string(),
            checked_in: raw.checked_in,
            revenue: if raw.total_revenue.is_finite() {
                raw.total_revenue
            } else {
                0.0
            },
        })
    }
}

/// Converts raw rows, dropping malformed ones with a warning.
///
/// Malformed rows never abort an import; they simply contribute nothing
/// to the history.
pub fn normalize_records(raw: impl IntoIterator<Item = RawPerformanceRecord>) -> Vec<PerformanceRecord> {
    raw.into_iter()
        .filter_map(|row| match PerformanceRecord::try_from(row) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("dropping malformed performance record: {e}");
                None
            }
        })
        .collect()
}
