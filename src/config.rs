//! Studio configuration and synthesis options.
//!
//! All rule constants the engine enforces live here, in one explicit value
//! passed to every component. `StudioConfig::default()` reproduces the
//! studio's built-in rules; JSON overrides can be layered on with
//! [`StudioConfig::from_json_str`] or [`StudioConfig::from_path`], and any
//! field omitted from the JSON keeps its default.

use std::path::Path;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{format, is_weekend, TimeOfDay, TimeWindow};

/// Per-location studio rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRules {
    /// Location name, as it appears in records.
    pub name: String,
    /// Number of rooms: classes that may run at the same instant.
    pub max_parallel_classes: usize,
    /// If non-empty, only these formats may run here.
    #[serde(default)]
    pub allowed_formats: Vec<String>,
    /// Format families that may never run here, matched as
    /// case-insensitive substrings ("powerCycle" also denies
    /// "Studio Power Cycle (Express)").
    #[serde(default)]
    pub restricted_formats: Vec<String>,
    /// Ceiling on total Sunday classes.
    #[serde(default)]
    pub sunday_class_limit: Option<usize>,
}

impl LocationRules {
    pub fn new(name: impl Into<String>, max_parallel_classes: usize) -> Self {
        Self {
            name: name.into(),
            max_parallel_classes,
            allowed_formats: Vec::new(),
            restricted_formats: Vec::new(),
            sunday_class_limit: None,
        }
    }

    /// Adds an allow-listed format.
    pub fn allow(mut self, format: impl Into<String>) -> Self {
        self.allowed_formats.push(format.into());
        self
    }

    /// Adds a deny-listed format family.
    pub fn deny(mut self, format: impl Into<String>) -> Self {
        self.restricted_formats.push(format.into());
        self
    }

    pub fn with_sunday_limit(mut self, limit: usize) -> Self {
        self.sunday_class_limit = Some(limit);
        self
    }

    /// Whether the format may run at this location.
    ///
    /// Deny-list families win; a non-empty allow-list must contain the
    /// exact format. Names compare case-insensitively.
    pub fn permits(&self, format: &str) -> bool {
        if self
            .restricted_formats
            .iter()
            .any(|family| format::matches_family(format, family))
        {
            return false;
        }
        self.allowed_formats.is_empty()
            || self
                .allowed_formats
                .iter()
                .any(|name| format::same_format(name, format))
    }
}

/// Midday blackout windows during which only private classes may start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RestrictedHours {
    pub weekday: TimeWindow,
    pub weekend: TimeWindow,
}

impl Default for RestrictedHours {
    fn default() -> Self {
        Self {
            weekday: TimeWindow::new(TimeOfDay::from_hm(12, 0), TimeOfDay::from_hm(17, 0)),
            weekend: TimeWindow::new(TimeOfDay::from_hm(12, 0), TimeOfDay::from_hm(16, 0)),
        }
    }
}

impl RestrictedHours {
    /// Whether a start time on `day` falls in the blackout.
    pub fn is_restricted(&self, day: Weekday, time: TimeOfDay) -> bool {
        let window = if is_weekend(day) {
            &self.weekend
        } else {
            &self.weekday
        };
        window.contains(time)
    }
}

/// Staffing and programming rules shared by all locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudioRules {
    /// Classes a trainer may teach per day.
    pub max_daily_classes: usize,
    /// Hours a trainer may teach per day.
    pub max_daily_hours: f64,
    /// Longest allowed run of back-to-back classes.
    pub max_consecutive_classes: usize,
    /// Classes separated by at most this many minutes are back-to-back.
    pub consecutive_gap_minutes: u16,
    /// Weekly cap for standard trainers.
    pub max_weekly_hours: f64,
    /// Weekly cap for new trainers.
    pub new_trainer_max_hours: f64,
    /// Warn when a trainer's weekly hours come within this margin of the cap.
    pub weekly_warning_margin_hours: f64,
    /// Formats new trainers may teach.
    pub new_trainer_formats: Vec<String>,
    /// Formats favoured by the format-priority variation.
    pub priority_formats: Vec<String>,
    /// Formats injected when one format dominates a day.
    pub variety_formats: Vec<String>,
    pub restricted_hours: RestrictedHours,
    /// Minimum mean check-ins for general fill.
    pub min_checked_in: f64,
    /// Minimum mean check-ins for quota, express and mix-balance passes.
    pub min_checked_in_strict: f64,
    /// Mean check-ins at which a class is flagged top performer.
    pub top_performer_threshold: f64,
    /// Barre 57 classes required per location, day and shift.
    pub barre_quota_per_shift: usize,
    /// Occurrences of one format per location and day before variety is injected.
    pub max_same_format_per_day: usize,
}

impl Default for StudioRules {
    fn default() -> Self {
        Self {
            max_daily_classes: 4,
            max_daily_hours: 4.0,
            max_consecutive_classes: 2,
            consecutive_gap_minutes: 15,
            max_weekly_hours: 15.0,
            new_trainer_max_hours: 10.0,
            weekly_warning_margin_hours: 2.0,
            new_trainer_formats: [
                "Studio Barre 57",
                "Studio Barre 57 (Express)",
                "Studio powerCycle",
                "Studio powerCycle (Express)",
                "Studio Cardio Barre",
            ]
            .map(String::from)
            .to_vec(),
            priority_formats: [
                "Studio Barre 57",
                "Studio powerCycle",
                "Studio Mat 57",
                "Studio FIT",
                "Studio Cardio Barre",
                "Studio Amped Up!",
                "Studio Cardio Barre Plus",
                "Studio Back Body Blaze",
            ]
            .map(String::from)
            .to_vec(),
            variety_formats: [
                "Studio Mat 57",
                "Studio FIT",
                "Studio Cardio Barre",
                "Studio Recovery",
            ]
            .map(String::from)
            .to_vec(),
            restricted_hours: RestrictedHours::default(),
            min_checked_in: 3.0,
            min_checked_in_strict: 4.0,
            top_performer_threshold: 6.0,
            barre_quota_per_shift: 2,
            max_same_format_per_day: 3,
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudioConfig {
    /// Locations in sweep order.
    pub locations: Vec<LocationRules>,
    pub rules: StudioRules,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            locations: vec![
                LocationRules::new("Kwality House, Kemps Corner", 2)
                    .deny("powerCycle")
                    .with_sunday_limit(5),
                LocationRules::new("Supreme HQ, Bandra", 3)
                    .deny("HIIT")
                    .deny("Amped Up")
                    .with_sunday_limit(7),
                LocationRules::new("Kenkere House", 2)
                    .deny("powerCycle")
                    .with_sunday_limit(6),
            ],
            rules: StudioRules::default(),
        }
    }
}

impl StudioConfig {
    /// Parses a JSON config; omitted fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Replaces the location list.
    pub fn with_locations(mut self, locations: Vec<LocationRules>) -> Self {
        self.locations = locations;
        self
    }

    pub fn with_rules(mut self, rules: StudioRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn location(&self, name: &str) -> Option<&LocationRules> {
        self.locations.iter().find(|l| l.name == name)
    }

    /// Room count for a location; unknown locations get a single room.
    pub fn capacity(&self, location: &str) -> usize {
        self.location(location)
            .map(|l| l.max_parallel_classes)
            .unwrap_or(1)
    }

    /// Whether a format may run at a location. Unknown locations permit all.
    pub fn format_permitted(&self, location: &str, format: &str) -> bool {
        self.location(location).is_none_or(|l| l.permits(format))
    }

    pub fn sunday_limit(&self, location: &str) -> Option<usize> {
        self.location(location).and_then(|l| l.sunday_class_limit)
    }

    pub fn location_names(&self) -> Vec<&str> {
        self.locations.iter().map(|l| l.name.as_str()).collect()
    }
}

/// Objective used to rank historical candidates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationType {
    Revenue,
    Attendance,
    #[default]
    Balanced,
}

/// Per-invocation synthesis options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SynthesisOptions {
    /// Visit a day's slots by descending historical score instead of
    /// chronologically during historical fill.
    pub prioritize_top_performers: bool,
    /// Run the Barre 57 shift-quota phase.
    pub balance_shifts: bool,
    /// Use `target_teacher_hours` as the standard weekly cap.
    pub optimize_teacher_hours: bool,
    /// Has no effect. The midday blackout is a hard rule and is enforced
    /// whatever this is set to; only private classes are exempt. Kept so
    /// existing option payloads still deserialize.
    pub respect_time_restrictions: bool,
    /// Prefer trainers already working the same location and shift.
    pub minimize_trainers_per_shift: bool,
    pub optimization_type: OptimizationType,
    /// Variation counter; 0 is the base strategy.
    pub iteration: u32,
    /// Restrict synthesis to a single day.
    pub target_day: Option<Weekday>,
    pub target_teacher_hours: f64,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            prioritize_top_performers: true,
            balance_shifts: true,
            optimize_teacher_hours: true,
            respect_time_restrictions: true,
            minimize_trainers_per_shift: true,
            optimization_type: OptimizationType::Balanced,
            iteration: 0,
            target_day: None,
            target_teacher_hours: 15.0,
        }
    }
}

impl SynthesisOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_iteration(mut self, iteration: u32) -> Self {
        self.iteration = iteration;
        self
    }

    pub fn with_target_day(mut self, day: Weekday) -> Self {
        self.target_day = Some(day);
        self
    }

    pub fn with_optimization(mut self, optimization_type: OptimizationType) -> Self {
        self.optimization_type = optimization_type;
        self
    }

    pub fn with_target_teacher_hours(mut self, hours: f64) -> Self {
        self.target_teacher_hours = hours;
        self
    }

    /// Standard-trainer weekly cap for this run.
    pub fn standard_weekly_cap(&self, rules: &StudioRules) -> f64 {
        if self.optimize_teacher_hours {
            self.target_teacher_hours
        } else {
            rules.max_weekly_hours
        }
    }
}
