//! Trainer roster model.
//!
//! Trainers are the human resource classes are assigned to. Each trainer
//! carries a classification that decides weekly hour caps and which
//! formats they may teach, plus optional specialties and a per-trainer
//! hour override.
//!
//! The roster is the union of trainers discovered in historical records and
//! custom entries supplied by the caller; custom entries win on conflict.
//!
//! Only `class` and `max_weekly_hours` constrain synthesis. `specialties`
//! and `priority` are carried through unchanged for callers (roster
//! editors, reports); no ranking rule reads them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::PerformanceRecord;

/// A trainer who can be assigned classes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trainer {
    /// Full name, as it appears in historical records.
    pub name: String,
    /// Employment classification.
    pub class: TrainerClass,
    /// Formats this trainer is known for. Informational; not used in ranking.
    pub specialties: Vec<String>,
    /// Weekly hour cap overriding the classification cap.
    pub max_weekly_hours: Option<f64>,
    /// Priority label kept for callers. Informational; not used in ranking.
    pub priority: TrainerPriority,
}

/// Trainer classification.
///
/// Determines weekly hour cap and format eligibility.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrainerClass {
    /// Regular trainer with the standard weekly cap.
    #[default]
    Standard,
    /// Recently onboarded: reduced cap, restricted to whitelisted formats.
    NewTrainer,
    /// Not scheduled; historical records are ignored.
    Inactive,
}

/// Priority label attached to a roster entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainerPriority {
    High,
    #[default]
    Normal,
    Low,
}

impl Trainer {
    /// Creates a standard trainer.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class: TrainerClass::Standard,
            specialties: Vec::new(),
            max_weekly_hours: None,
            priority: TrainerPriority::Normal,
        }
    }

    /// Creates a new-trainer entry.
    pub fn new_trainer(name: impl Into<String>) -> Self {
        Self::new(name).with_class(TrainerClass::NewTrainer)
    }

    /// Creates an inactive entry.
    pub fn inactive(name: impl Into<String>) -> Self {
        Self::new(name).with_class(TrainerClass::Inactive)
    }

    pub fn with_class(mut self, class: TrainerClass) -> Self {
        self.class = class;
        self
    }

    /// Adds a specialty format.
    pub fn with_specialty(mut self, format: impl Into<String>) -> Self {
        self.specialties.push(format.into());
        self
    }

    /// Sets a weekly hour cap for this trainer only.
    pub fn with_max_weekly_hours(mut self, hours: f64) -> Self {
        self.max_weekly_hours = Some(hours.max(0.0));
        self
    }

    pub fn with_priority(mut self, priority: TrainerPriority) -> Self {
        self.priority = priority;
        self
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.class != TrainerClass::Inactive
    }
}

/// The set of known trainers, keyed by name.
///
/// Lookups of unknown names return `None`; callers treat unknown trainers
/// as [`TrainerClass::Standard`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainerRoster {
    trainers: HashMap<String, Trainer>,
}

impl TrainerRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discovers trainers from historical records (all standard).
    pub fn from_records(records: &[PerformanceRecord]) -> Self {
        let mut roster = Self::new();
        for r in records {
            let name = r.teacher.trim();
            if !name.is_empty() && !roster.trainers.contains_key(name) {
                roster.add(Trainer::new(name));
            }
        }
        roster
    }

    /// Adds or replaces a trainer.
    pub fn add(&mut self, trainer: Trainer) {
        self.trainers.insert(trainer.name.clone(), trainer);
    }

    /// Builder: adds a trainer and returns self.
    pub fn with_trainer(mut self, trainer: Trainer) -> Self {
        self.add(trainer);
        self
    }

    /// Merges custom entries over this roster.
    pub fn merge(mut self, custom: impl IntoIterator<Item = Trainer>) -> Self {
        for t in custom {
            self.add(t);
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&Trainer> {
        self.trainers.get(name)
    }

    /// Classification of a trainer (unknown names are standard).
    pub fn class_of(&self, name: &str) -> TrainerClass {
        self.get(name).map(|t| t.class).unwrap_or_default()
    }

    pub fn is_inactive(&self, name: &str) -> bool {
        self.class_of(name) == TrainerClass::Inactive
    }

    /// Active trainer names, sorted.
    pub fn active_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .trainers
            .values()
            .filter(|t| t.is_active())
            .map(|t| t.name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    /// All trainers, in no particular order.
    pub fn trainers(&self) -> impl Iterator<Item = &Trainer> {
        self.trainers.values()
    }

    pub fn len(&self) -> usize {
        self.trainers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trainers.is_empty()
    }
}
