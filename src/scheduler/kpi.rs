//! Fill statistics and schedule quality metrics (KPIs).
//!
//! The pipeline is greedy and may under-fill; [`FillStats`] records what
//! each phase attempted and why slots stayed empty. [`ScheduleKpi`]
//! summarizes a finished schedule.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Grid Fill Rate | Occupied room-cells / available room-cells |
//! | Teacher Hours | Weekly hours per teacher |
//! | Top-Performer Share | Fraction of classes flagged top performer |
//! | Avg Participants | Mean estimated participants per class |

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::config::StudioConfig;
use crate::models::{grid_slots, ScheduledClass, WEEK};
use crate::validation::ViolationKind;

/// Synthesis phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Historical,
    Quota,
    Express,
    GapFill,
}

/// What one phase attempted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseStats {
    /// Slots visited.
    pub considered: usize,
    /// Classes committed.
    pub filled: usize,
    /// Slots skipped because a class already starts there.
    pub occupied: usize,
    /// Slots with no viable candidate.
    pub no_candidate: usize,
    /// Slots where every candidate failed validation.
    pub rejected: usize,
    /// Commits refused by a Sunday ceiling.
    pub sunday_limit: usize,
}

impl PhaseStats {
    /// Filled / considered (0 when nothing was considered).
    pub fn fill_rate(&self) -> f64 {
        if self.considered == 0 {
            0.0
        } else {
            self.filled as f64 / self.considered as f64
        }
    }
}

/// Per-run statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillStats {
    pub historical: PhaseStats,
    pub quota: PhaseStats,
    pub express: PhaseStats,
    pub gap_fill: PhaseStats,
    /// Validator rejections by kind, over all phases.
    pub rejections: BTreeMap<ViolationKind, usize>,
}

impl FillStats {
    pub fn phase(&self, phase: Phase) -> &PhaseStats {
        match phase {
            Phase::Historical => &self.historical,
            Phase::Quota => &self.quota,
            Phase::Express => &self.express,
            Phase::GapFill => &self.gap_fill,
        }
    }

    pub fn phase_mut(&mut self, phase: Phase) -> &mut PhaseStats {
        match phase {
            Phase::Historical => &mut self.historical,
            Phase::Quota => &mut self.quota,
            Phase::Express => &mut self.express,
            Phase::GapFill => &mut self.gap_fill,
        }
    }

    pub(crate) fn record_rejection(&mut self, kind: ViolationKind) {
        *self.rejections.entry(kind).or_insert(0) += 1;
    }

    /// Classes committed over all phases.
    pub fn total_filled(&self) -> usize {
        [Phase::Historical, Phase::Quota, Phase::Express, Phase::GapFill]
            .iter()
            .map(|&p| self.phase(p).filled)
            .sum()
    }
}

/// Schedule performance indicators.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleKpi {
    pub total_classes: usize,
    pub classes_by_location: HashMap<String, usize>,
    /// Occupied room-cells over room-cells available on the weekly grid (0.0..1.0).
    pub grid_fill_rate: f64,
    /// Weekly hours per teacher.
    pub teacher_hours: HashMap<String, f64>,
    pub avg_teacher_hours: f64,
    pub max_teacher_hours: f64,
    /// Fraction of classes flagged top performer (0.0..1.0).
    pub top_performer_share: f64,
    pub avg_participants: f64,
}

impl ScheduleKpi {
    /// Computes KPIs for a schedule under a studio configuration.
    pub fn calculate(classes: &[ScheduledClass], config: &StudioConfig) -> Self {
        let mut classes_by_location: HashMap<String, usize> = HashMap::new();
        let mut teacher_hours: HashMap<String, f64> = HashMap::new();
        let mut occupied_cells: usize = 0;
        let mut top = 0usize;
        let mut participants: u64 = 0;

        for class in classes {
            *classes_by_location.entry(class.location.clone()).or_insert(0) += 1;
            *teacher_hours.entry(class.teacher.clone()).or_insert(0.0) += class.duration_hours();
            occupied_cells += class.cells().count();
            if class.is_top_performer {
                top += 1;
            }
            participants += u64::from(class.participants);
        }

        let cells_per_day = grid_slots().count();
        let rooms: usize = config.locations.iter().map(|l| l.max_parallel_classes).sum();
        let available = rooms * cells_per_day * WEEK.len();
        let grid_fill_rate = if available == 0 {
            0.0
        } else {
            (occupied_cells as f64 / available as f64).min(1.0)
        };

        let (avg_teacher_hours, max_teacher_hours) = if teacher_hours.is_empty() {
            (0.0, 0.0)
        } else {
            let sum: f64 = teacher_hours.values().sum();
            let max = teacher_hours.values().copied().fold(0.0, f64::max);
            (sum / teacher_hours.len() as f64, max)
        };

        let n = classes.len();
        let (top_performer_share, avg_participants) = if n == 0 {
            (0.0, 0.0)
        } else {
            (top as f64 / n as f64, participants as f64 / n as f64)
        };

        Self {
            total_classes: n,
            classes_by_location,
            grid_fill_rate,
            teacher_hours,
            avg_teacher_hours,
            max_teacher_hours,
            top_performer_share,
            avg_participants,
        }
    }

    /// Whether the schedule meets the given quality thresholds.
    pub fn meets_thresholds(&self, min_fill_rate: f64, max_teacher_hours: f64) -> bool {
        self.grid_fill_rate >= min_fill_rate && self.max_teacher_hours <= max_teacher_hours
    }
}
