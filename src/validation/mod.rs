//! Constraint checks for proposed and committed classes.
//!
//! - [`ConstraintValidator`] answers "may this class join this ledger?"
//!   with structured results; it never mutates and never panics.
//! - [`validate_edit`] turns the checks into a verdict for one manual edit.
//! - [`audit_schedule`] reports every breach in an existing schedule.
//!
//! Checks run in a fixed order: format eligibility, restricted hours,
//! studio capacity, trainer conflict, consecutive run, daily caps, weekly
//! cap. The first failure is the reported reason in synthesis; manual
//! edits collect them all.

mod audit;
mod constraints;
mod edit;

pub use audit::audit_schedule;
pub use constraints::ConstraintValidator;
pub use edit::{validate_edit, EditStatus, EditVerdict};

use serde::{Deserialize, Serialize};

use crate::models::ScheduledClass;

/// Categories of hard constraint violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ViolationKind {
    /// Format deny-listed at the location, or missing from its allow-list.
    FormatNotAllowed,
    /// New trainer proposed for a format outside the new-trainer whitelist.
    NewTrainerFormat,
    /// Trainer is inactive.
    InactiveTrainer,
    /// Non-private class starting in the midday blackout.
    RestrictedHours,
    /// More concurrent classes than the location has rooms.
    CapacityExceeded,
    /// Overlaps another class of the same trainer.
    TrainerConflict,
    /// Trainer already teaches at another location that day.
    MultipleLocations,
    /// Back-to-back run longer than allowed.
    ConsecutiveLimit,
    DailyClassLimit,
    DailyHoursLimit,
    /// Weekly hours over the trainer's cap. The only overridable kind.
    WeeklyHoursExceeded,
    /// More Sunday classes than the location's ceiling.
    SundayLimit,
    /// Class id already used by an earlier class in the schedule.
    DuplicateId,
}

impl ViolationKind {
    /// Whether a human may confirm past this violation.
    pub fn is_overridable(self) -> bool {
        self == ViolationKind::WeeklyHoursExceeded
    }
}

/// A hard constraint violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintViolation {
    pub kind: ViolationKind,
    /// Id of the offending class (empty for uncommitted proposals).
    pub class_id: String,
    pub teacher: String,
    /// Human-readable description.
    pub message: String,
}

impl ConstraintViolation {
    pub(crate) fn new(kind: ViolationKind, class: &ScheduledClass, message: impl Into<String>) -> Self {
        Self {
            kind,
            class_id: class.id.clone(),
            teacher: class.teacher.clone(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// A soft finding that needs confirmation but does not block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum SoftWarning {
    /// Weekly hours within the warning margin of the cap.
    WeeklyHoursWarning {
        teacher: String,
        hours: f64,
        cap: f64,
    },
}

impl std::fmt::Display for SoftWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SoftWarning::WeeklyHoursWarning { teacher, hours, cap } => write!(
                f,
                "{teacher} would reach {hours:.1}h this week, close to the {cap:.1}h limit"
            ),
        }
    }
}

/// Outcome of a single check that may also warn.
pub type CheckResult = Result<Option<SoftWarning>, ConstraintViolation>;

/// Every violation and warning for one proposal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckReport {
    pub violations: Vec<ConstraintViolation>,
    pub warnings: Vec<SoftWarning>,
}

impl CheckReport {
    /// No hard violations.
    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }

    /// Violations exist and all of them are overridable.
    pub fn is_overridable(&self) -> bool {
        !self.violations.is_empty() && self.violations.iter().all(|v| v.kind.is_overridable())
    }
}
