//! Manual edit validation.

use serde::{Deserialize, Serialize};

use super::{ConstraintValidator, ConstraintViolation, SoftWarning};
use crate::ledger::ScheduleLedger;
use crate::models::ScheduledClass;

/// Outcome category of a proposed edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditStatus {
    /// Commit.
    Valid,
    /// Commit only after confirmation.
    Warning,
    /// Refused.
    Invalid,
}

/// Verdict for one proposed class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditVerdict {
    pub status: EditStatus,
    pub message: String,
    pub violations: Vec<ConstraintViolation>,
    pub warnings: Vec<SoftWarning>,
    /// Invalid only because of the weekly-hours cap; a human may confirm.
    pub overridable: bool,
}

impl EditVerdict {
    /// Whether the edit may be committed, given whether a human confirmed.
    pub fn allows(&self, confirmed: bool) -> bool {
        match self.status {
            EditStatus::Valid => true,
            EditStatus::Warning => confirmed,
            EditStatus::Invalid => self.overridable && confirmed,
        }
    }
}

/// Checks one proposed class against a live ledger.
///
/// Runs every hard check plus the weekly soft check; the ledger is not
/// touched, so repeated calls return the same verdict.
pub fn validate_edit(
    ledger: &ScheduleLedger,
    proposal: &ScheduledClass,
    validator: &ConstraintValidator,
) -> EditVerdict {
    let report = validator.check_all(ledger, proposal);
    let overridable = report.is_overridable();

    let (status, message) = if !report.violations.is_empty() {
        (EditStatus::Invalid, join(&report.violations))
    } else if !report.warnings.is_empty() {
        (EditStatus::Warning, join(&report.warnings))
    } else {
        (EditStatus::Valid, "Class can be scheduled".to_string())
    };

    tracing::debug!(
        teacher = %proposal.teacher,
        day = %proposal.day,
        time = %proposal.time,
        ?status,
        "validated manual edit"
    );

    EditVerdict {
        status,
        message,
        violations: report.violations,
        warnings: report.warnings,
        overridable,
    }
}

fn join<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
