//! Whole-schedule audit.
//!
//! Replays an arbitrary schedule (imported, hand-edited, or produced
//! elsewhere) class by class and reports every rule it breaks instead of
//! stopping at the first problem.

use std::collections::{HashMap, HashSet};

use chrono::Weekday;

use super::{ConstraintValidator, ConstraintViolation, ViolationKind};
use crate::ledger::ScheduleLedger;
use crate::models::ScheduledClass;

/// Reports every constraint breach in `classes`.
///
/// Classes are checked in order against the classes before them, so each
/// breach is attributed to the class that introduced it. Every earlier
/// class counts, whatever its id; a reused id is itself reported. Sunday
/// ceilings are checked per location.
pub fn audit_schedule(
    classes: &[ScheduledClass],
    validator: &ConstraintValidator,
) -> Vec<ConstraintViolation> {
    let mut violations = Vec::new();
    let mut ledger = ScheduleLedger::new().with_id_prefix("audit");
    let mut sunday_counts: HashMap<&str, usize> = HashMap::new();
    let mut seen_ids: HashSet<&str> = HashSet::new();

    for class in classes {
        if !class.id.is_empty() && !seen_ids.insert(class.id.as_str()) {
            violations.push(ConstraintViolation::new(
                ViolationKind::DuplicateId,
                class,
                format!("class id {} is used more than once", class.id),
            ));
        }

        // an anonymous copy is checked against every earlier class
        let mut anonymous = class.clone();
        anonymous.id.clear();
        violations.extend(
            validator
                .check_all(&ledger, &anonymous)
                .violations
                .into_iter()
                .map(|mut v| {
                    v.class_id = class.id.clone();
                    v
                }),
        );

        if class.day == Weekday::Sun {
            let count = sunday_counts.entry(class.location.as_str()).or_insert(0);
            *count += 1;
            if let Some(limit) = validator.config().sunday_limit(&class.location) {
                if *count > limit {
                    violations.push(ConstraintViolation::new(
                        ViolationKind::SundayLimit,
                        class,
                        format!(
                            "{} has {} Sunday classes (max {})",
                            class.location, count, limit
                        ),
                    ));
                }
            }
        }

        ledger.commit(class.clone());
    }

    if !violations.is_empty() {
        tracing::info!(
            classes = classes.len(),
            violations = violations.len(),
            "schedule audit found violations"
        );
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StudioConfig;
    use crate::models::{TimeOfDay, TrainerRoster};

    const KENKERE: &str = "Kenkere House";

    fn at(day: Weekday, h: u16, m: u16, format: &str, teacher: &str) -> ScheduledClass {
        ScheduledClass::new(day, TimeOfDay::from_hm(h, m), KENKERE, format, teacher)
    }

    fn validator() -> ConstraintValidator {
        ConstraintValidator::new(StudioConfig::default(), TrainerRoster::new())
    }

    #[test]
    fn test_clean_schedule() {
        let classes = vec![
            at(Weekday::Mon, 7, 0, "Studio Barre 57", "Anisha Shah").with_id("a"),
            at(Weekday::Mon, 7, 0, "Studio FIT", "Richard D").with_id("b"),
            at(Weekday::Mon, 18, 0, "Studio Barre 57", "Anisha Shah").with_id("c"),
        ];
        assert!(audit_schedule(&classes, &validator()).is_empty());
    }

    #[test]
    fn test_collects_every_breach() {
        let classes = vec![
            at(Weekday::Tue, 9, 0, "Studio Barre 57", "Anisha Shah").with_id("a"),
            at(Weekday::Tue, 9, 30, "Studio FIT", "Anisha Shah").with_id("b"),
            at(Weekday::Tue, 13, 0, "Studio Mat 57", "Richard D").with_id("c"),
            ScheduledClass::new(
                Weekday::Tue,
                TimeOfDay::from_hm(18, 0),
                "Supreme HQ, Bandra",
                "Studio FIT",
                "Anisha Shah",
            )
            .with_id("d"),
        ];
        let violations = audit_schedule(&classes, &validator());
        let found: Vec<(&str, ViolationKind)> = violations
            .iter()
            .map(|v| (v.class_id.as_str(), v.kind))
            .collect();
        assert!(found.contains(&("b", ViolationKind::TrainerConflict)));
        assert!(found.contains(&("c", ViolationKind::RestrictedHours)));
        assert!(found.contains(&("d", ViolationKind::MultipleLocations)));
        assert!(!found.iter().any(|(id, _)| *id == "a"));
    }

    #[test]
    fn test_sunday_ceiling() {
        // Kenkere House allows six Sunday classes
        let slots = [(7, "A"), (7, "B"), (9, "C"), (9, "D"), (11, "E"), (16, "F"), (18, "G")];
        let classes: Vec<ScheduledClass> = slots
            .iter()
            .enumerate()
            .map(|(i, (hour, t))| at(Weekday::Sun, *hour, 0, "Studio FIT", t).with_id(format!("s{i}")))
            .collect();
        let violations = audit_schedule(&classes, &validator());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, ViolationKind::SundayLimit);
        assert_eq!(violations[0].class_id, "s6");
    }

    #[test]
    fn test_shared_id_still_checked() {
        let classes = vec![
            at(Weekday::Wed, 9, 0, "Studio Barre 57", "Anisha Shah").with_id("dup"),
            at(Weekday::Wed, 9, 30, "Studio FIT", "Anisha Shah").with_id("dup"),
        ];
        let violations = audit_schedule(&classes, &validator());
        let kinds: Vec<ViolationKind> = violations.iter().map(|v| v.kind).collect();
        assert!(kinds.contains(&ViolationKind::DuplicateId));
        assert!(kinds.contains(&ViolationKind::TrainerConflict));
        assert!(violations.iter().all(|v| v.class_id == "dup"));
    }
}
