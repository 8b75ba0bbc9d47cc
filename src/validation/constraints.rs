//! Constraint validator.
//!
//! Pure predicate checks of one proposed class against a ledger. A class
//! in the ledger with the proposal's id is ignored, so re-checking a
//! committed class against its own ledger is idempotent.

use crate::config::StudioConfig;
use crate::ledger::ScheduleLedger;
use crate::models::{format, ScheduledClass, TrainerClass, TrainerRoster};

use super::{CheckReport, CheckResult, ConstraintViolation, SoftWarning, ViolationKind};

const EPSILON: f64 = 1e-9;

/// Checks proposed classes against studio and staffing rules.
#[derive(Debug, Clone)]
pub struct ConstraintValidator {
    config: StudioConfig,
    roster: TrainerRoster,
    standard_cap_hours: f64,
}

impl ConstraintValidator {
    /// Creates a validator; the standard weekly cap comes from the config.
    pub fn new(config: StudioConfig, roster: TrainerRoster) -> Self {
        let standard_cap_hours = config.rules.max_weekly_hours;
        Self {
            config,
            roster,
            standard_cap_hours,
        }
    }

    /// Overrides the weekly cap for standard trainers.
    pub fn with_standard_cap(mut self, hours: f64) -> Self {
        self.standard_cap_hours = hours;
        self
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn roster(&self) -> &TrainerRoster {
        &self.roster
    }

    /// Weekly hour cap for a trainer: per-trainer override, else the
    /// classification cap.
    pub fn weekly_cap(&self, teacher: &str) -> f64 {
        if let Some(hours) = self.roster.get(teacher).and_then(|t| t.max_weekly_hours) {
            return hours;
        }
        match self.roster.class_of(teacher) {
            TrainerClass::NewTrainer => self.config.rules.new_trainer_max_hours,
            _ => self.standard_cap_hours,
        }
    }

    /// Runs every check in order and stops at the first violation.
    pub fn check(&self, ledger: &ScheduleLedger, proposal: &ScheduledClass) -> CheckResult {
        self.format_allowed_ok(proposal)?;
        self.restricted_hour_ok(proposal)?;
        self.capacity_ok(ledger, proposal)?;
        self.trainer_conflict_ok(ledger, proposal)?;
        self.consecutive_ok(ledger, proposal)?;
        self.daily_cap_ok(ledger, proposal)?;
        self.weekly_cap_ok(ledger, proposal)
    }

    /// Runs every check and collects all violations and warnings.
    pub fn check_all(&self, ledger: &ScheduleLedger, proposal: &ScheduledClass) -> CheckReport {
        let mut report = CheckReport::default();
        let hard = [
            self.format_allowed_ok(proposal),
            self.restricted_hour_ok(proposal),
            self.capacity_ok(ledger, proposal),
            self.trainer_conflict_ok(ledger, proposal),
            self.consecutive_ok(ledger, proposal),
            self.daily_cap_ok(ledger, proposal),
        ];
        for result in hard {
            if let Err(v) = result {
                report.violations.push(v);
            }
        }
        match self.weekly_cap_ok(ledger, proposal) {
            Ok(Some(w)) => report.warnings.push(w),
            Ok(None) => {}
            Err(v) => report.violations.push(v),
        }
        report
    }

    /// Location format rules, new-trainer whitelist, inactive trainers.
    pub fn format_allowed_ok(&self, proposal: &ScheduledClass) -> Result<(), ConstraintViolation> {
        if self.roster.is_inactive(&proposal.teacher) {
            return Err(ConstraintViolation::new(
                ViolationKind::InactiveTrainer,
                proposal,
                format!("{} is inactive", proposal.teacher),
            ));
        }
        if !self
            .config
            .format_permitted(&proposal.location, &proposal.format)
        {
            return Err(ConstraintViolation::new(
                ViolationKind::FormatNotAllowed,
                proposal,
                format!("{} is not offered at {}", proposal.format, proposal.location),
            ));
        }
        if self.roster.class_of(&proposal.teacher) == TrainerClass::NewTrainer
            && !self
                .config
                .rules
                .new_trainer_formats
                .iter()
                .any(|f| format::same_format(f, &proposal.format))
        {
            return Err(ConstraintViolation::new(
                ViolationKind::NewTrainerFormat,
                proposal,
                format!(
                    "{} is a new trainer and cannot teach {}",
                    proposal.teacher, proposal.format
                ),
            ));
        }
        Ok(())
    }

    /// Non-private classes may not start in the midday blackout.
    pub fn restricted_hour_ok(&self, proposal: &ScheduledClass) -> Result<(), ConstraintViolation> {
        if !proposal.is_private
            && self
                .config
                .rules
                .restricted_hours
                .is_restricted(proposal.day, proposal.time)
        {
            return Err(ConstraintViolation::new(
                ViolationKind::RestrictedHours,
                proposal,
                format!(
                    "Classes cannot start at {} on {} (restricted hours)",
                    proposal.time, proposal.day
                ),
            ));
        }
        Ok(())
    }

    /// Every cell the proposal covers must have a free room.
    pub fn capacity_ok(
        &self,
        ledger: &ScheduleLedger,
        proposal: &ScheduledClass,
    ) -> Result<(), ConstraintViolation> {
        let capacity = self.config.capacity(&proposal.location);
        let existing: Vec<&ScheduledClass> = ledger
            .classes_on(&proposal.location, proposal.day)
            .filter(|c| is_other(c, proposal))
            .collect();

        for cell in proposal.cells() {
            let covering = existing.iter().filter(|c| c.occupies(cell)).count();
            if covering >= capacity {
                return Err(ConstraintViolation::new(
                    ViolationKind::CapacityExceeded,
                    proposal,
                    format!(
                        "{} already has {} classes at {} on {} (capacity {})",
                        proposal.location, covering, cell, proposal.day, capacity
                    ),
                ));
            }
        }
        Ok(())
    }

    /// No overlap with the trainer's classes, one location per day.
    pub fn trainer_conflict_ok(
        &self,
        ledger: &ScheduleLedger,
        proposal: &ScheduledClass,
    ) -> Result<(), ConstraintViolation> {
        let span = proposal.span();
        for c in self.teacher_day(ledger, proposal) {
            if c.location != proposal.location {
                return Err(ConstraintViolation::new(
                    ViolationKind::MultipleLocations,
                    proposal,
                    format!(
                        "{} already teaches at {} on {}",
                        proposal.teacher, c.location, proposal.day
                    ),
                ));
            }
            if c.span().overlaps(&span) {
                return Err(ConstraintViolation::new(
                    ViolationKind::TrainerConflict,
                    proposal,
                    format!(
                        "{} already teaches {} at {} on {}",
                        proposal.teacher, c.format, c.time, proposal.day
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Longest back-to-back run, proposal included, within the limit.
    pub fn consecutive_ok(
        &self,
        ledger: &ScheduleLedger,
        proposal: &ScheduledClass,
    ) -> Result<(), ConstraintViolation> {
        let rules = &self.config.rules;
        let mut timeline = self.teacher_day(ledger, proposal);
        timeline.push(proposal);
        timeline.sort_by_key(|c| c.time);

        let mut run = 1usize;
        let mut longest = 1usize;
        for pair in timeline.windows(2) {
            let gap = i32::from(pair[1].time.minutes()) - i32::from(pair[0].end().minutes());
            if gap <= i32::from(rules.consecutive_gap_minutes) {
                run += 1;
                longest = longest.max(run);
            } else {
                run = 1;
            }
        }

        if longest > rules.max_consecutive_classes {
            return Err(ConstraintViolation::new(
                ViolationKind::ConsecutiveLimit,
                proposal,
                format!(
                    "{} would teach {} consecutive classes on {} (max {})",
                    proposal.teacher, longest, proposal.day, rules.max_consecutive_classes
                ),
            ));
        }
        Ok(())
    }

    /// Post-insertion daily class count and hours.
    pub fn daily_cap_ok(
        &self,
        ledger: &ScheduleLedger,
        proposal: &ScheduledClass,
    ) -> Result<(), ConstraintViolation> {
        let rules = &self.config.rules;
        let day = self.teacher_day(ledger, proposal);
        let count = day.len() + 1;
        let minutes: u32 = day
            .iter()
            .map(|c| u32::from(c.duration_minutes))
            .sum::<u32>()
            + u32::from(proposal.duration_minutes);

        if count > rules.max_daily_classes {
            return Err(ConstraintViolation::new(
                ViolationKind::DailyClassLimit,
                proposal,
                format!(
                    "{} would teach {} classes on {} (max {})",
                    proposal.teacher, count, proposal.day, rules.max_daily_classes
                ),
            ));
        }
        let hours = minutes as f64 / 60.0;
        if hours > rules.max_daily_hours + EPSILON {
            return Err(ConstraintViolation::new(
                ViolationKind::DailyHoursLimit,
                proposal,
                format!(
                    "{} would teach {:.1}h on {} (max {:.1}h)",
                    proposal.teacher, hours, proposal.day, rules.max_daily_hours
                ),
            ));
        }
        Ok(())
    }

    /// Post-insertion weekly hours; warns inside the margin below the cap.
    pub fn weekly_cap_ok(&self, ledger: &ScheduleLedger, proposal: &ScheduledClass) -> CheckResult {
        let mut existing = ledger.weekly_minutes(&proposal.teacher);
        if let Some(previous) = self.replaced(ledger, proposal) {
            if previous.teacher == proposal.teacher {
                existing = existing.saturating_sub(u32::from(previous.duration_minutes));
            }
        }
        let hours = (existing + u32::from(proposal.duration_minutes)) as f64 / 60.0;
        let cap = self.weekly_cap(&proposal.teacher);

        if hours > cap + EPSILON {
            return Err(ConstraintViolation::new(
                ViolationKind::WeeklyHoursExceeded,
                proposal,
                format!(
                    "{} would reach {:.1}h this week (limit {:.1}h)",
                    proposal.teacher, hours, cap
                ),
            ));
        }
        if hours > cap - self.config.rules.weekly_warning_margin_hours + EPSILON {
            return Ok(Some(SoftWarning::WeeklyHoursWarning {
                teacher: proposal.teacher.clone(),
                hours,
                cap,
            }));
        }
        Ok(None)
    }

    /// The trainer's other classes on the proposal's day, by start time.
    fn teacher_day<'a>(
        &self,
        ledger: &'a ScheduleLedger,
        proposal: &ScheduledClass,
    ) -> Vec<&'a ScheduledClass> {
        ledger
            .teacher_classes_on(&proposal.teacher, proposal.day)
            .into_iter()
            .filter(|c| is_other(c, proposal))
            .collect()
    }

    /// The committed class the proposal would replace, if any.
    fn replaced<'a>(
        &self,
        ledger: &'a ScheduleLedger,
        proposal: &ScheduledClass,
    ) -> Option<&'a ScheduledClass> {
        if proposal.id.is_empty() {
            None
        } else {
            ledger.get(&proposal.id)
        }
    }
}

fn is_other(existing: &ScheduledClass, proposal: &ScheduledClass) -> bool {
    proposal.id.is_empty() || existing.id != proposal.id
}
