//! Multi-phase schedule synthesis.
//!
//! # Algorithm
//!
//! Deterministic, greedy, non-backtracking. Each phase sweeps locations ×
//! days × its own slot list once, in a fixed order:
//!
//! 1. **Historical fill**: every on-grid slot with history gets the best
//!    ranked (format, teacher) pair, unless a class already starts there.
//! 2. **Quota enforcement** (`balance_shifts`): at least two Barre 57
//!    classes per location, day and shift.
//! 3. **Strategic express fill**: commuter slots get the best express pair.
//!
//! Every commit is validated first and must respect the location's Sunday
//! ceiling. A rejected candidate is skipped for good; partial fill is
//! normal and reported through [`FillStats`]. The variation selected by
//! `iteration` perturbs candidate choice and sweep order within the
//! phases (see [`Variation`]).
//!
//! # Complexity
//! O(L × D × S × C) validator calls, with L locations, D days, S slots per
//! day and C candidates per slot.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use super::kpi::{FillStats, Phase, PhaseStats};
use super::variation::Variation;
use crate::config::{StudioConfig, SynthesisOptions};
use crate::dispatching::{RankingContext, RuleEngine};
use crate::history::{HistoricalPerformanceIndex, Recommendation, SlotRecommender};
use crate::ledger::ScheduleLedger;
use crate::models::{
    format, PerformanceRecord, ScheduledClass, Shift, TimeOfDay, TrainerRoster, WEEK,
};
use crate::validation::ConstraintValidator;

/// Commuter start times for express classes.
pub const EXPRESS_SLOTS: [TimeOfDay; 9] = [
    TimeOfDay::from_hm(7, 0),
    TimeOfDay::from_hm(7, 30),
    TimeOfDay::from_hm(8, 0),
    TimeOfDay::from_hm(8, 30),
    TimeOfDay::from_hm(17, 30),
    TimeOfDay::from_hm(18, 0),
    TimeOfDay::from_hm(18, 30),
    TimeOfDay::from_hm(19, 0),
    TimeOfDay::from_hm(19, 30),
];

/// Half-hourly start times from `start` through `end` inclusive.
fn half_hours(start: TimeOfDay, end: TimeOfDay) -> Vec<TimeOfDay> {
    (start.minutes()..=end.minutes())
        .step_by(30)
        .map(TimeOfDay::from_minutes)
        .collect()
}

/// Candidate start times for Barre 57 quota classes in a shift.
pub fn quota_slots(shift: Shift) -> Vec<TimeOfDay> {
    match shift {
        Shift::Morning => half_hours(TimeOfDay::from_hm(7, 0), TimeOfDay::from_hm(11, 30)),
        Shift::Evening => half_hours(TimeOfDay::from_hm(17, 30), TimeOfDay::from_hm(20, 0)),
        Shift::Afternoon => Vec::new(),
    }
}

/// Output of one synthesis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisResult {
    /// Committed classes in commit order.
    pub classes: Vec<ScheduledClass>,
    pub stats: FillStats,
}

/// Result of one commit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Committed,
    SundayLimit,
    Rejected,
}

/// Mutable state of one sweep over the grid.
pub(crate) struct Sweep<'p> {
    pub(crate) config: &'p StudioConfig,
    pub(crate) options: &'p SynthesisOptions,
    pub(crate) index: &'p HistoricalPerformanceIndex,
    pub(crate) validator: &'p ConstraintValidator,
    pub(crate) engine: RuleEngine,
    pub(crate) variation: Variation,
    pub(crate) stats: FillStats,
}

impl<'p> Sweep<'p> {
    pub(crate) fn locations(&self) -> Vec<&'p str> {
        self.variation.order_locations(self.config.location_names())
    }

    pub(crate) fn days(&self) -> Vec<Weekday> {
        match self.options.target_day {
            Some(day) => vec![day],
            None => WEEK.to_vec(),
        }
    }

    pub(crate) fn recommender(&self, threshold: f64) -> SlotRecommender<'p> {
        SlotRecommender::new(self.index).with_threshold(threshold)
    }

    /// Ranking context for a slot.
    pub(crate) fn context(
        &self,
        ledger: &ScheduleLedger,
        location: &str,
        day: Weekday,
        shift: Option<Shift>,
    ) -> RankingContext {
        let mut ctx =
            RankingContext::new().with_priority_formats(self.config.rules.priority_formats.clone());
        if let (true, Some(shift)) = (self.options.minimize_trainers_per_shift, shift) {
            ctx.shift_trainers = ledger.teachers_in_shift(location, day, shift);
        }
        ctx
    }

    /// Viable candidates at a slot in preference order, variation applied.
    pub(crate) fn ranked<F>(
        &self,
        ledger: &ScheduleLedger,
        location: &str,
        day: Weekday,
        time: TimeOfDay,
        threshold: f64,
        filter: F,
    ) -> Vec<Recommendation>
    where
        F: Fn(&Recommendation) -> bool,
    {
        let ctx = self.context(ledger, location, day, Some(Shift::of(time)));
        let ranked = self
            .recommender(threshold)
            .ranked(location, day, time, &self.engine, &ctx, filter);
        self.variation.reorder(ranked)
    }

    /// Validates and commits one candidate.
    pub(crate) fn try_commit(
        &mut self,
        ledger: &mut ScheduleLedger,
        phase: Phase,
        location: &str,
        day: Weekday,
        time: TimeOfDay,
        choice: &Recommendation,
    ) -> Outcome {
        if day == Weekday::Sun {
            if let Some(limit) = self.config.sunday_limit(location) {
                if ledger.count_on(location, day) >= limit {
                    self.stats.phase_mut(phase).sunday_limit += 1;
                    return Outcome::SundayLimit;
                }
            }
        }

        let class = ScheduledClass::new(day, time, location, &choice.format, &choice.teacher)
            .with_participants(choice.estimated_participants())
            .with_top_performer(choice.avg_checked_in >= self.config.rules.top_performer_threshold);

        match self.validator.check(ledger, &class) {
            Ok(_) => {
                tracing::debug!(
                    ?phase,
                    location,
                    %day,
                    %time,
                    format = %class.format,
                    teacher = %class.teacher,
                    "committed class"
                );
                ledger.commit(class);
                self.stats.phase_mut(phase).filled += 1;
                Outcome::Committed
            }
            Err(violation) => {
                tracing::debug!(
                    ?phase,
                    location,
                    %day,
                    %time,
                    reason = %violation,
                    "candidate rejected"
                );
                self.stats.record_rejection(violation.kind);
                Outcome::Rejected
            }
        }
    }

    /// Tries the first candidate of a ranked list; counts the slot outcome.
    fn place_first(
        &mut self,
        ledger: &mut ScheduleLedger,
        phase: Phase,
        location: &str,
        day: Weekday,
        time: TimeOfDay,
        ranked: &[Recommendation],
    ) -> bool {
        let Some(choice) = ranked.first() else {
            self.stats.phase_mut(phase).no_candidate += 1;
            return false;
        };
        match self.try_commit(ledger, phase, location, day, time, choice) {
            Outcome::Committed => true,
            Outcome::Rejected => {
                self.stats.phase_mut(phase).rejected += 1;
                false
            }
            Outcome::SundayLimit => false,
        }
    }

    /// Skips slots where a class already starts. Returns true when occupied.
    fn slot_taken(
        &mut self,
        ledger: &ScheduleLedger,
        phase: Phase,
        location: &str,
        day: Weekday,
        time: TimeOfDay,
    ) -> bool {
        if ledger.classes_at(location, day, time).next().is_some() {
            self.stats.phase_mut(phase).occupied += 1;
            true
        } else {
            false
        }
    }

    /// Phase 1: best historical pair per slot.
    pub(crate) fn historical_fill(&mut self, ledger: &mut ScheduleLedger) {
        let threshold = self.config.rules.min_checked_in;
        for location in self.locations() {
            for day in self.days() {
                let mut slots: Vec<TimeOfDay> = self
                    .index
                    .slot_times(location, day)
                    .into_iter()
                    .filter(|t| t.is_on_grid())
                    .collect();
                if self.options.prioritize_top_performers {
                    let recommender = self.recommender(threshold);
                    let score = |t: &TimeOfDay| {
                        recommender
                            .recommend(location, day, *t)
                            .map_or(0.0, |r| r.avg_checked_in)
                    };
                    // stable: equal scores stay chronological
                    slots.sort_by(|a, b| score(b).total_cmp(&score(a)));
                }
                self.variation.order_slots(&mut slots);

                for time in slots {
                    self.stats.historical.considered += 1;
                    if self.slot_taken(ledger, Phase::Historical, location, day, time) {
                        continue;
                    }
                    let ranked = self.ranked(ledger, location, day, time, threshold, |_| true);
                    if let Some(top) = ranked.first() {
                        if is_early_week(day) && format::is_recovery(&top.format) {
                            self.stats.historical.no_candidate += 1;
                            continue;
                        }
                    }
                    self.place_first(ledger, Phase::Historical, location, day, time, &ranked);
                }
            }
        }
        log_phase(Phase::Historical, &self.stats.historical);
    }

    /// Phase 2: Barre 57 quota per location, day and shift.
    pub(crate) fn enforce_quota(&mut self, ledger: &mut ScheduleLedger) {
        let threshold = self.config.rules.min_checked_in_strict;
        let quota = self.config.rules.barre_quota_per_shift;
        for location in self.locations() {
            for day in self.days() {
                for shift in [Shift::Morning, Shift::Evening] {
                    let present = ledger
                        .classes_on(location, day)
                        .filter(|c| c.shift() == shift && format::is_barre_57(&c.format))
                        .count();
                    let needed = quota.saturating_sub(present);
                    if needed == 0 {
                        continue;
                    }

                    let mut slots = quota_slots(shift);
                    self.variation.order_slots(&mut slots);
                    let mut added = 0;
                    for time in slots {
                        if added >= needed {
                            break;
                        }
                        self.stats.quota.considered += 1;
                        if self.slot_taken(ledger, Phase::Quota, location, day, time) {
                            continue;
                        }
                        let ranked = self.ranked(ledger, location, day, time, threshold, |c| {
                            format::is_barre_57(&c.format)
                        });
                        if self.place_first(ledger, Phase::Quota, location, day, time, &ranked) {
                            added += 1;
                        }
                    }
                }
            }
        }
        log_phase(Phase::Quota, &self.stats.quota);
    }

    /// Phase 3: express classes in empty commuter slots.
    pub(crate) fn express_fill(&mut self, ledger: &mut ScheduleLedger) {
        let threshold = self.config.rules.min_checked_in_strict;
        for location in self.locations() {
            for day in self.days() {
                let mut slots = EXPRESS_SLOTS.to_vec();
                self.variation.order_slots(&mut slots);
                for time in slots {
                    self.stats.express.considered += 1;
                    if self.slot_taken(ledger, Phase::Express, location, day, time) {
                        continue;
                    }
                    let ranked = self.ranked(ledger, location, day, time, threshold, |c| {
                        format::is_express(&c.format)
                    });
                    self.place_first(ledger, Phase::Express, location, day, time, &ranked);
                }
            }
        }
        log_phase(Phase::Express, &self.stats.express);
    }
}

fn is_early_week(day: Weekday) -> bool {
    matches!(day, Weekday::Mon | Weekday::Tue | Weekday::Wed)
}

pub(crate) fn log_phase(phase: Phase, stats: &PhaseStats) {
    tracing::info!(
        ?phase,
        considered = stats.considered,
        filled = stats.filled,
        occupied = stats.occupied,
        no_candidate = stats.no_candidate,
        rejected = stats.rejected,
        sunday_limit = stats.sunday_limit,
        "phase complete"
    );
}

/// Weekly schedule synthesis over historical records.
///
/// # Example
/// ```
/// use chrono::Weekday;
/// use u_studio::config::SynthesisOptions;
/// use u_studio::models::{PerformanceRecord, TimeOfDay, TrainerRoster};
/// use u_studio::scheduler::SynthesisPipeline;
///
/// let records = vec![PerformanceRecord::new(
///     "Studio Barre 57",
///     "Kenkere House",
///     Weekday::Mon,
///     TimeOfDay::from_hm(7, 0),
///     "Anisha Shah",
///     8.0,
/// )];
/// let result = SynthesisPipeline::new(&records, &TrainerRoster::new(), SynthesisOptions::default()).run();
/// assert_eq!(result.classes.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct SynthesisPipeline {
    config: StudioConfig,
    options: SynthesisOptions,
    index: HistoricalPerformanceIndex,
    validator: ConstraintValidator,
}

impl SynthesisPipeline {
    /// Creates a pipeline with the default studio configuration.
    pub fn new(records: &[PerformanceRecord], roster: &TrainerRoster, options: SynthesisOptions) -> Self {
        Self::with_config(records, roster, StudioConfig::default(), options)
    }

    /// Creates a pipeline with an explicit configuration.
    ///
    /// The roster is merged over the trainers discovered in `records`.
    pub fn with_config(
        records: &[PerformanceRecord],
        roster: &TrainerRoster,
        config: StudioConfig,
        options: SynthesisOptions,
    ) -> Self {
        let roster = TrainerRoster::from_records(records).merge(roster.trainers().cloned());
        let index = HistoricalPerformanceIndex::build(records, &roster);
        let cap = options.standard_weekly_cap(&config.rules);
        let validator = ConstraintValidator::new(config.clone(), roster).with_standard_cap(cap);
        Self {
            config,
            options,
            index,
            validator,
        }
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn options(&self) -> &SynthesisOptions {
        &self.options
    }

    pub fn index(&self) -> &HistoricalPerformanceIndex {
        &self.index
    }

    /// The validator synthesis commits through (same rules for manual edits).
    pub fn validator(&self) -> &ConstraintValidator {
        &self.validator
    }

    pub(crate) fn sweep(&self) -> Sweep<'_> {
        if !self.options.respect_time_restrictions {
            tracing::debug!("respect_time_restrictions is off; restricted hours are enforced regardless");
        }
        let variation = Variation::new(self.options.iteration);
        let engine = variation.engine(RuleEngine::for_objective(
            self.options.optimization_type,
            self.options.minimize_trainers_per_shift,
        ));
        Sweep {
            config: &self.config,
            options: &self.options,
            index: &self.index,
            validator: &self.validator,
            engine,
            variation,
            stats: FillStats::default(),
        }
    }

    /// Synthesizes a schedule from an empty ledger.
    pub fn run(&self) -> SynthesisResult {
        self.run_on(ScheduleLedger::new())
    }

    /// Synthesizes on top of existing classes (e.g. locked ones).
    ///
    /// Existing classes are kept and count against every constraint.
    pub fn run_on(&self, mut ledger: ScheduleLedger) -> SynthesisResult {
        let mut sweep = self.sweep();
        tracing::info!(
            iteration = self.options.iteration,
            variation = sweep.variation.strategy().name(),
            existing = ledger.len(),
            "starting synthesis"
        );

        sweep.historical_fill(&mut ledger);
        if self.options.balance_shifts {
            sweep.enforce_quota(&mut ledger);
        }
        sweep.express_fill(&mut ledger);

        tracing::info!(
            classes = ledger.len(),
            added = sweep.stats.total_filled(),
            "synthesis complete"
        );
        SynthesisResult {
            classes: ledger.into_classes(),
            stats: sweep.stats,
        }
    }
}

/// Synthesizes a weekly schedule with the default studio configuration.
pub fn synthesize(
    records: &[PerformanceRecord],
    roster: &TrainerRoster,
    options: SynthesisOptions,
) -> Vec<ScheduledClass> {
    SynthesisPipeline::new(records, roster, options).run().classes
}
