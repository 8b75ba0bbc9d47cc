//! Gap filling on an existing schedule.
//!
//! Two passes per (location, day):
//!
//! 1. **Open slots**: every morning (07:00–11:45) and evening (17:00–20:00)
//!    slot with a free room gets the best historical pair whose format is
//!    not already starting there. Candidates are tried in rank order until
//!    one validates.
//! 2. **Mix balance**: days with fewer than two Barre 57 classes get the
//!    best Barre 57 pair of the day injected; days where one format runs
//!    more than `max_same_format_per_day` times get up to two missing
//!    variety formats.
//!
//! Existing classes are never moved or removed.

use chrono::Weekday;

use super::kpi::{Phase, PhaseStats};
use super::pipeline::{log_phase, Outcome, Sweep, SynthesisPipeline};
use crate::config::SynthesisOptions;
use crate::history::Recommendation;
use crate::ledger::ScheduleLedger;
use crate::models::{format, grid_slots, PerformanceRecord, ScheduledClass, TimeOfDay, TrainerRoster};

/// Barre 57 classes expected per location and day.
pub const MIN_DAILY_BARRE: usize = 2;

/// Variety formats injected per location and day, at most.
pub const MAX_VARIETY_INJECTIONS: usize = 2;

/// Morning and evening start times visited by gap filling.
pub fn gap_slots() -> Vec<TimeOfDay> {
    grid_slots()
        .filter(|t| matches!(t.hour(), 7..=11 | 17..=20))
        .collect()
}

impl Sweep<'_> {
    pub(crate) fn fill_gaps(&mut self, ledger: &mut ScheduleLedger) {
        for location in self.locations() {
            for day in self.days() {
                self.fill_open_slots(ledger, location, day);
                self.balance_mix(ledger, location, day);
            }
        }
        log_phase(Phase::GapFill, &self.stats.gap_fill);
    }

    fn fill_open_slots(&mut self, ledger: &mut ScheduleLedger, location: &str, day: Weekday) {
        let threshold = self.config.rules.min_checked_in;
        let capacity = self.config.capacity(location);
        let mut slots = gap_slots();
        self.variation.order_slots(&mut slots);

        for time in slots {
            self.stats.gap_fill.considered += 1;
            let present: Vec<String> = ledger
                .classes_at(location, day, time)
                .map(|c| c.format.clone())
                .collect();
            if present.len() >= capacity {
                self.stats.gap_fill.occupied += 1;
                continue;
            }

            let ranked = self.ranked(ledger, location, day, time, threshold, |c| {
                !present.iter().any(|f| format::same_format(f, &c.format))
            });
            if ranked.is_empty() {
                self.stats.gap_fill.no_candidate += 1;
                continue;
            }

            let mut outcome = Outcome::Rejected;
            for choice in &ranked {
                outcome = self.try_commit(ledger, Phase::GapFill, location, day, time, choice);
                if outcome != Outcome::Rejected {
                    break;
                }
            }
            if outcome == Outcome::Rejected {
                self.stats.gap_fill.rejected += 1;
            }
        }
    }

    fn balance_mix(&mut self, ledger: &mut ScheduleLedger, location: &str, day: Weekday) {
        let config = self.config;
        let rules = &config.rules;
        let counts = ledger.format_counts(location, day);

        let barre: usize = counts
            .iter()
            .filter(|(f, _)| format::is_barre_57(f))
            .map(|(_, n)| n)
            .sum();
        if barre < MIN_DAILY_BARRE {
            let added = self.inject(ledger, location, day, MIN_DAILY_BARRE - barre, |c| {
                format::is_barre_57(&c.format)
            });
            tracing::debug!(location, %day, added, "barre balance");
        }

        if !counts.values().any(|&n| n > rules.max_same_format_per_day) {
            return;
        }
        let mut injected = 0;
        for variety in &rules.variety_formats {
            if injected >= MAX_VARIETY_INJECTIONS {
                break;
            }
            let missing = !ledger
                .classes_on(location, day)
                .any(|c| format::same_format(&c.format, variety));
            if missing {
                injected += self.inject(ledger, location, day, 1, |c| {
                    format::same_format(&c.format, variety)
                });
            }
        }
        tracing::debug!(location, %day, injected, "variety balance");
    }

    /// Places the day's best matching pair in up to `needed` free slots.
    fn inject<F>(
        &mut self,
        ledger: &mut ScheduleLedger,
        location: &str,
        day: Weekday,
        needed: usize,
        filter: F,
    ) -> usize
    where
        F: Fn(&Recommendation) -> bool,
    {
        let ctx = self.context(ledger, location, day, None);
        let Some(choice) = self
            .recommender(self.config.rules.min_checked_in_strict)
            .best_on_day(location, day, &self.engine, &ctx, filter)
        else {
            return 0;
        };

        let capacity = self.config.capacity(location);
        let mut slots = gap_slots();
        self.variation.order_slots(&mut slots);

        let mut added = 0;
        for time in slots {
            if added >= needed {
                break;
            }
            if self.config.rules.restricted_hours.is_restricted(day, time) {
                continue;
            }
            let blocked = {
                let at: Vec<&ScheduledClass> = ledger.classes_at(location, day, time).collect();
                at.len() >= capacity || at.iter().any(|c| format::same_format(&c.format, &choice.format))
            };
            if blocked {
                continue;
            }

            self.stats.gap_fill.considered += 1;
            match self.try_commit(ledger, Phase::GapFill, location, day, time, &choice) {
                Outcome::Committed => added += 1,
                Outcome::SundayLimit => break,
                Outcome::Rejected => {}
            }
        }
        added
    }
}

impl SynthesisPipeline {
    /// Fills gaps in `ledger` in place and returns what the pass did.
    pub fn fill_gaps(&self, ledger: &mut ScheduleLedger) -> PhaseStats {
        let mut sweep = self.sweep();
        let before = ledger.len();
        sweep.fill_gaps(ledger);
        tracing::info!(before, after = ledger.len(), "gap fill complete");
        sweep.stats.gap_fill
    }
}

/// Fills gaps in an existing schedule with the default studio configuration.
///
/// `ledger` is left untouched; the returned schedule holds its classes
/// followed by the new ones.
pub fn fill_gaps(
    records: &[PerformanceRecord],
    ledger: &ScheduleLedger,
    roster: &TrainerRoster,
    options: SynthesisOptions,
) -> Vec<ScheduledClass> {
    let pipeline = SynthesisPipeline::new(records, roster, options);
    let mut working = ledger.clone();
    pipeline.fill_gaps(&mut working);
    working.into_classes()
}
