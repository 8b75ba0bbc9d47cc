//! Slot recommender.
//!
//! Scores every (format, teacher) pair observed at a slot by its mean
//! check-ins and returns the best viable one. The recommender is
//! stateless: it never consults the ledger, so a recommendation may still
//! be rejected by the validator.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use super::index::{HistoricalPerformanceIndex, PairStats};
use crate::dispatching::{RankingContext, RuleEngine};
use crate::models::TimeOfDay;

/// Default minimum mean check-ins for a viable candidate.
pub const DEFAULT_MIN_CHECKED_IN: f64 = 3.0;

/// A scored (format, teacher) candidate for a slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub format: String,
    pub teacher: String,
    /// Mean check-ins, rounded to one decimal.
    pub avg_checked_in: f64,
    pub avg_revenue: f64,
    pub sample_count: usize,
}

impl Recommendation {
    fn from_pair(pair: &PairStats) -> Self {
        let stats = pair.stats();
        Self {
            format: pair.format.clone(),
            teacher: pair.teacher.clone(),
            avg_checked_in: round_tenth(stats.avg_checked_in),
            avg_revenue: stats.avg_revenue,
            sample_count: stats.sample_count,
        }
    }

    /// Estimated participants for a class built from this candidate.
    pub fn estimated_participants(&self) -> u32 {
        self.avg_checked_in.round().max(0.0) as u32
    }
}

/// Rounds to one decimal place.
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Stateless best-pair scorer over a performance index.
#[derive(Debug, Clone, Copy)]
pub struct SlotRecommender<'a> {
    index: &'a HistoricalPerformanceIndex,
    min_checked_in: f64,
}

impl<'a> SlotRecommender<'a> {
    /// Creates a recommender with the default threshold.
    pub fn new(index: &'a HistoricalPerformanceIndex) -> Self {
        Self {
            index,
            min_checked_in: DEFAULT_MIN_CHECKED_IN,
        }
    }

    /// Sets the minimum viable mean check-ins.
    pub fn with_threshold(mut self, min_checked_in: f64) -> Self {
        self.min_checked_in = min_checked_in;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.min_checked_in
    }

    /// Every pair observed at the slot, first-seen order, no threshold.
    pub fn candidates(&self, location: &str, day: Weekday, time: TimeOfDay) -> Vec<Recommendation> {
        self.index
            .pairs_at(location, day, time)
            .iter()
            .map(Recommendation::from_pair)
            .collect()
    }

    /// Best pair at the slot by mean check-ins.
    ///
    /// Ties go to the pair seen first. Returns `None` when the slot has no
    /// history or the best mean is below the threshold.
    pub fn recommend(&self, location: &str, day: Weekday, time: TimeOfDay) -> Option<Recommendation> {
        let mut best: Option<Recommendation> = None;
        for candidate in self.candidates(location, day, time) {
            if best
                .as_ref()
                .is_none_or(|b| candidate.avg_checked_in > b.avg_checked_in)
            {
                best = Some(candidate);
            }
        }
        best.filter(|b| b.avg_checked_in >= self.min_checked_in)
    }

    /// Viable pairs at the slot, ordered by the rule engine.
    pub fn ranked<F>(
        &self,
        location: &str,
        day: Weekday,
        time: TimeOfDay,
        engine: &RuleEngine,
        context: &RankingContext,
        filter: F,
    ) -> Vec<Recommendation>
    where
        F: Fn(&Recommendation) -> bool,
    {
        let pairs = self.index.pairs_at(location, day, time);
        self.rank(pairs, engine, context, filter)
    }

    /// Best viable pair seen anywhere on (location, day).
    pub fn best_on_day<F>(
        &self,
        location: &str,
        day: Weekday,
        engine: &RuleEngine,
        context: &RankingContext,
        filter: F,
    ) -> Option<Recommendation>
    where
        F: Fn(&Recommendation) -> bool,
    {
        let pairs = self.index.day_pairs(location, day);
        self.rank(pairs, engine, context, filter).into_iter().next()
    }

    fn rank<F>(
        &self,
        pairs: &[PairStats],
        engine: &RuleEngine,
        context: &RankingContext,
        filter: F,
    ) -> Vec<Recommendation>
    where
        F: Fn(&Recommendation) -> bool,
    {
        let mut viable: Vec<Recommendation> = pairs
            .iter()
            .map(Recommendation::from_pair)
            .filter(|c| c.avg_checked_in >= self.min_checked_in && filter(c))
            .collect();
        engine.sort(&mut viable, context);
        viable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OptimizationType;
    use crate::models::{PerformanceRecord, TrainerRoster};

    const LOC: &str = "Kwality House, Kemps Corner";

    fn rec(format: &str, teacher: &str, checked_in: f64) -> PerformanceRecord {
        PerformanceRecord::new(format, LOC, Weekday::Tue, TimeOfDay::from_hm(8, 0), teacher, checked_in)
    }

    fn index(records: &[PerformanceRecord]) -> HistoricalPerformanceIndex {
        HistoricalPerformanceIndex::build(records, &TrainerRoster::new())
    }

    #[test]
    fn test_recommend_best_pair() {
        // Scenario: two pairs, the stronger one wins
        let idx = index(&[
            rec("Studio Barre 57", "Anisha Shah", 8.0),
            rec("Studio Barre 57", "Anisha Shah", 9.0),
            rec("Studio FIT", "Richard D", 6.0),
        ]);
        let r = SlotRecommender::new(&idx)
            .recommend(LOC, Weekday::Tue, TimeOfDay::from_hm(8, 0))
            .unwrap();
        assert_eq!(r.format, "Studio Barre 57");
        assert_eq!(r.teacher, "Anisha Shah");
        assert!((r.avg_checked_in - 8.5).abs() < 1e-10);
        assert_eq!(r.sample_count, 2);
        assert_eq!(r.estimated_participants(), 9);
    }

    #[test]
    fn test_recommend_below_threshold() {
        let idx = index(&[rec("Studio FIT", "Richard D", 2.0), rec("Studio FIT", "Richard D", 3.0)]);
        let r = SlotRecommender::new(&idx).recommend(LOC, Weekday::Tue, TimeOfDay::from_hm(8, 0));
        assert!(r.is_none());
        assert!(SlotRecommender::new(&idx)
            .recommend(LOC, Weekday::Wed, TimeOfDay::from_hm(8, 0))
            .is_none());
    }

    #[test]
    fn test_recommend_tie_first_seen() {
        let idx = index(&[rec("Studio FIT", "Richard D", 5.0), rec("Studio Mat 57", "Reshma Sharma", 5.0)]);
        let r = SlotRecommender::new(&idx)
            .recommend(LOC, Weekday::Tue, TimeOfDay::from_hm(8, 0))
            .unwrap();
        assert_eq!(r.teacher, "Richard D");
    }

    #[test]
    fn test_rounding_creates_ties() {
        // 5.04 and 5.01 both round to 5.0
        let idx = index(&[rec("Studio FIT", "Richard D", 5.01), rec("Studio Mat 57", "Reshma Sharma", 5.04)]);
        let r = SlotRecommender::new(&idx)
            .recommend(LOC, Weekday::Tue, TimeOfDay::from_hm(8, 0))
            .unwrap();
        assert_eq!(r.teacher, "Richard D");
        assert!((round_tenth(5.04) - 5.0).abs() < 1e-10);
        assert!((round_tenth(6.66) - 6.7).abs() < 1e-10);
    }

    #[test]
    fn test_ranked_with_filter_and_threshold() {
        let idx = index(&[
            rec("Studio FIT", "Richard D", 9.0),
            rec("Studio Barre 57", "Anisha Shah", 5.0),
            rec("Studio Barre 57 (Express)", "Reshma Sharma", 4.5),
            rec("Studio Barre 57", "Vivaran Dhasmana", 3.5),
        ]);
        let engine = RuleEngine::for_objective(OptimizationType::Attendance, false);
        let ranked = SlotRecommender::new(&idx).with_threshold(4.0).ranked(
            LOC,
            Weekday::Tue,
            TimeOfDay::from_hm(8, 0),
            &engine,
            &RankingContext::default(),
            |c| c.format.contains("Barre 57"),
        );
        let teachers: Vec<&str> = ranked.iter().map(|c| c.teacher.as_str()).collect();
        assert_eq!(teachers, vec!["Anisha Shah", "Reshma Sharma"]);
    }

    #[test]
    fn test_best_on_day() {
        let idx = index(&[
            rec("Studio FIT", "Richard D", 6.0),
            PerformanceRecord::new("Studio Mat 57", LOC, Weekday::Tue, TimeOfDay::from_hm(18, 0), "Reshma Sharma", 7.0),
        ]);
        let engine = RuleEngine::for_objective(OptimizationType::Balanced, false);
        let best = SlotRecommender::new(&idx)
            .with_threshold(4.0)
            .best_on_day(LOC, Weekday::Tue, &engine, &RankingContext::default(), |c| c.format != "Studio FIT")
            .unwrap();
        assert_eq!(best.format, "Studio Mat 57");
        assert_eq!(best.teacher, "Reshma Sharma");
    }
}
