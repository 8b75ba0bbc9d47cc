//! Rule engine for multi-criteria candidate ranking.
//!
//! Rules apply in sequence; a later rule is consulted only when every
//! earlier rule ties. Candidates tied on all rules keep their first-seen
//! order.

use std::sync::Arc;

use super::{rules, CandidateRule, RankingContext, RuleScore};
use crate::config::OptimizationType;
use crate::history::Recommendation;

/// A composable rule chain for candidate ranking.
///
/// # Example
/// ```
/// use u_studio::dispatching::RuleEngine;
/// use u_studio::dispatching::rules;
///
/// let engine = RuleEngine::new()
///     .with_rule(rules::Revenue)
///     .with_tie_breaker(rules::Attendance);
/// assert_eq!(engine.len(), 2);
/// ```
#[derive(Clone)]
pub struct RuleEngine {
    rules: Vec<Arc<dyn CandidateRule>>,
    epsilon: f64,
}

impl RuleEngine {
    /// Creates an empty rule engine.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            epsilon: 1e-9,
        }
    }

    /// Chain for an optimization objective.
    ///
    /// `shift_continuity` appends a tie-breaker preferring trainers
    /// already working the shift.
    ///
    /// Chains rank more finely than [`SlotRecommender::recommend`], which
    /// keeps the first-seen pair on an attendance tie. A `Balanced` chain
    /// breaks attendance ties by sample size, then shift continuity when
    /// enabled, and falls back to first-seen order only after both tie.
    ///
    /// [`SlotRecommender::recommend`]: crate::history::SlotRecommender::recommend
    pub fn for_objective(objective: OptimizationType, shift_continuity: bool) -> Self {
        let engine = match objective {
            OptimizationType::Attendance => Self::new().with_rule(rules::Attendance),
            OptimizationType::Revenue => Self::new()
                .with_rule(rules::Revenue)
                .with_tie_breaker(rules::Attendance),
            OptimizationType::Balanced => Self::new()
                .with_rule(rules::Attendance)
                .with_tie_breaker(rules::SampleSize),
        };
        if shift_continuity {
            engine.with_tie_breaker(rules::ShiftContinuity)
        } else {
            engine
        }
    }

    /// Appends a rule.
    pub fn with_rule<R: CandidateRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Appends a tie-breaking rule (consulted only on ties).
    pub fn with_tie_breaker<R: CandidateRule + 'static>(self, rule: R) -> Self {
        self.with_rule(rule)
    }

    /// Puts a rule ahead of the existing chain.
    pub fn with_primary_rule<R: CandidateRule + 'static>(mut self, rule: R) -> Self {
        self.rules.insert(0, Arc::new(rule));
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Sorts candidates (preferred first).
    ///
    /// Returns indices into the slice. The sort is stable, so full ties
    /// keep their input order.
    pub fn sort_indices(&self, candidates: &[Recommendation], context: &RankingContext) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..candidates.len()).collect();
        indices.sort_by(|&a, &b| self.compare(&candidates[a], &candidates[b], context));
        indices
    }

    /// Sorts candidates in place (preferred first).
    pub fn sort(&self, candidates: &mut [Recommendation], context: &RankingContext) {
        candidates.sort_by(|a, b| self.compare(a, b, context));
    }

    /// Returns the index of the preferred candidate.
    pub fn select_best(&self, candidates: &[Recommendation], context: &RankingContext) -> Option<usize> {
        self.sort_indices(candidates, context).first().copied()
    }

    /// Scores from each rule for one candidate.
    pub fn evaluate(&self, candidate: &Recommendation, context: &RankingContext) -> Vec<RuleScore> {
        self.rules
            .iter()
            .map(|rule| rule.evaluate(candidate, context))
            .collect()
    }

    fn compare(
        &self,
        a: &Recommendation,
        b: &Recommendation,
        context: &RankingContext,
    ) -> std::cmp::Ordering {
        for rule in &self.rules {
            let score_a = rule.evaluate(a, context);
            let score_b = rule.evaluate(b, context);

            if (score_a - score_b).abs() > self.epsilon {
                return score_a
                    .partial_cmp(&score_b)
                    .unwrap_or(std::cmp::Ordering::Equal);
            }
        }
        std::cmp::Ordering::Equal
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEngine")
            .field(
                "rules",
                &self.rules.iter().map(|r| r.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
