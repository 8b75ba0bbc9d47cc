//! Built-in ranking rules.
//!
//! # Categories
//!
//! - **Performance**: ATTENDANCE, REVENUE, SAMPLE_SIZE
//! - **Staffing**: SHIFT_CONTINUITY
//! - **Programming**: PRIORITY_FORMAT
//!
//! # Score Convention
//! All rules return lower scores for preferred candidates.

use super::{CandidateRule, RankingContext, RuleScore};
use crate::history::Recommendation;

// ======================== Performance rules ========================

/// Highest mean check-ins first.
#[derive(Debug, Clone, Copy)]
pub struct Attendance;

impl CandidateRule for Attendance {
    fn name(&self) -> &'static str {
        "ATTENDANCE"
    }

    fn evaluate(&self, candidate: &Recommendation, _context: &RankingContext) -> RuleScore {
        -candidate.avg_checked_in
    }

    fn description(&self) -> &'static str {
        "Highest Average Attendance"
    }
}

/// Highest mean revenue first.
#[derive(Debug, Clone, Copy)]
pub struct Revenue;

impl CandidateRule for Revenue {
    fn name(&self) -> &'static str {
        "REVENUE"
    }

    fn evaluate(&self, candidate: &Recommendation, _context: &RankingContext) -> RuleScore {
        -candidate.avg_revenue
    }

    fn description(&self) -> &'static str {
        "Highest Average Revenue"
    }
}

/// Most historical samples first.
///
/// A mean over many sessions is a steadier predictor than one lucky week.
#[derive(Debug, Clone, Copy)]
pub struct SampleSize;

impl CandidateRule for SampleSize {
    fn name(&self) -> &'static str {
        "SAMPLE_SIZE"
    }

    fn evaluate(&self, candidate: &Recommendation, _context: &RankingContext) -> RuleScore {
        -(candidate.sample_count as f64)
    }

    fn description(&self) -> &'static str {
        "Largest Sample Size"
    }
}

// ======================== Staffing rules ========================

/// Trainers already working this location and shift first.
///
/// Keeps the number of distinct trainers per shift low.
#[derive(Debug, Clone, Copy)]
pub struct ShiftContinuity;

impl CandidateRule for ShiftContinuity {
    fn name(&self) -> &'static str {
        "SHIFT_CONTINUITY"
    }

    fn evaluate(&self, candidate: &Recommendation, context: &RankingContext) -> RuleScore {
        if context.shift_trainers.contains(&candidate.teacher) {
            0.0
        } else {
            1.0
        }
    }

    fn description(&self) -> &'static str {
        "Prefer Trainers Already On Shift"
    }
}

// ======================== Programming rules ========================

/// Priority formats first, in list order.
#[derive(Debug, Clone, Copy)]
pub struct PriorityFormat;

impl CandidateRule for PriorityFormat {
    fn name(&self) -> &'static str {
        "PRIORITY_FORMAT"
    }

    fn evaluate(&self, candidate: &Recommendation, context: &RankingContext) -> RuleScore {
        context
            .priority_formats
            .iter()
            .position(|f| *f == candidate.format)
            .unwrap_or(context.priority_formats.len()) as f64
    }

    fn description(&self) -> &'static str {
        "Priority Formats First"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(format: &str, teacher: &str) -> Recommendation {
        Recommendation {
            format: format.into(),
            teacher: teacher.into(),
            avg_checked_in: 7.2,
            avg_revenue: 3100.0,
            sample_count: 5,
        }
    }

    #[test]
    fn test_performance_scores() {
        let c = candidate("Studio FIT", "Richard D");
        let ctx = RankingContext::default();
        assert!((Attendance.evaluate(&c, &ctx) + 7.2).abs() < 1e-10);
        assert!((Revenue.evaluate(&c, &ctx) + 3100.0).abs() < 1e-10);
        assert!((SampleSize.evaluate(&c, &ctx) + 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_shift_continuity_score() {
        let ctx = RankingContext::new().with_shift_trainers(["Richard D"]);
        assert_eq!(ShiftContinuity.evaluate(&candidate("Studio FIT", "Richard D"), &ctx), 0.0);
        assert_eq!(ShiftContinuity.evaluate(&candidate("Studio FIT", "Mrigakshi J"), &ctx), 1.0);
    }

    #[test]
    fn test_priority_format_score() {
        let ctx = RankingContext::new()
            .with_priority_formats(vec!["Studio Barre 57".into(), "Studio FIT".into()]);
        assert_eq!(PriorityFormat.evaluate(&candidate("Studio Barre 57", "x"), &ctx), 0.0);
        assert_eq!(PriorityFormat.evaluate(&candidate("Studio FIT", "x"), &ctx), 1.0);
        assert_eq!(PriorityFormat.evaluate(&candidate("Studio Recovery", "x"), &ctx), 2.0);
    }

    #[test]
    fn test_rule_names() {
        assert_eq!(Attendance.name(), "ATTENDANCE");
        assert_eq!(ShiftContinuity.description(), "Prefer Trainers Already On Shift");
    }
}
