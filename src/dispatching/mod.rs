//! Candidate ranking rules and rule engine.
//!
//! When several (format, teacher) pairs have history at a slot, the
//! pipeline orders them with a composable rule chain: attendance first,
//! revenue first, or attendance backed by sample size, optionally with
//! shift continuity and format priority as tie-breakers.
//!
//! # Usage
//!
//! ```
//! use u_studio::dispatching::{RankingContext, RuleEngine};
//! use u_studio::dispatching::rules;
//!
//! let engine = RuleEngine::new()
//!     .with_rule(rules::Attendance)
//!     .with_tie_breaker(rules::Revenue);
//!
//! let context = RankingContext::default();
//! // let order = engine.sort_indices(&candidates, &context);
//! ```

mod context;
mod engine;
pub mod rules;

pub use context::RankingContext;
pub use engine::RuleEngine;

use crate::history::Recommendation;
use std::fmt::Debug;

/// Score returned by a ranking rule.
///
/// Lower scores = preferred (ranked first).
pub type RuleScore = f64;

/// A rule that scores a slot candidate.
///
/// # Score Convention
/// **Lower score = preferred.** Rules maximizing a quantity return its
/// negation.
pub trait CandidateRule: Send + Sync + Debug {
    /// Rule name (e.g., "ATTENDANCE").
    fn name(&self) -> &'static str;

    /// Scores a candidate in the given ranking context.
    fn evaluate(&self, candidate: &Recommendation, context: &RankingContext) -> RuleScore;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}
