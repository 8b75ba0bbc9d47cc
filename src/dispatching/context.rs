//! Ranking context for candidate rule evaluation.

use std::collections::HashSet;

/// Scheduling state passed to ranking rules.
///
/// Carries the trainers already working the target location and shift,
/// and the formats a variation wants placed first.
#[derive(Debug, Clone, Default)]
pub struct RankingContext {
    /// Trainers already teaching at this location, day and shift.
    pub shift_trainers: HashSet<String>,
    /// Formats ranked ahead of the rest by `PriorityFormat`.
    pub priority_formats: Vec<String>,
}

impl RankingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the trainers already working the shift.
    pub fn with_shift_trainers<I, S>(mut self, trainers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.shift_trainers = trainers.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_priority_formats(mut self, formats: Vec<String>) -> Self {
        self.priority_formats = formats;
        self
    }
}
