//! Iteration-keyed schedule variation.
//!
//! Successive synthesis runs with increasing `iteration` produce different
//! but reproducible schedules. `iteration % 5` picks one of five coarse
//! perturbations of the candidate choice or the sweep order; none of them
//! relaxes a constraint.
//!
//! | iteration % 5 | Strategy | Effect |
//! |---------------|----------|--------|
//! | 0 | Base | top-ranked candidate, natural order |
//! | 1 | AlternateTeacher | runner-up with a different teacher |
//! | 2 | AlternateSlotOrder | slot lists shuffled, seeded by iteration |
//! | 3 | FormatPriority | priority formats ranked first |
//! | 4 | LocationFocus | location sweep rotated |

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::dispatching::{rules, RuleEngine};
use crate::history::Recommendation;
use crate::models::TimeOfDay;

/// One of the five variation buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariationStrategy {
    Base,
    AlternateTeacher,
    AlternateSlotOrder,
    FormatPriority,
    LocationFocus,
}

impl VariationStrategy {
    pub fn for_iteration(iteration: u32) -> Self {
        match iteration % 5 {
            1 => VariationStrategy::AlternateTeacher,
            2 => VariationStrategy::AlternateSlotOrder,
            3 => VariationStrategy::FormatPriority,
            4 => VariationStrategy::LocationFocus,
            _ => VariationStrategy::Base,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            VariationStrategy::Base => "base",
            VariationStrategy::AlternateTeacher => "alternate teacher",
            VariationStrategy::AlternateSlotOrder => "alternate slot order",
            VariationStrategy::FormatPriority => "format priority",
            VariationStrategy::LocationFocus => "location focus",
        }
    }
}

/// Variation state for one synthesis run.
#[derive(Debug, Clone)]
pub struct Variation {
    strategy: VariationStrategy,
    rng: SmallRng,
}

impl Variation {
    /// Creates the variation for an iteration; the shuffle seed is the
    /// iteration itself.
    pub fn new(iteration: u32) -> Self {
        Self {
            strategy: VariationStrategy::for_iteration(iteration),
            rng: SmallRng::seed_from_u64(u64::from(iteration)),
        }
    }

    pub fn strategy(&self) -> VariationStrategy {
        self.strategy
    }

    /// Location sweep order.
    pub fn order_locations<'a>(&self, mut locations: Vec<&'a str>) -> Vec<&'a str> {
        if self.strategy == VariationStrategy::LocationFocus && !locations.is_empty() {
            locations.rotate_left(1);
        }
        locations
    }

    /// Slot visiting order within one (location, day).
    pub fn order_slots(&mut self, slots: &mut [TimeOfDay]) {
        if self.strategy == VariationStrategy::AlternateSlotOrder {
            slots.shuffle(&mut self.rng);
        }
    }

    /// Candidate ranking chain.
    pub fn engine(&self, base: RuleEngine) -> RuleEngine {
        if self.strategy == VariationStrategy::FormatPriority {
            base.with_primary_rule(rules::PriorityFormat)
        } else {
            base
        }
    }

    /// Index of the candidate to try first in a ranked list.
    ///
    /// Alternate-teacher runs skip to the best candidate taught by someone
    /// other than the top candidate's teacher, when there is one.
    pub fn preferred_index(&self, ranked: &[Recommendation]) -> usize {
        if self.strategy != VariationStrategy::AlternateTeacher {
            return 0;
        }
        match ranked.first() {
            Some(top) => ranked
                .iter()
                .position(|c| c.teacher != top.teacher)
                .unwrap_or(0),
            None => 0,
        }
    }

    /// Reorders a ranked list so the preferred candidate comes first; the
    /// rest keep their relative order.
    pub fn reorder(&self, mut ranked: Vec<Recommendation>) -> Vec<Recommendation> {
        let preferred = self.preferred_index(&ranked);
        if preferred > 0 {
            let chosen = ranked.remove(preferred);
            ranked.insert(0, chosen);
        }
        ranked
    }
}
