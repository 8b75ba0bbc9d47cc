//! Historical performance: indexing, slot recommendation, and insights.
//!
//! Records load once into a [`HistoricalPerformanceIndex`]; everything
//! downstream reads it and nothing writes it.

mod index;
mod insights;
mod recommend;

pub use index::{HistoricalPerformanceIndex, PairStats, SlotKey, SlotStats};
pub use insights::{
    teacher_specialties, top_performing_classes, TopClass, SPECIALTY_LIMIT,
    SPECIALTY_MIN_CHECKED_IN,
};
pub use recommend::{round_tenth, Recommendation, SlotRecommender, DEFAULT_MIN_CHECKED_IN};
