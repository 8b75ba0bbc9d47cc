//! Greedy multi-phase schedule synthesis and KPI evaluation.
//!
//! # Phases
//!
//! | Phase | Slots | Candidates | Threshold |
//! |-------|-------|------------|-----------|
//! | Historical | slots with history | any format | 3.0 |
//! | Quota | 07:00–11:30, 17:30–20:00 (30 min) | Barre 57 | 4.0 |
//! | Express | commuter slots | express formats | 4.0 |
//! | Gap fill | 07:00–11:45, 17:00–20:00 (15 min) | formats not yet in the slot | 3.0 / 4.0 |
//!
//! Synthesis runs the first three; gap filling is a separate pass over an
//! existing schedule. Every commit goes through the same
//! [`ConstraintValidator`](crate::validation::ConstraintValidator) used for
//! manual edits.
//!
//! # KPI
//!
//! [`ScheduleKpi`] summarizes a schedule: grid fill rate, teacher hours,
//! top-performer share and mean participants.

mod gap_fill;
mod kpi;
mod pipeline;
mod variation;

pub use gap_fill::{fill_gaps, gap_slots, MAX_VARIETY_INJECTIONS, MIN_DAILY_BARRE};
pub use kpi::{FillStats, Phase, PhaseStats, ScheduleKpi};
pub use pipeline::{quota_slots, synthesize, SynthesisPipeline, SynthesisResult, EXPRESS_SLOTS};
pub use variation::{Variation, VariationStrategy};
