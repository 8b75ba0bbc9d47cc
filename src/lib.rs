//! Weekly class-schedule synthesis for multi-location fitness studios.
//!
//! Builds a week of classes (format, trainer, location, day, start time)
//! from historical attendance, subject to staffing and studio rules, and
//! validates manual edits against the same rules.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `TimeOfDay`, `ScheduledClass`,
//!   `PerformanceRecord`, `TrainerRoster`, format naming rules
//! - **`config`**: Studio rules, location rules, synthesis options
//! - **`history`**: Historical index, slot recommendation, insights
//! - **`dispatching`**: Candidate ranking rules and rule engine
//! - **`ledger`**: The working schedule with per-trainer load tracking and undo
//! - **`validation`**: Constraint checks, edit verdicts, schedule audit
//! - **`scheduler`**: Multi-phase synthesis, gap filling, variation, KPIs
//!
//! # Example
//!
//! ```
//! use chrono::Weekday;
//! use u_studio::{synthesize, PerformanceRecord, SynthesisOptions, TimeOfDay, TrainerRoster};
//!
//! let records = vec![
//!     PerformanceRecord::new("Studio FIT", "Kenkere House", Weekday::Tue, TimeOfDay::from_hm(18, 0), "Richard D'Costa", 9.0),
//! ];
//! let schedule = synthesize(&records, &TrainerRoster::new(), SynthesisOptions::default());
//! assert_eq!(schedule[0].teacher, "Richard D'Costa");
//! ```

pub mod config;
pub mod dispatching;
pub mod error;
pub mod history;
pub mod ledger;
pub mod models;
pub mod scheduler;
pub mod validation;

pub use config::{LocationRules, OptimizationType, StudioConfig, StudioRules, SynthesisOptions};
pub use error::{Result, ScheduleError};
pub use history::{HistoricalPerformanceIndex, Recommendation, SlotRecommender};
pub use ledger::ScheduleLedger;
pub use models::{
    normalize_records, PerformanceRecord, ScheduledClass, TimeOfDay, Trainer, TrainerClass,
    TrainerRoster,
};
pub use scheduler::{fill_gaps, synthesize, FillStats, ScheduleKpi, SynthesisPipeline, SynthesisResult};
pub use validation::{
    audit_schedule, validate_edit, ConstraintValidator, ConstraintViolation, EditStatus,
    EditVerdict, ViolationKind,
};
