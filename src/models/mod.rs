//! Studio scheduling domain models.
//!
//! Provides the core data types for representing the weekly studio grid,
//! historical performance, trainers, and the classes placed on the grid.
//!
//! # Domain Mappings
//!
//! | u-studio | Generic scheduling |
//! |----------|--------------------|
//! | ScheduledClass | Assignment |
//! | Trainer | Resource (worker) |
//! | Location | Resource (room pool) |
//! | PerformanceRecord | Historical observation |
//! | TimeOfDay / grid cell | Time bucket |

mod class;
pub mod format;
mod record;
mod roster;
mod time;

pub use class::ScheduledClass;
pub use record::{normalize_records, PerformanceRecord, RawPerformanceRecord};
pub use roster::{Trainer, TrainerClass, TrainerPriority, TrainerRoster};
pub use time::{
    cell_count, day_index, grid_slots, is_weekend, occupied_cells, parse_weekday, Shift,
    TimeOfDay, TimeWindow, GRID_END, GRID_START, SLOT_MINUTES, WEEK,
};
