#![forbid(unsafe_code)]

//! Core domain model and planning logic for the Fitplan system.
//!
//! This crate provides:
//! - Domain types (exercises, schedule slots, daily and weekly plans)
//! - Catalog loading
//! - Daily, weekly and multi-week planners
//! - Goal summaries and plan export

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod daily;
pub mod weekly;
pub mod scheduler;
pub mod summary;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{default_catalog, load_catalog, parse_catalog, Catalog};
pub use config::Config;
pub use daily::{select_daily, DailyPlanner, DailyStrategy};
pub use weekly::{plan_week, WeekOutcome, WeeklyPlanner};
pub use scheduler::{schedule, ScheduleOutcome, Scheduler};
pub use summary::{GoalSummary, PlanReport};
pub use export::{write_plan_csv, write_plan_json};
