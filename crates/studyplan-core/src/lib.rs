//! # Studyplan Core Library
//!
//! This library provides the core logic for Studyplan, a study-time planner.
//! Given a task with a deadline and an effort estimate, it cuts that effort
//! into pomodoro-sized focus sessions inside daily availability windows and
//! folds every task's sessions into a seven-day calendar.
//!
//! ## Architecture
//!
//! - **Planner**: pure, deterministic bin-packing of effort into windows.
//!   "Now" and the time zone are always explicit inputs
//! - **Storage**: SQLite task store and TOML configuration
//! - **Events**: plan updates and digests handed to listeners grouped by session
//!
//! ## Key Components
//!
//! - [`WindowPlanner`]: availability windows and slot packing
//! - [`build_weekly_plan`]: seven-day calendar view
//! - [`TaskDb`]: SQLite implementation of [`TaskStore`]
//! - [`PlannerService`]: store + clock + planner + event sink

pub mod clock;
pub mod digest;
pub mod error;
pub mod events;
pub mod planner;
pub mod service;
pub mod storage;
pub mod task;

pub use clock::{Clock, FixedClock, SystemClock};
pub use digest::DigestScheduler;
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::{Event, EventSink, NullSink, SubscriptionRegistry};
pub use planner::{
    build_weekly_plan, compute_availability, resolve_policy, AvailabilityWindow, DailyWindow,
    DayPlan, PlanOutcome, PlanPolicy, PlannedTask, WeeklyPlan, WindowPlanner,
};
pub use service::PlannerService;
pub use storage::{Config, TaskDb, TaskFilter, TaskPatch, TaskStore};
pub use task::{Slot, SlotKind, Task, TaskPlan, TaskStatus};
