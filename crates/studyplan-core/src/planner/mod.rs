//! Study-time scheduler.
//!
//! - [`resolve_policy`] derives session/break/cap parameters from the cram flag
//! - [`WindowPlanner`] cuts a task's effort into focus slots placed inside
//!   daily availability windows before the task's deadline
//! - [`build_weekly_plan`] folds all tasks' slots into a seven-day view
//!
//! Everything here is pure: "now" and the time zone are always passed in, and
//! nothing is read from or written to storage.

pub mod policy;
pub mod weekly;
pub mod window;

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::task::{Slot, SlotKind, Task, TaskPlan};

pub use policy::{resolve_policy, PlanPolicy};
pub use weekly::{build_weekly_plan, DayPlan, WeeklyPlan, WEEK_DAYS};
pub use window::{compute_availability, AvailabilityWindow, DailyWindow, LOOKAHEAD_DAYS};

/// Whether all of a task's effort found room before its deadline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlanOutcome {
    Complete,
    /// Not enough window capacity before the deadline (or the lookahead).
    PartiallyScheduled { shortfall_minutes: i64 },
}

impl PlanOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, PlanOutcome::Complete)
    }
}

/// A task with a freshly attached plan, plus how well it fit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlannedTask {
    pub task: Task,
    pub outcome: PlanOutcome,
}

/// Greedy window planner.
///
/// Holds the local time zone, the daily availability window and the lookahead
/// bound. Planning one task never looks at any other task: daily caps apply to
/// a single task's slots only.
#[derive(Debug, Clone)]
pub struct WindowPlanner<Tz: TimeZone> {
    tz: Tz,
    window: DailyWindow,
    lookahead_days: u32,
}

impl WindowPlanner<Local> {
    /// Planner in the system's local time zone with default windows.
    pub fn local() -> Self {
        Self::new(Local)
    }
}

impl<Tz: TimeZone> WindowPlanner<Tz> {
    pub fn new(tz: Tz) -> Self {
        Self {
            tz,
            window: DailyWindow::default(),
            lookahead_days: LOOKAHEAD_DAYS,
        }
    }

    pub fn with_window(mut self, window: DailyWindow) -> Self {
        self.window = window;
        self
    }

    pub fn with_lookahead_days(mut self, days: u32) -> Self {
        self.lookahead_days = days.max(1);
        self
    }

    pub fn tz(&self) -> &Tz {
        &self.tz
    }

    pub fn window(&self) -> &DailyWindow {
        &self.window
    }

    /// Availability windows from `now` until `deadline`.
    pub fn availability(
        &self,
        now: DateTime<Utc>,
        deadline: DateTime<Utc>,
    ) -> Vec<AvailabilityWindow> {
        compute_availability(&self.tz, &self.window, self.lookahead_days, now, deadline)
    }

    /// Plan a task from scratch.
    ///
    /// Any previous plan is discarded; the whole of `est_mins` (at least one
    /// minute) is packed again starting at `now`. Each slot is at most one
    /// pomodoro long and is followed by the policy's break. A calendar day
    /// never accumulates more than the policy's cap: the last session of a day
    /// is shortened to fit, and packing then moves on to the next day.
    pub fn plan_task(&self, task: &Task, policy: &PlanPolicy, now: DateTime<Utc>) -> PlannedTask {
        let windows = self.availability(now, task.due_at);
        let pomodoro = i64::from(policy.pomodoro_mins.max(1));
        let pause = Duration::minutes(i64::from(policy.break_mins));
        let cap = policy.max_per_day_mins.map(i64::from);

        let requested = task.est_mins.max(1);
        let mut remaining = requested;
        let mut day_minutes: BTreeMap<NaiveDate, i64> = BTreeMap::new();
        let mut slots: Vec<Slot> = Vec::new();

        for window in &windows {
            let mut cur = window.start;
            while cur < window.end && remaining > 0 {
                let used = day_minutes.entry(window.date).or_insert(0);
                let headroom = cap.map_or(i64::MAX, |cap| cap - *used);
                if headroom <= 0 {
                    debug!(task_id = %task.id, date = %window.date, "daily cap reached");
                    break;
                }

                let focus = pomodoro.min(remaining).min(headroom);
                let end = (cur + Duration::minutes(focus)).min(window.end);
                slots.push(Slot {
                    id: format!("{}-{}", task.id, slots.len() + 1),
                    task_id: task.id.clone(),
                    start: cur,
                    end,
                    kind: SlotKind::Focus,
                    done: None,
                });

                cur = end + pause;
                *used += focus;
                remaining -= focus;
            }
            if remaining <= 0 {
                break;
            }
        }

        let scheduled = slots
            .iter()
            .fold(Duration::zero(), |acc, s| acc + (s.end - s.start))
            .num_minutes();
        let shortfall = requested - scheduled;
        let outcome = if shortfall > 0 {
            warn!(
                task_id = %task.id,
                requested,
                scheduled,
                windows = windows.len(),
                "task only partially scheduled before its deadline"
            );
            PlanOutcome::PartiallyScheduled {
                shortfall_minutes: shortfall,
            }
        } else {
            PlanOutcome::Complete
        };
        debug!(task_id = %task.id, slots = slots.len(), scheduled, "planned task");

        let mut planned = task.clone();
        planned.plan = Some(TaskPlan {
            slots,
            policy: *policy,
            last_planned_at: now,
        });
        PlannedTask {
            task: planned,
            outcome,
        }
    }

    /// Fold every task's current plan into the seven days starting today.
    pub fn weekly(&self, tasks: &[Task], now: DateTime<Utc>) -> WeeklyPlan {
        build_weekly_plan(tasks, now, &self.tz)
    }
}
