//! Study task model.
//!
//! A [`Task`] owns its [`TaskPlan`], and the plan owns its [`Slot`]s. Slots are
//! never persisted or addressed on their own: replanning a task replaces the
//! whole slot list, and deleting a task drops its slots with it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::planner::PlanPolicy;

/// Workflow status of a task.
///
/// Purely informational for the planner: planning never reads or changes it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Todo,
    Doing,
    Done,
    Blocked,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::Doing => "doing",
            TaskStatus::Done => "done",
            TaskStatus::Blocked => "blocked",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "todo" => Ok(TaskStatus::Todo),
            "doing" => Ok(TaskStatus::Doing),
            "done" => Ok(TaskStatus::Done),
            "blocked" => Ok(TaskStatus::Blocked),
            other => Err(format!("unknown task status: {other}")),
        }
    }
}

/// Kind of a scheduled session. The planner only ever emits `Focus`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SlotKind {
    #[default]
    Focus,
    Review,
    Buffer,
}

/// A single scheduled work session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Slot {
    /// `{task_id}-{sequence}`, 1-based in emission order.
    pub id: String,
    /// Owning task (weak reference).
    pub task_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub kind: SlotKind,
    /// Set by the user after the session, never by the planner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,
}

impl Slot {
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Half-open overlap test against `[start, end)`.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start < end && self.end > start
    }
}

/// The result of the most recent planning call for a task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskPlan {
    pub slots: Vec<Slot>,
    pub policy: PlanPolicy,
    pub last_planned_at: DateTime<Utc>,
}

impl TaskPlan {
    /// Total minutes actually covered by the plan's slots.
    pub fn scheduled_minutes(&self) -> i64 {
        self.slots.iter().map(Slot::duration_minutes).sum()
    }
}

/// A study task with a deadline and an effort estimate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub due_at: DateTime<Utc>,
    /// Remaining effort in minutes.
    pub est_mins: i64,
    /// 1 (highest) to 5 (lowest).
    pub priority: u8,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<TaskPlan>,
}

impl Task {
    /// Create a new unplanned task with a fresh UUID.
    pub fn new(
        title: impl Into<String>,
        due_at: DateTime<Utc>,
        est_mins: i64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            course: None,
            notes: None,
            due_at,
            est_mins,
            priority: 3,
            status: TaskStatus::Todo,
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
            plan: None,
        }
    }

    /// Slots of the current plan, empty when the task was never planned.
    pub fn slots(&self) -> &[Slot] {
        self.plan.as_ref().map(|p| p.slots.as_slice()).unwrap_or(&[])
    }

    /// Flag a slot of the current plan as done or not done.
    ///
    /// Returns `false` when the task has no plan or no slot with that id.
    pub fn mark_slot_done(&mut self, slot_id: &str, done: bool) -> bool {
        let Some(plan) = self.plan.as_mut() else {
            return false;
        };
        match plan.slots.iter_mut().find(|s| s.id == slot_id) {
            Some(slot) => {
                slot.done = Some(done);
                true
            }
            None => false,
        }
    }

    /// Minutes of the current plan already marked done.
    pub fn completed_minutes(&self) -> i64 {
        self.slots()
            .iter()
            .filter(|s| s.done == Some(true))
            .map(Slot::duration_minutes)
            .sum()
    }
}
