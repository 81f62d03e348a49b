//! Narrow task-store capability used by the planner service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::task::{Task, TaskPlan, TaskStatus};

/// Criteria for [`TaskStore::list`]. Empty filter matches every task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    /// Only tasks due at or before this instant.
    pub due_before: Option<DateTime<Utc>>,
    pub course: Option<String>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        if self.status.is_some_and(|s| s != task.status) {
            return false;
        }
        if self.due_before.is_some_and(|d| task.due_at > d) {
            return false;
        }
        if let Some(course) = &self.course {
            if task.course.as_ref() != Some(course) {
                return false;
            }
        }
        true
    }
}

/// Partial update of a task. `None` fields are left alone.
///
/// The task id can never be changed through a patch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub course: Option<String>,
    pub notes: Option<String>,
    pub due_at: Option<DateTime<Utc>>,
    pub est_mins: Option<i64>,
    pub priority: Option<u8>,
    pub status: Option<TaskStatus>,
    pub tags: Option<Vec<String>>,
    pub plan: Option<TaskPlan>,
}

impl TaskPatch {
    /// Patch that replaces the task's plan.
    pub fn with_plan(plan: TaskPlan) -> Self {
        Self {
            plan: Some(plan),
            ..Self::default()
        }
    }

    /// Apply the patch and stamp `updated_at`.
    pub fn apply(self, task: &mut Task, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(course) = self.course {
            task.course = Some(course);
        }
        if let Some(notes) = self.notes {
            task.notes = Some(notes);
        }
        if let Some(due_at) = self.due_at {
            task.due_at = due_at;
        }
        if let Some(est_mins) = self.est_mins {
            task.est_mins = est_mins;
        }
        if let Some(priority) = self.priority {
            task.priority = priority.clamp(1, 5);
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(tags) = self.tags {
            task.tags = tags;
        }
        if let Some(plan) = self.plan {
            task.plan = Some(plan);
        }
        task.updated_at = now;
    }
}

/// Persistence capability the planner service depends on.
pub trait TaskStore {
    /// Insert a new task.
    fn create(&self, task: &Task) -> Result<()>;

    fn get(&self, id: &str) -> Result<Option<Task>>;

    /// Matching tasks ordered by deadline, earliest first.
    fn list(&self, filter: &TaskFilter) -> Result<Vec<Task>>;

    /// Apply `patch` and return the stored result, or `None` for unknown ids.
    fn update(&self, id: &str, patch: TaskPatch, now: DateTime<Utc>) -> Result<Option<Task>>;

    /// Remove a task and its plan. Returns whether anything was deleted.
    fn delete(&self, id: &str) -> Result<bool>;

    /// Overwrite a full task record (used for slot completion flags).
    fn replace(&self, task: &Task) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, d, h, 0, 0).unwrap()
    }

    #[test]
    fn empty_filter_matches_everything() {
        let task = Task::new("a", utc(5, 12), 30, utc(1, 0));
        assert!(TaskFilter::default().matches(&task));
    }

    #[test]
    fn filter_by_fields() {
        let mut task = Task::new("a", utc(5, 12), 30, utc(1, 0));
        task.course = Some("MATH101".into());
        task.status = TaskStatus::Doing;

        let by_status = TaskFilter {
            status: Some(TaskStatus::Todo),
            ..Default::default()
        };
        assert!(!by_status.matches(&task));

        let by_due = TaskFilter {
            due_before: Some(utc(5, 12)),
            ..Default::default()
        };
        assert!(by_due.matches(&task));
        let too_early = TaskFilter {
            due_before: Some(utc(4, 12)),
            ..Default::default()
        };
        assert!(!too_early.matches(&task));

        let by_course = TaskFilter {
            course: Some("MATH101".into()),
            ..Default::default()
        };
        assert!(by_course.matches(&task));
    }

    #[test]
    fn patch_applies_fields_and_stamps_update_time() {
        let mut task = Task::new("a", utc(5, 12), 30, utc(1, 0));
        let id = task.id.clone();
        TaskPatch {
            title: Some("b".into()),
            est_mins: Some(90),
            priority: Some(9),
            status: Some(TaskStatus::Blocked),
            ..Default::default()
        }
        .apply(&mut task, utc(2, 0));

        assert_eq!(task.id, id);
        assert_eq!(task.title, "b");
        assert_eq!(task.est_mins, 90);
        assert_eq!(task.priority, 5);
        assert_eq!(task.status, TaskStatus::Blocked);
        assert_eq!(task.updated_at, utc(2, 0));
        assert_eq!(task.created_at, utc(1, 0));
    }
}
