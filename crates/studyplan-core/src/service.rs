//! Planner service: glue between the task store, the clock, the planner and
//! the event sink.

use chrono::TimeZone;
use tracing::info;

use crate::clock::Clock;
use crate::error::{CoreError, Result};
use crate::events::{Event, EventSink};
use crate::planner::{resolve_policy, PlannedTask, WeeklyPlan, WindowPlanner};
use crate::storage::{TaskFilter, TaskPatch, TaskStore};
use crate::task::Task;

pub struct PlannerService<S, C, Tz: TimeZone> {
    store: S,
    clock: C,
    planner: WindowPlanner<Tz>,
    sink: Box<dyn EventSink>,
}

impl<S: TaskStore, C: Clock, Tz: TimeZone> PlannerService<S, C, Tz> {
    pub fn new(store: S, clock: C, planner: WindowPlanner<Tz>, sink: Box<dyn EventSink>) -> Self {
        Self {
            store,
            clock,
            planner,
            sink,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Replan a stored task, persist the plan and announce the new slots.
    ///
    /// # Errors
    /// Returns `NotFound` for unknown ids, or a storage error.
    pub fn plan(&self, id: &str, cram: bool) -> Result<PlannedTask> {
        let task = self
            .store
            .get(id)?
            .ok_or_else(|| CoreError::task_not_found(id))?;

        let now = self.clock.now();
        let policy = resolve_policy(cram);
        let mut planned = self.planner.plan_task(&task, &policy, now);
        let plan = planned
            .task
            .plan
            .clone()
            .ok_or_else(|| CoreError::Custom(format!("planner produced no plan for {id}")))?;

        planned.task = self
            .store
            .update(id, TaskPatch::with_plan(plan), now)?
            .ok_or_else(|| CoreError::task_not_found(id))?;

        info!(
            task_id = id,
            slots = planned.task.slots().len(),
            cram,
            "task replanned"
        );
        self.sink.publish(Event::PlanUpdated {
            task_id: id.to_string(),
            slots: planned.task.slots().to_vec(),
        });
        Ok(planned)
    }

    /// Seven-day view over every stored task.
    pub fn weekly(&self) -> Result<WeeklyPlan> {
        let tasks = self.store.list(&TaskFilter::default())?;
        Ok(self.planner.weekly(&tasks, self.clock.now()))
    }

    /// Flag one slot of a task's plan as done or not done.
    ///
    /// # Errors
    /// Returns `NotFound` if either the task or the slot does not exist.
    pub fn mark_slot(&self, task_id: &str, slot_id: &str, done: bool) -> Result<Task> {
        let mut task = self
            .store
            .get(task_id)?
            .ok_or_else(|| CoreError::task_not_found(task_id))?;
        if !task.mark_slot_done(slot_id, done) {
            return Err(CoreError::NotFound {
                entity: "slot",
                id: slot_id.to_string(),
            });
        }
        task.updated_at = self.clock.now();
        self.store.replace(&task)?;
        Ok(task)
    }
}
