//! Seven-day calendar view over all tasks' plans.

use chrono::{DateTime, Days, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::task::{Slot, Task};

/// Number of days in the calendar horizon.
pub const WEEK_DAYS: usize = 7;

/// Slots scheduled on one local calendar day, sorted by start.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DayPlan {
    /// Serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    pub slots: Vec<Slot>,
}

impl DayPlan {
    pub fn focus_minutes(&self) -> i64 {
        self.slots.iter().map(Slot::duration_minutes).sum()
    }
}

/// Seven contiguous days starting with today.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeeklyPlan {
    pub days: Vec<DayPlan>,
}

impl WeeklyPlan {
    pub fn slot_count(&self) -> usize {
        self.days.iter().map(|d| d.slots.len()).sum()
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DayPlan> {
        self.days.iter().find(|d| d.date == date)
    }
}

/// Fold every task's plan into a per-day view of the next seven days.
///
/// A slot lands in the bucket of the local date of its start; slots starting
/// before today or after the sixth day are left out. Tasks without a plan
/// contribute nothing.
pub fn build_weekly_plan<Tz: TimeZone>(tasks: &[Task], now: DateTime<Utc>, tz: &Tz) -> WeeklyPlan {
    let today = now.with_timezone(tz).date_naive();
    let mut days: Vec<DayPlan> = (0..WEEK_DAYS)
        .filter_map(|i| today.checked_add_days(Days::new(i as u64)))
        .map(|date| DayPlan {
            date,
            slots: Vec::new(),
        })
        .collect();

    for slot in tasks.iter().flat_map(Task::slots) {
        let date = slot.start.with_timezone(tz).date_naive();
        let index = (date - today).num_days();
        if (0..days.len() as i64).contains(&index) {
            days[index as usize].slots.push(slot.clone());
        }
    }

    for day in &mut days {
        day.slots.sort_by_key(|s| s.start);
    }
    WeeklyPlan { days }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::PlanPolicy;
    use crate::task::{SlotKind, TaskPlan};
    use chrono::FixedOffset;

    fn utc(d: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, d, h, m, 0).unwrap()
    }

    fn task_with_slots(id: &str, starts: &[DateTime<Utc>]) -> Task {
        let mut task = Task::new(id, utc(20, 0, 0), 60, utc(1, 0, 0));
        task.id = id.to_string();
        task.plan = Some(TaskPlan {
            slots: starts
                .iter()
                .enumerate()
                .map(|(i, start)| Slot {
                    id: format!("{id}-{}", i + 1),
                    task_id: id.to_string(),
                    start: *start,
                    end: *start + chrono::Duration::minutes(25),
                    kind: SlotKind::Focus,
                    done: None,
                })
                .collect(),
            policy: PlanPolicy::default(),
            last_planned_at: utc(1, 0, 0),
        });
        task
    }

    #[test]
    fn seven_contiguous_days_from_today() {
        let plan = build_weekly_plan(&[], utc(2, 15, 0), &Utc);
        assert_eq!(plan.days.len(), 7);
        assert_eq!(plan.days[0].date, NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
        assert_eq!(plan.days[6].date, NaiveDate::from_ymd_opt(2026, 3, 8).unwrap());
        assert_eq!(plan.slot_count(), 0);
    }

    #[test]
    fn slots_are_bucketed_and_sorted_across_tasks() {
        let a = task_with_slots("a", &[utc(2, 14, 0), utc(3, 9, 0)]);
        let b = task_with_slots("b", &[utc(2, 10, 0), utc(2, 18, 0)]);
        let plan = build_weekly_plan(&[a, b], utc(2, 8, 0), &Utc);

        let ids: Vec<_> = plan.days[0].slots.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["b-1", "a-1", "b-2"]);
        assert_eq!(plan.days[1].slots.len(), 1);
        assert_eq!(plan.days[0].focus_minutes(), 75);
    }

    #[test]
    fn slots_outside_horizon_are_dropped() {
        let task = task_with_slots("a", &[utc(1, 21, 0), utc(2, 0, 0), utc(8, 23, 59), utc(9, 0, 0)]);
        let plan = build_weekly_plan(&[task], utc(2, 12, 0), &Utc);
        assert_eq!(plan.slot_count(), 2);
        assert_eq!(plan.days[0].slots[0].id, "a-2");
        assert_eq!(plan.days[6].slots[0].id, "a-3");
    }

    #[test]
    fn unplanned_tasks_contribute_nothing() {
        let task = Task::new("x", utc(5, 0, 0), 30, utc(1, 0, 0));
        let plan = build_weekly_plan(&[task], utc(2, 12, 0), &Utc);
        assert_eq!(plan.slot_count(), 0);
    }

    #[test]
    fn buckets_use_local_dates() {
        // 23:30 UTC on March 2 is 08:30 on March 3 at UTC+9.
        let tz = FixedOffset::east_opt(9 * 3600).unwrap();
        let task = task_with_slots("a", &[utc(2, 23, 30)]);
        let plan = build_weekly_plan(&[task], utc(2, 3, 0), &tz);
        assert_eq!(plan.days[0].date, NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
        assert!(plan.days[0].slots.is_empty());
        assert_eq!(plan.days[1].slots.len(), 1);
    }

    #[test]
    fn date_serializes_as_iso_day() {
        let plan = build_weekly_plan(&[], utc(2, 12, 0), &Utc);
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["days"][0]["date"], "2026-03-02");
    }
}
