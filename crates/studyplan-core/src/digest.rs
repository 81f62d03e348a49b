//! Morning digest of tasks due today.
//!
//! Meant to be polled about once a minute by a background job. It only reads
//! task deadlines and never calls the planner.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};

use crate::events::{DueTask, Event};
use crate::planner::window::local_instant;
use crate::task::Task;

/// Fires at most once per local date, shortly after a configured hour.
#[derive(Debug, Clone)]
pub struct DigestScheduler {
    hour: u32,
    grace_minutes: u32,
    last_sent: Option<NaiveDate>,
}

impl DigestScheduler {
    pub fn new(hour: u32, grace_minutes: u32) -> Self {
        Self {
            hour: hour.min(23),
            grace_minutes: grace_minutes.clamp(1, 60),
            last_sent: None,
        }
    }

    pub fn last_sent(&self) -> Option<NaiveDate> {
        self.last_sent
    }

    /// Emit the digest if `now` is inside today's send window and today's
    /// digest has not gone out yet.
    pub fn poll<Tz: TimeZone>(&mut self, now: DateTime<Utc>, tz: &Tz, tasks: &[Task]) -> Option<Event> {
        let local = now.with_timezone(tz);
        let today = local.date_naive();
        if self.last_sent == Some(today) {
            return None;
        }
        if local.hour() != self.hour || local.minute() >= self.grace_minutes {
            return None;
        }
        self.last_sent = Some(today);
        Some(digest_for(today, tz, tasks))
    }
}

impl Default for DigestScheduler {
    fn default() -> Self {
        Self::new(8, 5)
    }
}

/// Build the digest for `date` regardless of the time of day.
pub fn digest_for<Tz: TimeZone>(date: NaiveDate, tz: &Tz, tasks: &[Task]) -> Event {
    let start = local_instant(tz, date, NaiveTime::MIN);
    let end = date
        .checked_add_days(Days::new(1))
        .and_then(|next| local_instant(tz, next, NaiveTime::MIN));

    let mut due: Vec<DueTask> = tasks
        .iter()
        .filter(|t| match (start, end) {
            (Some(s), Some(e)) => t.due_at >= s && t.due_at < e,
            _ => t.due_at.with_timezone(tz).date_naive() == date,
        })
        .map(|t| DueTask {
            id: t.id.clone(),
            title: t.title.clone(),
            due_at: t.due_at,
        })
        .collect();
    due.sort_by_key(|t| t.due_at);

    Event::DailyDigest { date, due }
}
