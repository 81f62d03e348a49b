pub mod config;
pub mod digest;
pub mod plan;
pub mod slot;
pub mod task;
pub mod weekly;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use studyplan_core::{Config, Event, EventSink, PlannerService, SystemClock, TaskDb};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Logs every event instead of pushing it anywhere; the CLI has no listeners.
pub struct LogSink;

impl EventSink for LogSink {
    fn publish(&self, event: Event) {
        match serde_json::to_string(&event) {
            Ok(json) => tracing::info!(event = %json, "event"),
            Err(e) => tracing::warn!(error = %e, "unserializable event"),
        }
    }
}

pub fn open_service() -> Result<PlannerService<TaskDb, SystemClock, Local>, Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    Ok(PlannerService::new(
        TaskDb::open()?,
        SystemClock,
        config.planner(Local),
        Box::new(LogSink),
    ))
}

/// Parse a user-supplied instant.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM` (local time) or `YYYY-MM-DD`
/// (end of that local day).
pub fn parse_when(value: &str) -> Result<DateTime<Utc>, String> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
        .or_else(|_| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d").map(|d| {
                d.and_time(NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN))
            })
        })
        .map_err(|_| format!("cannot parse '{value}' as a date/time"))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| format!("'{value}' does not exist in the local time zone"))
}

pub fn parse_tags(tags: &str) -> Vec<String> {
    tags.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_when_accepts_rfc3339() {
        let dt = parse_when("2026-03-02T09:00:00Z").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap());
    }

    #[test]
    fn parse_when_accepts_local_forms() {
        assert!(parse_when("2026-03-02 18:30").is_ok());
        assert!(parse_when("2026-03-02").is_ok());
        assert!(parse_when("next friday").is_err());
    }

    #[test]
    fn parse_tags_drops_empty_entries() {
        assert_eq!(parse_tags("exam, reading,,"), vec!["exam", "reading"]);
    }
}
