//! Daily availability windows between "now" and a deadline.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Upper bound on how many calendar days are scanned for windows.
pub const LOOKAHEAD_DAYS: u32 = 14;

/// Local time-of-day range during which study sessions may be placed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl DailyWindow {
    /// # Errors
    /// Returns an error unless `start < end`.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, ValidationError> {
        if start >= end {
            return Err(ValidationError::InvalidValue {
                field: "daily_window".into(),
                message: format!("start ({start}) must be before end ({end})"),
            });
        }
        Ok(Self { start, end })
    }

    /// Parse a window from two `HH:MM` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self, ValidationError> {
        Self::new(parse_hhmm(start)?, parse_hhmm(end)?)
    }

    pub fn minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

impl Default for DailyWindow {
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN),
            end: NaiveTime::from_hms_opt(22, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

fn parse_hhmm(value: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|e| ValidationError::InvalidValue {
        field: "time".into(),
        message: format!("'{value}' is not HH:MM ({e})"),
    })
}

/// A half-open interval `[start, end)` on one local calendar day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AvailabilityWindow {
    /// Local calendar date this window belongs to.
    pub date: NaiveDate,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl AvailabilityWindow {
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Whether `[start, end)` lies entirely inside this window.
    pub fn contains(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start >= self.start && end <= self.end
    }
}

/// Resolve a local wall-clock time to an instant.
///
/// Ambiguous times (DST fall-back) resolve to the earlier instant; times that
/// do not exist (DST spring-forward) yield `None`.
pub(crate) fn local_instant<Tz: TimeZone>(
    tz: &Tz,
    date: NaiveDate,
    time: NaiveTime,
) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Compute the availability windows from `now` up to `deadline`.
///
/// Starting with the local day containing `now`, each day's `window` is clipped
/// to `[now, deadline)` and kept when non-empty. Scanning stops once a day
/// starts after the deadline, or after `lookahead_days` days.
pub fn compute_availability<Tz: TimeZone>(
    tz: &Tz,
    window: &DailyWindow,
    lookahead_days: u32,
    now: DateTime<Utc>,
    deadline: DateTime<Utc>,
) -> Vec<AvailabilityWindow> {
    let mut out = Vec::new();
    if deadline <= now {
        return out;
    }

    let today = now.with_timezone(tz).date_naive();
    for offset in 0..lookahead_days {
        let Some(date) = today.checked_add_days(Days::new(u64::from(offset))) else {
            break;
        };
        let open = local_instant(tz, date, window.start);
        let day_start = local_instant(tz, date, NaiveTime::MIN).or(open);
        if matches!(day_start, Some(s) if s > deadline) {
            break;
        }

        let (Some(open), Some(close)) = (open, local_instant(tz, date, window.end)) else {
            continue;
        };
        let start = open.max(now);
        let end = close.min(deadline);
        if end > start {
            out.push(AvailabilityWindow { date, start, end });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset};

    fn utc(d: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, d, h, m, 0).unwrap()
    }

    fn windows(now: DateTime<Utc>, deadline: DateTime<Utc>) -> Vec<AvailabilityWindow> {
        compute_availability(&Utc, &DailyWindow::default(), LOOKAHEAD_DAYS, now, deadline)
    }

    #[test]
    fn same_day_deadline_clips_both_ends() {
        let w = windows(utc(2, 9, 0), utc(2, 10, 30));
        assert_eq!(w.len(), 1);
        assert_eq!(w[0].start, utc(2, 9, 0));
        assert_eq!(w[0].end, utc(2, 10, 30));
        assert_eq!(w[0].date, NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
    }

    #[test]
    fn early_morning_now_starts_at_window_open() {
        let w = windows(utc(2, 6, 15), utc(2, 12, 0));
        assert_eq!(w[0].start, utc(2, 8, 0));
    }

    #[test]
    fn multi_day_span_yields_one_window_per_day() {
        let w = windows(utc(2, 20, 0), utc(4, 12, 0));
        assert_eq!(w.len(), 3);
        assert_eq!((w[0].start, w[0].end), (utc(2, 20, 0), utc(2, 22, 0)));
        assert_eq!((w[1].start, w[1].end), (utc(3, 8, 0), utc(3, 22, 0)));
        assert_eq!((w[2].start, w[2].end), (utc(4, 8, 0), utc(4, 12, 0)));
    }

    #[test]
    fn now_after_close_skips_today() {
        let w = windows(utc(2, 23, 0), utc(3, 9, 0));
        assert_eq!(w.len(), 1);
        assert_eq!(w[0].start, utc(3, 8, 0));
    }

    #[test]
    fn deadline_before_open_yields_nothing_that_day() {
        let w = windows(utc(2, 9, 0), utc(3, 7, 0));
        assert_eq!(w.len(), 1);
        assert_eq!(w[0].end, utc(2, 22, 0));
    }

    #[test]
    fn past_deadline_yields_no_windows() {
        assert!(windows(utc(2, 12, 0), utc(2, 11, 0)).is_empty());
        assert!(windows(utc(2, 12, 0), utc(2, 12, 0)).is_empty());
    }

    #[test]
    fn lookahead_caps_far_deadlines() {
        let now = utc(2, 9, 0);
        let w = windows(now, now + Duration::days(60));
        assert_eq!(w.len(), LOOKAHEAD_DAYS as usize);
        assert!(w.windows(2).all(|pair| pair[0].end <= pair[1].start));
    }

    #[test]
    fn windows_follow_local_time() {
        // UTC+9: local 08:00 is 23:00 UTC on the previous day.
        let tz = FixedOffset::east_opt(9 * 3600).unwrap();
        let now = utc(2, 0, 0); // 09:00 local on March 2
        let w = compute_availability(&tz, &DailyWindow::default(), 14, now, utc(2, 5, 0));
        assert_eq!(w.len(), 1);
        assert_eq!(w[0].start, now);
        assert_eq!(w[0].end, utc(2, 5, 0));
        assert_eq!(w[0].date, NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
    }

    #[test]
    fn daily_window_parse() {
        let w = DailyWindow::parse("09:30", "17:00").unwrap();
        assert_eq!(w.minutes(), 450);
        assert!(DailyWindow::parse("18:00", "09:00").is_err());
        assert!(DailyWindow::parse("9am", "17:00").is_err());
        assert_eq!(DailyWindow::default().minutes(), 14 * 60);
    }
}
