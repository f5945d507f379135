//! Day boundaries and the fixed working window.
//!
//! All bounds are computed from local wall-clock times in the caller's
//! timezone and returned as milliseconds since the Unix epoch.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

/// First schedulable hour of the day (local).
pub const WINDOW_START_HOUR: u32 = 8;
/// Hour at which the working window closes (local, exclusive).
pub const WINDOW_END_HOUR: u32 = 23;
/// Granularity of proposed start times.
pub const SLOT_STEP_MINUTES: i64 = 5;

pub const MS_PER_MINUTE: i64 = 60_000;

/// Scheduling bounds for one day: `[start, end)` in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkingWindow {
    pub start: i64,
    pub end: i64,
}

impl WorkingWindow {
    /// 08:00 to 23:00 local on `day`.
    pub fn for_day<Tz: TimeZone>(tz: &Tz, day: NaiveDate) -> Self {
        Self {
            start: local_ms(tz, day, WINDOW_START_HOUR),
            end: local_ms(tz, day, WINDOW_END_HOUR),
        }
    }

    pub fn contains_range(&self, start: i64, end: i64) -> bool {
        start >= self.start && end <= self.end
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start) / MS_PER_MINUTE
    }
}

/// Calendar-day bounds `[midnight, next midnight)` in epoch milliseconds.
pub fn calendar_day_bounds<Tz: TimeZone>(tz: &Tz, day: NaiveDate) -> (i64, i64) {
    let next = day.succ_opt().unwrap_or(NaiveDate::MAX);
    (local_ms(tz, day, 0), local_ms(tz, next, 0))
}

/// Local calendar date of an instant.
pub fn local_date<Tz: TimeZone>(tz: &Tz, instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}

/// Round `ms` up to the next `step_minutes` boundary measured from `origin`.
///
/// `origin` is the window start, so boundaries land on local wall-clock
/// multiples of the step regardless of the zone's UTC offset.
pub fn ceil_to_minutes(ms: i64, origin: i64, step_minutes: i64) -> i64 {
    let step = step_minutes * MS_PER_MINUTE;
    if step <= 0 || ms <= origin {
        return ms.max(origin);
    }
    let offset = ms - origin;
    let rem = offset % step;
    if rem == 0 {
        ms
    } else {
        ms + (step - rem)
    }
}

pub fn to_datetime(ms: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
}

/// Epoch milliseconds of `hour:00` local on `day`.
///
/// Ambiguous times resolve to the earlier instant; a time skipped by a DST
/// jump resolves to the first valid instant after it.
fn local_ms<Tz: TimeZone>(tz: &Tz, day: NaiveDate, hour: u32) -> i64 {
    let time = NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN);
    let naive = NaiveDateTime::new(day, time);
    match tz.from_local_datetime(&naive).earliest() {
        Some(dt) => dt.timestamp_millis(),
        None => tz
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .map(|dt| dt.timestamp_millis() - Duration::hours(1).num_milliseconds())
            .unwrap_or_else(|| naive.and_utc().timestamp_millis()),
    }
}
