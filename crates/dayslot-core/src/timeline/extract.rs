//! Busy-interval extraction for a single day.

use chrono::{NaiveDate, TimeZone};

use super::interval::BusyInterval;
use super::window::{calendar_day_bounds, local_date, WorkingWindow, MS_PER_MINUTE};
use crate::calendar::ExternalEvent;
use crate::task::SchedulableTask;

/// Convert tasks and external events into busy intervals on `day`, clipped
/// to the working window.
///
/// * Tasks count when they are live (not deleted, not completed), carry a
///   start time on `day`, and are not `exclude_task_id`.
/// * Events count when they are timed (not all-day) and intersect the
///   calendar day.
///
/// The result is unsorted and may contain overlaps; see
/// [`merge_intervals`](super::merge_intervals).
pub fn extract_busy_intervals<Tz: TimeZone>(
    tz: &Tz,
    day: NaiveDate,
    tasks: &[SchedulableTask],
    external_events: &[ExternalEvent],
    exclude_task_id: Option<&str>,
) -> Vec<BusyInterval> {
    let window = WorkingWindow::for_day(tz, day);
    let (day_start, day_end) = calendar_day_bounds(tz, day);

    let task_intervals = tasks
        .iter()
        .filter(|task| !task.is_deleted() && !task.status.is_completed())
        .filter(|task| exclude_task_id != Some(task.id.as_str()))
        .filter_map(|task| {
            let start_time = task.start_time?;
            if local_date(tz, start_time) != day {
                return None;
            }
            let start = start_time.timestamp_millis();
            let end = start + task.duration_minutes() * MS_PER_MINUTE;
            BusyInterval::new(start, end)?.clip(window.start, window.end)
        });

    let event_intervals = external_events
        .iter()
        .filter(|event| !event.all_day)
        .filter_map(|event| {
            let start = event.start.timestamp_millis();
            let end = event.end.timestamp_millis();
            if !(start < day_end && end > day_start) {
                return None;
            }
            BusyInterval::new(start, end)?.clip(window.start, window.end)
        });

    task_intervals.chain(event_intervals).collect()
}
