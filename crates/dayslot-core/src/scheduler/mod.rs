//! Day-scheduling engine.
//!
//! Finds an open slot for a new block of work, or checks that a chosen time
//! does not collide with anything already on the calendar:
//! - Busy time comes from scheduled tasks and timed external events
//! - Slots are only proposed or accepted inside the 08:00-23:00 window
//! - Proposals are first-fit: the earliest feasible start always wins
//!
//! Both entry points are pure. "Now" and the local timezone are carried
//! explicitly in [`ScheduleContext`].

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use tracing::debug;

use crate::calendar::ExternalEvent;
use crate::error::ScheduleError;
use crate::task::SchedulableTask;
use crate::timeline::{
    ceil_to_minutes, extract_busy_intervals, local_date, merge_intervals, to_datetime,
    BusyInterval, WorkingWindow, MS_PER_MINUTE, SLOT_STEP_MINUTES,
};

/// Everything a scheduling query reads.
#[derive(Debug, Clone)]
pub struct ScheduleContext<'a, Tz: TimeZone> {
    pub tasks: &'a [SchedulableTask],
    pub external_events: &'a [ExternalEvent],
    pub now: DateTime<Utc>,
    /// Zone whose wall clock defines days and the working window.
    pub tz: Tz,
}

impl<'a, Tz: TimeZone> ScheduleContext<'a, Tz> {
    pub fn new(
        tasks: &'a [SchedulableTask],
        external_events: &'a [ExternalEvent],
        now: DateTime<Utc>,
        tz: Tz,
    ) -> Self {
        Self {
            tasks,
            external_events,
            now,
            tz,
        }
    }

    fn is_today(&self, day: NaiveDate) -> bool {
        local_date(&self.tz, self.now) == day
    }

    fn busy_intervals(&self, day: NaiveDate, exclude_task_id: Option<&str>) -> Vec<BusyInterval> {
        extract_busy_intervals(
            &self.tz,
            day,
            self.tasks,
            self.external_events,
            exclude_task_id,
        )
    }
}

// Saturates, so an oversized request simply never fits the window.
fn duration_ms(duration_minutes: i64) -> Result<i64, ScheduleError> {
    if duration_minutes <= 0 {
        return Err(ScheduleError::InvalidDuration {
            minutes: duration_minutes,
        });
    }
    Ok(duration_minutes.saturating_mul(MS_PER_MINUTE))
}

/// Find the earliest start on `day` with `duration_minutes` of free time.
///
/// On today the search starts at "now" rounded up to the next 5-minute
/// boundary; on any other day it starts at the window open.
///
/// # Returns
/// `Ok(None)` when no gap is long enough.
///
/// # Errors
/// [`ScheduleError::InvalidDuration`] if `duration_minutes <= 0`.
pub fn find_free_slot<Tz: TimeZone>(
    day: NaiveDate,
    duration_minutes: i64,
    context: &ScheduleContext<'_, Tz>,
    exclude_task_id: Option<&str>,
) -> Result<Option<DateTime<Utc>>, ScheduleError> {
    let duration = duration_ms(duration_minutes)?;
    let window = WorkingWindow::for_day(&context.tz, day);

    let from = if context.is_today(day) {
        context.now.timestamp_millis()
    } else {
        window.start
    };
    let earliest = ceil_to_minutes(window.start.max(from), window.start, SLOT_STEP_MINUTES);

    let busy = merge_intervals(&context.busy_intervals(day, exclude_task_id));
    debug!(%day, duration_minutes, busy = busy.len(), "searching for free slot");

    let mut cursor = earliest;
    for interval in &busy {
        if cursor.saturating_add(duration) <= interval.start {
            return Ok(to_datetime(cursor));
        }
        cursor = cursor.max(interval.end);
    }

    if cursor.saturating_add(duration) <= window.end {
        Ok(to_datetime(cursor))
    } else {
        debug!(%day, duration_minutes, "no free slot in working window");
        Ok(None)
    }
}

/// Check whether `[candidate_start, candidate_start + duration)` is inside
/// the working window and clear of every busy block on `day`.
///
/// # Errors
/// [`ScheduleError::InvalidDuration`] if `duration_minutes <= 0`.
pub fn is_slot_free<Tz: TimeZone>(
    day: NaiveDate,
    candidate_start: DateTime<Utc>,
    duration_minutes: i64,
    context: &ScheduleContext<'_, Tz>,
    exclude_task_id: Option<&str>,
) -> Result<bool, ScheduleError> {
    Ok(check_slot(day, candidate_start, duration_minutes, context, exclude_task_id)?.is_ok())
}

/// [`find_free_slot`] with "no slot" lifted into [`ScheduleError::NoFreeSlot`].
pub fn propose_start<Tz: TimeZone>(
    day: NaiveDate,
    duration_minutes: i64,
    context: &ScheduleContext<'_, Tz>,
    exclude_task_id: Option<&str>,
) -> Result<DateTime<Utc>, ScheduleError> {
    find_free_slot(day, duration_minutes, context, exclude_task_id)?
        .ok_or(ScheduleError::NoFreeSlot)
}

/// [`is_slot_free`] that reports why a time was rejected:
/// [`ScheduleError::OutsideWorkingHours`] or [`ScheduleError::SlotConflict`].
pub fn validate_start<Tz: TimeZone>(
    day: NaiveDate,
    candidate_start: DateTime<Utc>,
    duration_minutes: i64,
    context: &ScheduleContext<'_, Tz>,
    exclude_task_id: Option<&str>,
) -> Result<(), ScheduleError> {
    check_slot(day, candidate_start, duration_minutes, context, exclude_task_id)?
}

/// Find a slot for an existing task using its own estimate. The task never
/// conflicts with its current placement.
pub fn find_slot_for_task<Tz: TimeZone>(
    task: &SchedulableTask,
    day: NaiveDate,
    context: &ScheduleContext<'_, Tz>,
) -> Result<Option<DateTime<Utc>>, ScheduleError> {
    find_free_slot(day, task.duration_minutes(), context, Some(&task.id))
}

/// The merged busy set for `day`, for display.
pub fn busy_blocks<Tz: TimeZone>(
    day: NaiveDate,
    context: &ScheduleContext<'_, Tz>,
    exclude_task_id: Option<&str>,
) -> Vec<BusyInterval> {
    merge_intervals(&context.busy_intervals(day, exclude_task_id))
}

// Outer error: malformed input. Inner error: the verdict.
fn check_slot<Tz: TimeZone>(
    day: NaiveDate,
    candidate_start: DateTime<Utc>,
    duration_minutes: i64,
    context: &ScheduleContext<'_, Tz>,
    exclude_task_id: Option<&str>,
) -> Result<Result<(), ScheduleError>, ScheduleError> {
    let duration = duration_ms(duration_minutes)?;
    let window = WorkingWindow::for_day(&context.tz, day);
    let start = candidate_start.timestamp_millis();
    let end = start.saturating_add(duration);

    if !window.contains_range(start, end) {
        return Ok(Err(ScheduleError::OutsideWorkingHours));
    }

    let conflict = context
        .busy_intervals(day, exclude_task_id)
        .into_iter()
        .find(|busy| busy.overlaps(start, end));

    match conflict {
        Some(busy) => {
            debug!(
                %day,
                start,
                end,
                busy_start = busy.start,
                busy_end = busy.end,
                "slot conflicts with busy block"
            );
            Ok(Err(ScheduleError::SlotConflict))
        }
        None => Ok(Ok(())),
    }
}
