//! # Dayslot Core Library
//!
//! This library provides the day-scheduling engine behind the calendar view
//! of a personal task manager. Given a day, a duration and everything
//! already committed on the calendar, it proposes an open slot or checks a
//! manually chosen time for conflicts.
//!
//! ## Architecture
//!
//! - **Task**: The scheduling-relevant slice of a task and the estimate-label
//!   duration table
//! - **Timeline**: Working window, busy-interval extraction and merging
//! - **Scheduler**: First-fit free-slot search and slot validation
//! - **Calendar**: ICS subscriptions, parsing, and concurrent fetching with
//!   partial-failure tolerance
//! - **Storage**: TOML configuration and the task store's JSON export
//!
//! ## Key Components
//!
//! - [`find_free_slot`]: Earliest feasible start for a duration on a day
//! - [`is_slot_free`]: Conflict check for a caller-chosen start
//! - [`fetch_all`]: Settled fetch of every enabled subscription
//! - [`Config`]: Application configuration management

pub mod calendar;
pub mod error;
pub mod scheduler;
pub mod storage;
pub mod task;
pub mod timeline;

pub use calendar::{
    fetch_all, fetch_and_parse, parse_ics, ExternalCalendarSubscription, ExternalEvent,
    FetchRange, FetchReport, RangeTicket, RangeToken, SourceFailure,
};
pub use error::{ConfigError, CoreError, FetchError, ScheduleError};
pub use scheduler::{
    busy_blocks, find_free_slot, find_slot_for_task, is_slot_free, propose_start, validate_start,
    ScheduleContext,
};
pub use storage::{Config, TaskSnapshot};
pub use task::{resolve_duration_minutes, SchedulableTask, TaskStatus, TimeEstimate};
pub use timeline::{extract_busy_intervals, merge_intervals, BusyInterval, WorkingWindow};
