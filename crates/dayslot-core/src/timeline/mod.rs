//! Busy-time model for a single day.
//!
//! This module provides:
//! - The fixed working window and calendar-day boundaries
//! - Extraction of busy intervals from tasks and external events
//! - The interval-merge sweep used by the free-slot search

mod extract;
mod interval;
mod window;

pub use extract::extract_busy_intervals;
pub use interval::{merge_intervals, BusyInterval};
pub use window::{
    calendar_day_bounds, ceil_to_minutes, local_date, to_datetime, WorkingWindow, MS_PER_MINUTE,
    SLOT_STEP_MINUTES, WINDOW_END_HOUR, WINDOW_START_HOUR,
};
