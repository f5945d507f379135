//! Half-open busy intervals and the interval-merge sweep.

use serde::{Deserialize, Serialize};

use super::window::MS_PER_MINUTE;

/// A time range already occupied on the calendar: `[start, end)` in epoch
/// milliseconds. Always satisfies `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BusyInterval {
    pub start: i64,
    pub end: i64,
}

impl BusyInterval {
    /// Create an interval, or `None` if it would be empty.
    pub fn new(start: i64, end: i64) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    /// Intersection with `[lo, hi)`, or `None` if nothing remains.
    pub fn clip(self, lo: i64, hi: i64) -> Option<Self> {
        Self::new(self.start.max(lo), self.end.min(hi))
    }

    /// Half-open overlap test against `[start, end)`.
    ///
    /// Back-to-back ranges (`self.end == start`) do not overlap.
    pub fn overlaps(&self, start: i64, end: i64) -> bool {
        start < self.end && end > self.start
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start) / MS_PER_MINUTE
    }
}

/// Sort and coalesce intervals into an ascending, pairwise-disjoint list.
///
/// Touching intervals (`end == next.start`) are merged as well, so the
/// output always satisfies `end_i < start_{i+1}`.
pub fn merge_intervals(intervals: &[BusyInterval]) -> Vec<BusyInterval> {
    let mut sorted = intervals.to_vec();
    sorted.sort_by_key(|i| (i.start, i.end));

    let mut merged: Vec<BusyInterval> = Vec::with_capacity(sorted.len());
    for interval in sorted {
        match merged.last_mut() {
            Some(last) if interval.start <= last.end => {
                last.end = last.end.max(interval.end);
            }
            _ => merged.push(interval),
        }
    }
    merged
}
