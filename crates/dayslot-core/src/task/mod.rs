//! Task view-model consumed by the scheduling engine.
//!
//! Tasks live in the shared task store; this crate only reads the subset of
//! fields that decide whether a task occupies time on a given day.

pub mod estimate;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use estimate::{resolve_duration_minutes, TimeEstimate, DEFAULT_DURATION_MINUTES};

/// Workflow status of a task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Inbox,
    Next,
    Waiting,
    Someday,
    Reference,
    Done,
    Archived,
}

impl TaskStatus {
    /// Completed tasks no longer hold their calendar block.
    pub fn is_completed(self) -> bool {
        matches!(self, TaskStatus::Done | TaskStatus::Archived)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Inbox => "inbox",
            TaskStatus::Next => "next",
            TaskStatus::Waiting => "waiting",
            TaskStatus::Someday => "someday",
            TaskStatus::Reference => "reference",
            TaskStatus::Done => "done",
            TaskStatus::Archived => "archived",
        };
        f.write_str(s)
    }
}

/// The scheduling-relevant slice of a task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SchedulableTask {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: TaskStatus,
    /// Planned block start.
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub time_estimate: Option<TimeEstimate>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl SchedulableTask {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            status: TaskStatus::default(),
            start_time: None,
            time_estimate: None,
            due_date: None,
            deleted_at: None,
        }
    }

    /// Builder: set the planned start.
    pub fn starting_at(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = Some(start_time);
        self
    }

    /// Builder: set the time estimate.
    pub fn with_estimate(mut self, estimate: TimeEstimate) -> Self {
        self.time_estimate = Some(estimate);
        self
    }

    /// Builder: set the status.
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Whether this task can occupy a calendar block at all.
    pub fn is_schedulable(&self) -> bool {
        !self.is_deleted() && !self.status.is_completed() && self.start_time.is_some()
    }

    pub fn duration_minutes(&self) -> i64 {
        resolve_duration_minutes(self.time_estimate)
    }
}
