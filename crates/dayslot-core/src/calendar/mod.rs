//! External calendar subscriptions and the events they provide.
//!
//! Events imported from ICS subscriptions are read-only: the scheduling
//! engine only uses them to mark time as busy.

pub mod fetch;
pub mod ics;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use fetch::{fetch_all, fetch_and_parse, FetchRange, FetchReport, RangeTicket, RangeToken, SourceFailure};
pub use ics::parse_ics;

/// Name given to subscriptions saved without one.
pub const DEFAULT_CALENDAR_NAME: &str = "Calendar";

/// An event from an external calendar subscription.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExternalEvent {
    pub id: String,
    pub source_id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub all_day: bool,
}

impl ExternalEvent {
    /// Whether the event intersects `[start, end)`.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start < end && self.end > start
    }
}

/// A configured ICS feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExternalCalendarSubscription {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl ExternalCalendarSubscription {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            url: url.into(),
            enabled: true,
        }
    }

    /// Trim fields and fill in a default name. Returns `None` when the URL
    /// is blank, since such an entry can never be fetched.
    pub fn sanitized(mut self) -> Option<Self> {
        self.url = self.url.trim().to_string();
        if self.url.is_empty() {
            return None;
        }
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            self.name = DEFAULT_CALENDAR_NAME.to_string();
        }
        Some(self)
    }
}

/// Sanitize a list of subscriptions, dropping unusable entries.
pub fn sanitize_subscriptions(
    subscriptions: Vec<ExternalCalendarSubscription>,
) -> Vec<ExternalCalendarSubscription> {
    subscriptions
        .into_iter()
        .filter_map(ExternalCalendarSubscription::sanitized)
        .collect()
}
