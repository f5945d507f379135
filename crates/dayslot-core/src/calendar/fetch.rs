//! Concurrent fetching of ICS subscriptions.
//!
//! Each enabled subscription is fetched in its own task with its own timeout.
//! Results are collected as settled outcomes: one feed failing never hides
//! the events of the others.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use tokio::task::{self, JoinSet};
use tracing::{debug, info, warn};
use url::Url;

use super::ics::parse_ics;
use super::{ExternalCalendarSubscription, ExternalEvent};
use crate::error::FetchError;
use crate::timeline::{calendar_day_bounds, to_datetime};

/// Default per-subscription timeout.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

type FetchOutcome = Result<Vec<ExternalEvent>, FetchError>;

const USER_AGENT: &str = concat!("dayslot/", env!("CARGO_PKG_VERSION"));

/// Instants `[start, end)` whose events should be loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl FetchRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// `days` whole local calendar days starting at `first`.
    pub fn for_days<Tz: TimeZone>(tz: &Tz, first: NaiveDate, days: u32) -> Self {
        let last = first
            .checked_add_days(chrono::Days::new(u64::from(days.max(1)) - 1))
            .unwrap_or(first);
        let (start, _) = calendar_day_bounds(tz, first);
        let (_, end) = calendar_day_bounds(tz, last);
        Self {
            start: to_datetime(start).unwrap_or(DateTime::<Utc>::MIN_UTC),
            end: to_datetime(end).unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    /// The local calendar month containing `day`.
    pub fn month_of<Tz: TimeZone>(tz: &Tz, day: NaiveDate) -> Self {
        let first = day.with_day(1).unwrap_or(day);
        let next_month = first
            .checked_add_months(chrono::Months::new(1))
            .unwrap_or(first);
        let days = (next_month - first).num_days().max(1) as u32;
        Self::for_days(tz, first, days)
    }
}

/// A subscription that could not be loaded.
#[derive(Debug)]
pub struct SourceFailure {
    pub subscription_id: String,
    pub name: String,
    pub error: FetchError,
}

/// Settled outcome of fetching every enabled subscription.
#[derive(Debug, Default)]
pub struct FetchReport {
    /// Events from every source that loaded, ordered by start.
    pub events: Vec<ExternalEvent>,
    pub failures: Vec<SourceFailure>,
}

impl FetchReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Build the HTTP client used for subscription fetches.
pub fn http_client() -> Result<reqwest::Client, FetchError> {
    Ok(reqwest::Client::builder().user_agent(USER_AGENT).build()?)
}

/// Resolve a subscription URL, rewriting `webcal://` to `https://`.
pub fn subscription_url(raw: &str) -> Result<Url, FetchError> {
    let raw = raw.trim();
    let rewritten = match raw.get(..9) {
        Some(scheme) if scheme.eq_ignore_ascii_case("webcal://") => format!("https://{}", &raw[9..]),
        _ => raw.to_string(),
    };
    let url = Url::parse(&rewritten).map_err(|e| FetchError::InvalidUrl {
        url: raw.to_string(),
        message: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(FetchError::InvalidUrl {
            url: raw.to_string(),
            message: format!("unsupported scheme '{other}'"),
        }),
    }
}

/// Fetch one subscription and parse the events that intersect `range`.
///
/// # Errors
///
/// Any transport, status, timeout, URL or parse failure for this source.
pub async fn fetch_and_parse<Tz: TimeZone>(
    client: &reqwest::Client,
    subscription: &ExternalCalendarSubscription,
    tz: &Tz,
    range: FetchRange,
    timeout: Duration,
) -> Result<Vec<ExternalEvent>, FetchError> {
    let url = subscription_url(&subscription.url)?;

    let request = async {
        let response = client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    };

    let text = tokio::time::timeout(timeout, request)
        .await
        .map_err(|_| FetchError::Timeout {
            timeout_ms: timeout.as_millis() as u64,
        })??;

    parse_ics(&text, &subscription.id, tz, range)
}

/// Fetch every enabled subscription concurrently.
///
/// Never fails as a whole: per-source errors are reported in
/// [`FetchReport::failures`] next to the events that did load.
pub async fn fetch_all<Tz>(
    client: &reqwest::Client,
    subscriptions: &[ExternalCalendarSubscription],
    tz: &Tz,
    range: FetchRange,
    timeout: Duration,
) -> FetchReport
where
    Tz: TimeZone + Send + Sync + 'static,
{
    let mut tasks = JoinSet::new();
    let mut pending = HashMap::new();
    for subscription in subscriptions.iter().filter(|s| s.enabled) {
        let client = client.clone();
        let fetched = subscription.clone();
        let tz = tz.clone();
        let handle = tasks.spawn(async move {
            fetch_and_parse(&client, &fetched, &tz, range, timeout).await
        });
        pending.insert(handle.id(), subscription.clone());
    }

    let mut report = settle(tasks, pending).await;

    report
        .events
        .sort_by(|a, b| (a.start, &a.source_id, &a.id).cmp(&(b.start, &b.source_id, &b.id)));
    report.failures.sort_by(|a, b| a.name.cmp(&b.name));

    info!(
        events = report.events.len(),
        failures = report.failures.len(),
        "calendar fetch settled"
    );
    report
}

/// Drain `tasks`, attributing every outcome (including a task that panicked
/// or was cancelled) to the subscription it was spawned for.
async fn settle(
    mut tasks: JoinSet<FetchOutcome>,
    mut pending: HashMap<task::Id, ExternalCalendarSubscription>,
) -> FetchReport {
    let mut report = FetchReport::default();
    while let Some(joined) = tasks.join_next_with_id().await {
        let (id, outcome) = match joined {
            Ok((id, outcome)) => (id, outcome),
            Err(error) => (
                error.id(),
                Err(FetchError::TaskFailed(error.to_string())),
            ),
        };
        let Some(subscription) = pending.remove(&id) else {
            continue;
        };

        match outcome {
            Ok(events) => {
                debug!(
                    calendar = %subscription.name,
                    events = events.len(),
                    "calendar subscription loaded"
                );
                report.events.extend(events);
            }
            Err(error) => {
                warn!(calendar = %subscription.name, %error, "calendar subscription failed");
                report.failures.push(SourceFailure {
                    subscription_id: subscription.id,
                    name: subscription.name,
                    error,
                });
            }
        }
    }
    report
}

/// Shared generation counter used to discard results for a stale range.
///
/// The view owning the visible range calls [`RangeToken::invalidate`] when
/// that range changes; a fetch started earlier holds a [`RangeTicket`] whose
/// commit then yields nothing.
#[derive(Debug, Clone, Default)]
pub struct RangeToken {
    generation: Arc<AtomicU64>,
}

impl RangeToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticket for a fetch of the currently visible range.
    pub fn issue(&self) -> RangeTicket {
        RangeTicket {
            token: self.clone(),
            generation: self.generation.load(Ordering::Acquire),
        }
    }

    /// Mark every outstanding ticket as stale.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }
}

/// Proof that a fetch was started for a particular range generation.
#[derive(Debug, Clone)]
pub struct RangeTicket {
    token: RangeToken,
    generation: u64,
}

impl RangeTicket {
    pub fn is_current(&self) -> bool {
        self.token.generation.load(Ordering::Acquire) == self.generation
    }

    /// Hand back `value` only if the range has not changed since issue.
    pub fn commit<T>(&self, value: T) -> Option<T> {
        self.is_current().then_some(value)
    }
}
