//! Integration tests for concurrent ICS subscription fetching.
//!
//! HTTP endpoints are served by mockito; the timeout case uses a raw socket
//! that accepts connections and never answers.

use std::time::Duration;

use chrono::{NaiveDate, TimeZone, Utc};
use dayslot_core::calendar::fetch::http_client;
use dayslot_core::{
    fetch_all, fetch_and_parse, find_free_slot, ExternalCalendarSubscription, FetchError,
    FetchRange, RangeToken, ScheduleContext,
};

const WORK_ICS: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//work//EN\r\n\
BEGIN:VEVENT\r\n\
UID:planning@work\r\n\
SUMMARY:Planning\r\n\
DTSTART:20260302T080000Z\r\n\
DTEND:20260302T100000Z\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:offsite@work\r\n\
SUMMARY:Offsite\r\n\
DTSTART;VALUE=DATE:20260303\r\n\
DTEND;VALUE=DATE:20260304\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

const HOME_ICS: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//home//EN\r\n\
BEGIN:VEVENT\r\n\
UID:dentist@home\r\n\
SUMMARY:Dentist\r\n\
DTSTART:20260302T100000Z\r\n\
DTEND:20260302T110000Z\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
}

fn march() -> FetchRange {
    FetchRange::month_of(&Utc, day())
}

fn subscription(name: &str, url: String) -> ExternalCalendarSubscription {
    let mut sub = ExternalCalendarSubscription::new(name, url);
    sub.id = name.to_lowercase();
    sub
}

/// Address that accepts TCP connections but never writes a response.
async fn silent_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });
    format!("http://{addr}/slow.ics")
}

#[tokio::test]
async fn fetch_single_subscription() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/work.ics")
        .with_status(200)
        .with_header("content-type", "text/calendar")
        .with_body(WORK_ICS)
        .create_async()
        .await;

    let client = http_client().unwrap();
    let sub = subscription("Work", format!("{}/work.ics", server.url()));
    let events = fetch_and_parse(&client, &sub, &Utc, march(), Duration::from_secs(5))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| e.source_id == "work"));
    assert!(events.iter().any(|e| e.all_day && e.title == "Offsite"));
}

#[tokio::test]
async fn http_error_status_is_reported() {
    let mut server = mockito::Server::new_async().await;
    let _gone = server
        .mock("GET", "/gone.ics")
        .with_status(404)
        .create_async()
        .await;

    let client = http_client().unwrap();
    let sub = subscription("Gone", format!("{}/gone.ics", server.url()));
    let result = fetch_and_parse(&client, &sub, &Utc, march(), Duration::from_secs(5)).await;
    assert!(matches!(result, Err(FetchError::Status { status: 404 })));
}

#[tokio::test]
async fn slow_source_times_out() {
    let client = http_client().unwrap();
    let sub = subscription("Slow", silent_server().await);
    let result = fetch_and_parse(&client, &sub, &Utc, march(), Duration::from_millis(200)).await;
    assert!(matches!(result, Err(FetchError::Timeout { timeout_ms: 200 })));
}

#[tokio::test]
async fn one_failing_source_does_not_hide_others() {
    let mut server = mockito::Server::new_async().await;
    let _work = server
        .mock("GET", "/work.ics")
        .with_status(200)
        .with_body(WORK_ICS)
        .create_async()
        .await;
    let _home = server
        .mock("GET", "/home.ics")
        .with_status(200)
        .with_body(HOME_ICS)
        .create_async()
        .await;
    let _broken = server
        .mock("GET", "/broken.ics")
        .with_status(200)
        .with_body("<html>maintenance</html>")
        .create_async()
        .await;

    let subscriptions = vec![
        subscription("Work", format!("{}/work.ics", server.url())),
        subscription("Home", format!("{}/home.ics", server.url())),
        subscription("Broken", format!("{}/broken.ics", server.url())),
        subscription("Slow", silent_server().await),
    ];

    let client = http_client().unwrap();
    let report = fetch_all(
        &client,
        &subscriptions,
        &Utc,
        march(),
        Duration::from_millis(500),
    )
    .await;

    assert_eq!(report.events.len(), 3);
    assert_eq!(report.events[0].id, "planning@work");
    let failed: Vec<_> = report.failures.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(failed, vec!["Broken", "Slow"]);
    assert!(matches!(report.failures[0].error, FetchError::Parse(_)));
    assert!(matches!(report.failures[1].error, FetchError::Timeout { .. }));

    // The surviving events still drive scheduling.
    let now = Utc.with_ymd_and_hms(2026, 3, 2, 7, 0, 0).unwrap();
    let ctx = ScheduleContext::new(&[], &report.events, now, Utc);
    let slot = find_free_slot(day(), 60, &ctx, None).unwrap();
    assert_eq!(slot, Some(Utc.with_ymd_and_hms(2026, 3, 2, 11, 0, 0).unwrap()));
}

#[tokio::test]
async fn stale_fetch_is_discarded() {
    let mut server = mockito::Server::new_async().await;
    let _home = server
        .mock("GET", "/home.ics")
        .with_status(200)
        .with_body(HOME_ICS)
        .create_async()
        .await;

    let token = RangeToken::new();
    let ticket = token.issue();
    let client = http_client().unwrap();
    let subscriptions = vec![subscription("Home", format!("{}/home.ics", server.url()))];

    let report = fetch_all(&client, &subscriptions, &Utc, march(), Duration::from_secs(5)).await;
    // The visible range moved while the fetch was in flight.
    token.invalidate();

    assert!(ticket.commit(report).is_none());
}
