//! iCalendar (ICS) text to [`ExternalEvent`] records.
//!
//! Only the properties needed for busy-time computation are read: `UID`,
//! `SUMMARY`, `DTSTART`, `DTEND` and `DURATION`. Recurrence rules are not
//! expanded; a recurring event contributes its first occurrence only.
//! `TZID` parameters are not resolved against a timezone database: such
//! times, like floating times, are read as wall-clock time in `tz`.

use std::io::BufReader;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use ical::parser::ical::component::IcalEvent;
use ical::property::Property;
use ical::IcalParser;

use super::fetch::FetchRange;
use super::ExternalEvent;
use crate::error::FetchError;

const UNTITLED: &str = "(untitled)";

/// A parsed `DTSTART`/`DTEND` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IcsTime {
    Date(NaiveDate),
    Utc(NaiveDateTime),
    Local(NaiveDateTime),
}

impl IcsTime {
    fn parse(property: &Property) -> Option<Self> {
        let raw = property.value.as_deref()?.trim();
        let is_date = param(property, "VALUE").is_some_and(|v| v.eq_ignore_ascii_case("DATE"))
            || (raw.len() == 8 && raw.bytes().all(|b| b.is_ascii_digit()));

        if is_date {
            return NaiveDate::parse_from_str(raw, "%Y%m%d").ok().map(Self::Date);
        }
        if let Some(utc) = raw.strip_suffix('Z') {
            return NaiveDateTime::parse_from_str(utc, "%Y%m%dT%H%M%S")
                .ok()
                .map(Self::Utc);
        }
        NaiveDateTime::parse_from_str(raw, "%Y%m%dT%H%M%S")
            .ok()
            .map(Self::Local)
    }

    fn is_date(self) -> bool {
        matches!(self, Self::Date(_))
    }

    fn to_utc<Tz: TimeZone>(self, tz: &Tz) -> Option<DateTime<Utc>> {
        let local = match self {
            Self::Utc(naive) => return Some(naive.and_utc()),
            Self::Date(date) => date.and_hms_opt(0, 0, 0)?,
            Self::Local(naive) => naive,
        };
        tz.from_local_datetime(&local)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Parse an ICS document and return the events that intersect `range`.
///
/// # Errors
///
/// Returns [`FetchError::Parse`] if the text is not an iCalendar document.
pub fn parse_ics<Tz: TimeZone>(
    text: &str,
    source_id: &str,
    tz: &Tz,
    range: FetchRange,
) -> Result<Vec<ExternalEvent>, FetchError> {
    let parser = IcalParser::new(BufReader::new(text.as_bytes()));

    let mut calendars = 0usize;
    let mut events = Vec::new();
    for calendar in parser {
        let calendar = calendar?;
        calendars += 1;
        for (index, event) in calendar.events.iter().enumerate() {
            if let Some(event) = convert_event(event, index, source_id, tz) {
                if event.overlaps(range.start, range.end) {
                    events.push(event);
                }
            }
        }
    }

    if calendars == 0 {
        return Err(FetchError::Parse("no VCALENDAR component found".into()));
    }
    Ok(events)
}

fn convert_event<Tz: TimeZone>(
    event: &IcalEvent,
    index: usize,
    source_id: &str,
    tz: &Tz,
) -> Option<ExternalEvent> {
    let start = IcsTime::parse(property(event, "DTSTART")?)?;
    let all_day = start.is_date();

    let end = match property(event, "DTEND").and_then(IcsTime::parse) {
        Some(end) => end.to_utc(tz)?,
        None => {
            let start_utc = start.to_utc(tz)?;
            let length = property(event, "DURATION")
                .and_then(|p| p.value.as_deref())
                .and_then(parse_duration)
                .unwrap_or_else(|| {
                    if all_day {
                        Duration::days(1)
                    } else {
                        Duration::zero()
                    }
                });
            start_utc + length
        }
    };
    let start = start.to_utc(tz)?;
    if end <= start {
        return None;
    }

    let id = text_value(event, "UID").unwrap_or_else(|| format!("{source_id}-{index}"));
    let title = text_value(event, "SUMMARY").unwrap_or_else(|| UNTITLED.to_string());

    Some(ExternalEvent {
        id,
        source_id: source_id.to_string(),
        title,
        start,
        end,
        all_day,
    })
}

fn property<'a>(event: &'a IcalEvent, name: &str) -> Option<&'a Property> {
    event
        .properties
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
}

fn param<'a>(property: &'a Property, name: &str) -> Option<&'a str> {
    property
        .params
        .as_ref()?
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .and_then(|(_, values)| values.first())
        .map(String::as_str)
}

fn text_value(event: &IcalEvent, name: &str) -> Option<String> {
    let value = property(event, name)?.value.as_deref()?.trim();
    if value.is_empty() {
        return None;
    }
    Some(unescape(value))
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Parse an RFC 5545 duration such as `PT1H30M`, `P1D` or `P2W`.
/// Negative durations are rejected.
fn parse_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    let raw = raw.strip_prefix('+').unwrap_or(raw);
    let body = raw.strip_prefix('P')?;

    let mut total = Duration::zero();
    let mut number = String::new();
    let mut in_time = false;
    let mut seen_unit = false;
    for c in body.chars() {
        match c {
            'T' => in_time = true,
            '0'..='9' => number.push(c),
            unit => {
                let n: i64 = number.parse().ok()?;
                number.clear();
                seen_unit = true;
                total += match (unit, in_time) {
                    ('W', false) => Duration::weeks(n),
                    ('D', false) => Duration::days(n),
                    ('H', true) => Duration::hours(n),
                    ('M', true) => Duration::minutes(n),
                    ('S', true) => Duration::seconds(n),
                    _ => return None,
                };
            }
        }
    }
    (seen_unit && number.is_empty()).then_some(total)
}
