pub mod calendar;
pub mod config;
pub mod slot;

use std::error::Error;
use std::path::PathBuf;

use chrono::{DateTime, Local, NaiveDate, Utc};
use dayslot_core::calendar::fetch::http_client;
use dayslot_core::{
    fetch_all, Config, ExternalEvent, FetchRange, FetchReport, SchedulableTask, ScheduleError,
    TaskSnapshot,
};
use tracing::debug;

/// Exit status for a failed command. Scheduling verdicts ("no slot",
/// "conflict") exit with 2 so scripts can tell them from real failures.
pub fn exit_code(error: &(dyn Error + 'static)) -> i32 {
    match error.downcast_ref::<ScheduleError>() {
        Some(
            ScheduleError::NoFreeSlot
            | ScheduleError::SlotConflict
            | ScheduleError::OutsideWorkingHours,
        ) => 2,
        _ => 1,
    }
}

pub fn parse_day(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD, got '{value}': {e}"))
}

/// Tasks from `--data`, falling back to the configured export.
pub fn load_tasks(
    data: Option<PathBuf>,
    config: &Config,
) -> Result<Vec<SchedulableTask>, Box<dyn Error>> {
    match data.or_else(|| config.data_file.clone()) {
        Some(path) => Ok(TaskSnapshot::load(&path)?.tasks),
        None => Ok(Vec::new()),
    }
}

/// Fetch every enabled subscription for `range`, on a short-lived runtime.
pub fn fetch_events(config: &Config, range: FetchRange) -> Result<FetchReport, Box<dyn Error>> {
    if !config.external_calendars.iter().any(|c| c.enabled) {
        return Ok(FetchReport::default());
    }

    let client = http_client()?;
    let runtime = tokio::runtime::Runtime::new()?;
    let report = runtime.block_on(fetch_all(
        &client,
        &config.external_calendars,
        &Local,
        range,
        config.fetch_timeout(),
    ));
    debug!(
        events = report.events.len(),
        failures = report.failures.len(),
        "calendar fetch finished"
    );
    Ok(report)
}

/// External events around `day`, or none when offline. Unavailable
/// calendars are reported on stderr and skipped.
pub fn load_events(
    config: &Config,
    day: NaiveDate,
    offline: bool,
) -> Result<Vec<ExternalEvent>, Box<dyn Error>> {
    if offline {
        return Ok(Vec::new());
    }
    let report = fetch_events(config, FetchRange::month_of(&Local, day))?;
    warn_failures(&report);
    Ok(report.events)
}

pub fn warn_failures(report: &FetchReport) {
    for failure in &report.failures {
        eprintln!("warning: calendar '{}' unavailable: {}", failure.name, failure.error);
    }
}

/// `HH:MM` in local time, with `24:00` for a block ending at midnight
/// after `day`.
pub fn local_clock(instant: DateTime<Utc>, day: NaiveDate) -> String {
    let local = instant.with_timezone(&Local);
    if local.date_naive() > day {
        "24:00".to_string()
    } else {
        local.format("%H:%M").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_days() {
        assert_eq!(
            parse_day("2026-03-02").unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
        );
        assert!(parse_day("03/02/2026").is_err());
    }

    #[test]
    fn verdicts_exit_with_two() {
        assert_eq!(exit_code(&ScheduleError::NoFreeSlot), 2);
        assert_eq!(exit_code(&ScheduleError::SlotConflict), 2);
        assert_eq!(exit_code(&ScheduleError::InvalidDuration { minutes: 0 }), 1);
        let other: Box<dyn Error> = "boom".into();
        assert_eq!(exit_code(other.as_ref()), 1);
    }
}
