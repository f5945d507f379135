//! Slot commands: propose a start time, check a chosen one, show busy time.

use std::path::PathBuf;

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use clap::{Args, Subcommand};
use dayslot_core::timeline::to_datetime;
use dayslot_core::{
    busy_blocks, propose_start, resolve_duration_minutes, validate_start, Config, ExternalEvent,
    SchedulableTask, ScheduleContext, TimeEstimate,
};
use serde_json::json;

use super::{load_events, load_tasks, local_clock, parse_day};

#[derive(Subcommand)]
pub enum SlotAction {
    /// Propose the earliest free start on a day
    Find {
        /// Day to search (YYYY-MM-DD)
        #[arg(long, value_parser = parse_day)]
        day: NaiveDate,
        #[command(flatten)]
        duration: DurationArgs,
        #[command(flatten)]
        source: SourceArgs,
        /// Print JSON instead of a time range
        #[arg(long)]
        json: bool,
    },
    /// Check whether a chosen start time is free
    Check {
        /// Day of the slot (YYYY-MM-DD)
        #[arg(long, value_parser = parse_day)]
        day: NaiveDate,
        /// Local start time (HH:MM)
        #[arg(long, value_parser = parse_clock)]
        at: NaiveTime,
        #[command(flatten)]
        duration: DurationArgs,
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Show the merged busy time of a day
    Busy {
        /// Day to show (YYYY-MM-DD)
        #[arg(long, value_parser = parse_day)]
        day: NaiveDate,
        #[command(flatten)]
        source: SourceArgs,
        /// Print JSON instead of time ranges
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
#[group(multiple = false)]
pub struct DurationArgs {
    /// Duration in minutes
    #[arg(long, allow_negative_numbers = true)]
    minutes: Option<i64>,
    /// Duration as an estimate label (5min, 10min, ..., 4hr, 4hr+)
    #[arg(long)]
    estimate: Option<TimeEstimate>,
}

#[derive(Args)]
pub struct SourceArgs {
    /// Task being placed; it never conflicts with its own current slot
    #[arg(long)]
    task: Option<String>,
    /// Task store JSON export (defaults to `data_file` in config)
    #[arg(long)]
    data: Option<PathBuf>,
    /// Skip external calendar subscriptions
    #[arg(long)]
    offline: bool,
    /// Override the current time (RFC 3339)
    #[arg(long, hide = true)]
    now: Option<DateTime<Utc>>,
}

fn parse_clock(value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|e| format!("expected HH:MM, got '{value}': {e}"))
}

/// Everything loaded for one slot query.
struct Loaded {
    tasks: Vec<SchedulableTask>,
    events: Vec<ExternalEvent>,
    task: Option<SchedulableTask>,
    now: DateTime<Utc>,
}

impl Loaded {
    fn load(day: NaiveDate, source: &SourceArgs) -> Result<Self, Box<dyn std::error::Error>> {
        let config = Config::load()?;
        let tasks = load_tasks(source.data.clone(), &config)?;
        let task = match &source.task {
            Some(id) => Some(
                tasks
                    .iter()
                    .find(|t| &t.id == id)
                    .cloned()
                    .ok_or_else(|| format!("task not found: {id}"))?,
            ),
            None => None,
        };
        let events = load_events(&config, day, source.offline)?;
        Ok(Self {
            tasks,
            events,
            task,
            now: source.now.unwrap_or_else(Utc::now),
        })
    }

    fn context(&self) -> ScheduleContext<'_, Local> {
        ScheduleContext::new(&self.tasks, &self.events, self.now, Local)
    }

    fn exclude(&self) -> Option<&str> {
        self.task.as_ref().map(|t| t.id.as_str())
    }

    /// Explicit minutes win, then an estimate label, then the task's own
    /// estimate.
    fn duration_minutes(&self, args: &DurationArgs) -> i64 {
        if let Some(minutes) = args.minutes {
            return minutes;
        }
        match (args.estimate, &self.task) {
            (Some(estimate), _) => estimate.minutes(),
            (None, Some(task)) => task.duration_minutes(),
            (None, None) => resolve_duration_minutes(None),
        }
    }
}

pub fn run(action: SlotAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SlotAction::Find {
            day,
            duration,
            source,
            json,
        } => {
            let loaded = Loaded::load(day, &source)?;
            let minutes = loaded.duration_minutes(&duration);
            let start = propose_start(day, minutes, &loaded.context(), loaded.exclude())?;
            let end = start + chrono::Duration::minutes(minutes);

            if json {
                let out = json!({
                    "day": day.to_string(),
                    "start": start.to_rfc3339(),
                    "end": end.to_rfc3339(),
                    "durationMinutes": minutes,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("{}-{}", local_clock(start, day), local_clock(end, day));
            }
        }
        SlotAction::Check {
            day,
            at,
            duration,
            source,
        } => {
            let loaded = Loaded::load(day, &source)?;
            let minutes = loaded.duration_minutes(&duration);
            let start = Local
                .from_local_datetime(&day.and_time(at))
                .earliest()
                .ok_or_else(|| format!("{day} {at} does not exist in the local time zone"))?
                .with_timezone(&Utc);

            validate_start(day, start, minutes, &loaded.context(), loaded.exclude())?;
            println!("free");
        }
        SlotAction::Busy { day, source, json } => {
            let loaded = Loaded::load(day, &source)?;
            let blocks: Vec<_> = busy_blocks(day, &loaded.context(), loaded.exclude())
                .iter()
                .filter_map(|b| Some((to_datetime(b.start)?, to_datetime(b.end)?)))
                .collect();

            if json {
                let out: Vec<_> = blocks
                    .iter()
                    .map(|(start, end)| {
                        json!({ "start": start.to_rfc3339(), "end": end.to_rfc3339() })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else if blocks.is_empty() {
                println!("no busy time");
            } else {
                for (start, end) in &blocks {
                    println!("{}-{}", local_clock(*start, day), local_clock(*end, day));
                }
            }
        }
    }
    Ok(())
}
