//! Calendar subscription commands.

use chrono::{Local, NaiveDate};
use clap::Subcommand;
use dayslot_core::{Config, ExternalCalendarSubscription, FetchRange};

use super::{fetch_events, local_clock, parse_day, warn_failures};

#[derive(Subcommand)]
pub enum CalendarAction {
    /// List configured subscriptions
    List {
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
    /// Subscribe to an ICS feed
    Add {
        /// Display name
        name: String,
        /// Feed URL (http, https or webcal)
        url: String,
    },
    /// Remove a subscription by id or name
    Remove { id: String },
    /// Enable a subscription by id or name
    Enable { id: String },
    /// Disable a subscription by id or name
    Disable { id: String },
    /// Fetch and show external events for a day
    Events {
        /// Day to show (YYYY-MM-DD)
        #[arg(long, value_parser = parse_day)]
        day: NaiveDate,
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: CalendarAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        CalendarAction::List { json } => {
            let config = Config::load()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config.external_calendars)?);
            } else if config.external_calendars.is_empty() {
                println!("no calendars");
            } else {
                for calendar in &config.external_calendars {
                    let state = if calendar.enabled { "on " } else { "off" };
                    println!("{state} {} {} {}", calendar.id, calendar.name, calendar.url);
                }
            }
        }
        CalendarAction::Add { name, url } => {
            let mut config = Config::load()?;
            let added = config.add_calendar(ExternalCalendarSubscription::new(name, url))?;
            config.save()?;
            println!("calendar added: {} ({})", added.name, added.id);
        }
        CalendarAction::Remove { id } => {
            let mut config = Config::load()?;
            if !config.remove_calendar(&id) {
                return Err(format!("calendar not found: {id}").into());
            }
            config.save()?;
            println!("calendar removed");
        }
        CalendarAction::Enable { id } => set_enabled(&id, true)?,
        CalendarAction::Disable { id } => set_enabled(&id, false)?,
        CalendarAction::Events { day, json } => {
            let config = Config::load()?;
            let report = fetch_events(&config, FetchRange::for_days(&Local, day, 1))?;
            warn_failures(&report);

            if json {
                println!("{}", serde_json::to_string_pretty(&report.events)?);
            } else if report.events.is_empty() {
                println!("no events");
            } else {
                for event in &report.events {
                    let when = if event.all_day {
                        "all day    ".to_string()
                    } else {
                        format!("{}-{}", local_clock(event.start, day), local_clock(event.end, day))
                    };
                    println!("{when} {}", event.title);
                }
            }
        }
    }
    Ok(())
}

fn set_enabled(id: &str, enabled: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load()?;
    let calendar = config
        .calendar_mut(id)
        .ok_or_else(|| format!("calendar not found: {id}"))?;
    calendar.enabled = enabled;
    let name = calendar.name.clone();
    config.save()?;
    println!("{name} {}", if enabled { "enabled" } else { "disabled" });
    Ok(())
}
