//! Core error types for dayslot-core.
//!
//! This module defines the error hierarchy using thiserror. The scheduling
//! engine itself reports "no slot" and "conflict" as plain values; the
//! [`ScheduleError`] variants for those cases exist for callers that want to
//! propagate them with `?`.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for dayslot-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Scheduling errors
    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    /// Calendar subscription fetch errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The task store export could not be read
    #[error("Cannot read task data {}: {source}", path.display())]
    TaskDataUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Scheduling errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// Requested duration is zero or negative
    #[error("Invalid duration: {minutes} minutes (must be positive)")]
    InvalidDuration { minutes: i64 },

    /// The working window has no gap long enough
    #[error("No free time available")]
    NoFreeSlot,

    /// Candidate start lies outside the working window
    #[error("Requested time is outside working hours")]
    OutsideWorkingHours,

    /// Candidate range overlaps something already on the calendar
    #[error("Requested time overlaps an existing block")]
    SlotConflict,
}

/// Errors raised while fetching or parsing one calendar subscription.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The request did not settle within the per-source budget
    #[error("Request timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    /// Transport-level failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Server returned status {status}")]
    Status { status: u16 },

    /// Body was not a readable iCalendar document
    #[error("Malformed ICS: {0}")]
    Parse(String),

    /// The fetch task panicked or was cancelled before finishing
    #[error("Fetch task did not complete: {0}")]
    TaskFailed(String),

    /// Subscription URL could not be parsed
    #[error("Invalid subscription URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(err: toml::ser::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

impl From<ical::parser::ParserError> for FetchError {
    fn from(err: ical::parser::ParserError) -> Self {
        FetchError::Parse(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
