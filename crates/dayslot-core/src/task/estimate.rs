//! Coarse time-estimate labels and their scheduling durations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Duration used when a task carries no estimate.
pub const DEFAULT_DURATION_MINUTES: i64 = 30;

/// Time-estimate label attached to a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeEstimate {
    #[serde(rename = "5min")]
    FiveMinutes,
    #[serde(rename = "10min")]
    TenMinutes,
    #[serde(rename = "15min")]
    FifteenMinutes,
    #[serde(rename = "30min")]
    ThirtyMinutes,
    #[serde(rename = "1hr")]
    OneHour,
    #[serde(rename = "2hr")]
    TwoHours,
    #[serde(rename = "3hr")]
    ThreeHours,
    #[serde(rename = "4hr")]
    FourHours,
    #[serde(rename = "4hr+")]
    MoreThanFourHours,
}

impl TimeEstimate {
    pub const ALL: [TimeEstimate; 9] = [
        Self::FiveMinutes,
        Self::TenMinutes,
        Self::FifteenMinutes,
        Self::ThirtyMinutes,
        Self::OneHour,
        Self::TwoHours,
        Self::ThreeHours,
        Self::FourHours,
        Self::MoreThanFourHours,
    ];

    /// Minutes reserved on the calendar for this estimate.
    ///
    /// `4hr+` is open-ended in the UI but blocks exactly four hours here.
    pub fn minutes(self) -> i64 {
        match self {
            Self::FiveMinutes => 5,
            Self::TenMinutes => 10,
            Self::FifteenMinutes => 15,
            Self::ThirtyMinutes => 30,
            Self::OneHour => 60,
            Self::TwoHours => 120,
            Self::ThreeHours => 180,
            Self::FourHours => 240,
            Self::MoreThanFourHours => 240,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::FiveMinutes => "5min",
            Self::TenMinutes => "10min",
            Self::FifteenMinutes => "15min",
            Self::ThirtyMinutes => "30min",
            Self::OneHour => "1hr",
            Self::TwoHours => "2hr",
            Self::ThreeHours => "3hr",
            Self::FourHours => "4hr",
            Self::MoreThanFourHours => "4hr+",
        }
    }
}

impl fmt::Display for TimeEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimeEstimate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|e| e.label() == trimmed)
            .ok_or_else(|| {
                let valid: Vec<_> = Self::ALL.iter().map(|e| e.label()).collect();
                format!("unknown estimate '{s}'; expected one of {}", valid.join(", "))
            })
    }
}

/// Resolve an optional estimate to the minutes it occupies on the calendar.
pub fn resolve_duration_minutes(estimate: Option<TimeEstimate>) -> i64 {
    estimate.map_or(DEFAULT_DURATION_MINUTES, TimeEstimate::minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_table() {
        let expected = [5, 10, 15, 30, 60, 120, 180, 240, 240];
        for (estimate, minutes) in TimeEstimate::ALL.iter().zip(expected) {
            assert_eq!(resolve_duration_minutes(Some(*estimate)), minutes, "{estimate}");
        }
    }

    #[test]
    fn missing_estimate_defaults_to_thirty() {
        assert_eq!(resolve_duration_minutes(None), 30);
    }

    #[test]
    fn four_hours_plus_is_capped() {
        assert_eq!(
            TimeEstimate::MoreThanFourHours.minutes(),
            TimeEstimate::FourHours.minutes()
        );
    }

    #[test]
    fn labels_parse_and_serialize() {
        for estimate in TimeEstimate::ALL {
            assert_eq!(estimate.label().parse::<TimeEstimate>(), Ok(estimate));
            let json = serde_json::to_string(&estimate).unwrap();
            assert_eq!(json, format!("\"{}\"", estimate.label()));
        }
        assert!("90min".parse::<TimeEstimate>().is_err());
    }
}
