//! Time windows deciding whether a task should run.
//!
//! A window is five space-separated fields: `weekday month day hour minute`.
//! Each field is a comma list of integers or inclusive ranges `a-b`, e.g.
//! `"1-5 1-12 1-31 8 0-10"` matches weekdays between 08:00 and 08:10.
//! Weekday 1 is Monday and 7 is Sunday.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDateTime, Timelike};
use regex::Regex;
use thiserror::Error;

static WINDOW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\d+-?\d*(?:,\d+-?\d*)* ){4}(?:\d+-?\d*(?:,\d+-?\d*)*)$").unwrap()
});

/// Errors produced when parsing a time window.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("'{0}' is not a valid time window (expected 'weekday month day hour minute')")]
    Format(String),
    #[error("'{value}' in time window '{window}' is not a number")]
    Number { window: String, value: String },
    #[error("{field} {value} in time window '{window}' is outside {min}-{max}")]
    Range {
        window: String,
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },
}

/// Name and inclusive bounds of each field, in window order.
const FIELDS: [(&str, u32, u32); 5] = [
    ("weekday", 1, 7),
    ("month", 1, 12),
    ("day", 1, 31),
    ("hour", 0, 23),
    ("minute", 0, 59),
];

/// A parsed time window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWindow {
    source: String,
    fields: [Vec<u32>; 5],
}

impl TimeWindow {
    /// True when every field contains the corresponding component of `now`.
    #[must_use]
    pub fn matches(&self, now: NaiveDateTime) -> bool {
        let components = [
            now.weekday().number_from_monday(),
            now.month(),
            now.day(),
            now.hour(),
            now.minute(),
        ];
        components
            .iter()
            .zip(&self.fields)
            .all(|(value, allowed)| allowed.contains(value))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl FromStr for TimeWindow {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !WINDOW_RE.is_match(s) {
            return Err(ScheduleError::Format(s.to_string()));
        }

        let mut fields: [Vec<u32>; 5] = Default::default();
        let slots = fields.iter_mut().zip(s.split(' ')).zip(&FIELDS);
        for ((slot, field), &(name, min, max)) in slots {
            for item in field.split(',') {
                let (start, end) = match item.split_once('-') {
                    // "7-" is accepted by the format and means just 7
                    Some((start, "")) => (start, start),
                    Some((start, end)) => (start, end),
                    None => (item, item),
                };
                let a = parse_number(s, start)?;
                let b = parse_number(s, end)?;
                let (low, high) = if a > b { (b, a) } else { (a, b) };
                for value in [low, high] {
                    if !(min..=max).contains(&value) {
                        return Err(ScheduleError::Range {
                            window: s.to_string(),
                            field: name,
                            value,
                            min,
                            max,
                        });
                    }
                }
                slot.extend(low..=high);
            }
        }

        Ok(Self {
            source: s.to_string(),
            fields,
        })
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn parse_number(window: &str, value: &str) -> Result<u32, ScheduleError> {
    value.parse().map_err(|_| ScheduleError::Number {
        window: window.to_string(),
        value: value.to_string(),
    })
}

/// Parses all windows of a task.
pub fn parse_windows<S: AsRef<str>>(windows: &[S]) -> Result<Vec<TimeWindow>, ScheduleError> {
    windows.iter().map(|w| w.as_ref().parse()).collect()
}

/// True when any of `windows` matches `now`.
#[must_use]
pub fn any_matches(windows: &[TimeWindow], now: NaiveDateTime) -> bool {
    windows.iter().any(|w| w.matches(now))
}
