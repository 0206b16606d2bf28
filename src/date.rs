//! Timestamps as written by the reader firmware.
//!
//! Every date attribute on the device looks like `Mon, 01 Jan 2024 10:00:00 GMT`.
//! The weekday and zone abbreviations are checked for shape only: the
//! weekday need not agree with the date, and the instant is the wall-clock
//! value as written.

use std::fmt;

use chrono::{Datelike, NaiveDateTime};

use crate::error::{ProfilerError, Result};

const DEVICE_FORMAT: &str = "%d %b %Y %H:%M:%S";
const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const PLOT_FORMAT: &str = "%Y-%m-%d-%H:%M:%S";
const CONSOLE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    pub fn parse(value: &str) -> Result<Self> {
        let invalid = || ProfilerError::InvalidDate {
            value: value.to_string(),
        };

        let (datetime, zone) = value.trim().rsplit_once(' ').ok_or_else(invalid)?;
        if zone.is_empty() || !zone.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(invalid());
        }

        let (weekday, datetime) = datetime.split_once(", ").ok_or_else(invalid)?;
        if !WEEKDAYS.iter().any(|day| day.eq_ignore_ascii_case(weekday)) {
            return Err(invalid());
        }

        NaiveDateTime::parse_from_str(datetime, DEVICE_FORMAT)
            .map(Timestamp)
            .map_err(|_| invalid())
    }

    pub fn from_naive(datetime: NaiveDateTime) -> Self {
        Timestamp(datetime)
    }

    pub fn naive(&self) -> NaiveDateTime {
        self.0
    }

    /// `(year, month)` pair used to group the timeline into sections.
    pub fn year_month(&self) -> (i32, u32) {
        (self.0.year(), self.0.month())
    }

    /// `YYYY-MM-DD-HH:MM:SS`, the form gnuplot reads back.
    pub fn plot_format(&self) -> String {
        self.0.format(PLOT_FORMAT).to_string()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(CONSOLE_FORMAT))
    }
}
