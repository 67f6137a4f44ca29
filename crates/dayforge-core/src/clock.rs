//! Wall-clock arithmetic on local `HH:MM` times.
//!
//! A [`ClockTime`] is a minute offset from local midnight. Addition wraps
//! around the day; comparison and plain differences do not, which is what
//! the plan generator wants for everything except the overnight sleep block.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// A local clock time with minute resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(u16);

impl ClockTime {
    /// Build from hour and minute, wrapping past midnight (`25:10` is `01:10`).
    pub const fn new(hour: u32, minute: u32) -> Self {
        Self(((hour * 60 + minute) % MINUTES_PER_DAY as u32) as u16)
    }

    pub const fn from_minutes(minutes: u16) -> Self {
        Self(minutes % MINUTES_PER_DAY)
    }

    /// Parse a strict `HH:MM` string.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidClockTime(s.to_string());
        let (h, m) = s.trim().split_once(':').ok_or_else(invalid)?;
        if h.is_empty() || h.len() > 2 || m.len() != 2 {
            return Err(invalid());
        }
        let hour: u32 = h.parse().map_err(|_| invalid())?;
        let minute: u32 = m.parse().map_err(|_| invalid())?;
        if hour > 23 || minute > 59 {
            return Err(invalid());
        }
        Ok(Self::new(hour, minute))
    }

    pub fn hour(self) -> u32 {
        u32::from(self.0 / 60)
    }

    pub fn minute(self) -> u32 {
        u32::from(self.0 % 60)
    }

    /// Minutes since midnight.
    pub fn minutes(self) -> u16 {
        self.0
    }

    /// Add (or subtract) minutes with day wraparound.
    pub fn add_minutes(self, delta: i32) -> Self {
        let day = i32::from(MINUTES_PER_DAY);
        Self((i32::from(self.0) + delta).rem_euclid(day) as u16)
    }

    /// Signed difference `other - self` within the same day.
    pub fn minutes_until(self, other: ClockTime) -> i32 {
        i32::from(other.0) - i32::from(self.0)
    }

    /// Forward distance to `other`, crossing midnight when `other` is earlier.
    pub fn wrapping_minutes_until(self, other: ClockTime) -> u16 {
        (other.0 + MINUTES_PER_DAY - self.0) % MINUTES_PER_DAY
    }

    pub fn to_naive_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour(), self.minute(), 0).unwrap_or(NaiveTime::MIN)
    }

    /// Anchor this clock time on a calendar date.
    pub fn on(self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.to_naive_time())
    }
}

impl From<NaiveTime> for ClockTime {
    fn from(t: NaiveTime) -> Self {
        use chrono::Timelike;
        Self::new(t.hour(), t.minute())
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl TryFrom<String> for ClockTime {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ClockTime> for String {
    fn from(t: ClockTime) -> Self {
        t.to_string()
    }
}

impl std::str::FromStr for ClockTime {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
