//! Clock-time primitives: time of day, sub-ranges, and bookable intervals.
//!
//! Times are kept at minute resolution with `24:00` as a valid end-of-day
//! value distinct from `00:00`. A rule that closes at midnight ends at `24:00`
//! of its own day; `00:00` always means the start of a day.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{AvailabilityError, Result};

/// Number of minutes in a calendar day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// A clock time between `00:00` and `24:00` inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    /// Start of the day, `00:00`.
    pub const MIDNIGHT: Self = Self(0);
    /// Last addressable minute of the day, `23:59`.
    pub const LAST_MINUTE: Self = Self(MINUTES_PER_DAY as u16 - 1);
    /// End-of-day sentinel, `24:00`.
    pub const END_OF_DAY: Self = Self(MINUTES_PER_DAY as u16);

    /// Build a time from hour and minute. `24:00` is accepted, `24:01` is not.
    pub fn from_hm(hour: u32, minute: u32) -> Result<Self> {
        if minute > 59 || hour > 24 || (hour == 24 && minute != 0) {
            return Err(AvailabilityError::InvalidTime(format!(
                "{:02}:{:02}",
                hour, minute
            )));
        }
        Ok(Self((hour * 60 + minute) as u16))
    }

    /// Build a time from minutes since midnight (`0..=1440`).
    pub fn from_minutes(minutes: u32) -> Option<Self> {
        (minutes <= MINUTES_PER_DAY).then_some(Self(minutes as u16))
    }

    pub fn minutes(self) -> u32 {
        u32::from(self.0)
    }

    pub fn hour(self) -> u32 {
        self.minutes() / 60
    }

    pub fn minute(self) -> u32 {
        self.minutes() % 60
    }

    pub fn is_midnight(self) -> bool {
        self == Self::MIDNIGHT
    }

    pub fn is_end_of_day(self) -> bool {
        self == Self::END_OF_DAY
    }

    /// Add a duration, wrapping past the end of the day.
    ///
    /// A sum that lands exactly on a day boundary (other than a zero sum)
    /// yields `24:00`, so `23:00 + 60` is `24:00` rather than `00:00`.
    pub fn add_minutes(self, minutes: u32) -> Self {
        let total = self.minutes() + minutes;
        if total == 0 {
            return Self::MIDNIGHT;
        }
        match total % MINUTES_PER_DAY {
            0 => Self::END_OF_DAY,
            rem => Self(rem as u16),
        }
    }

    /// Subtract a duration, wrapping back over the start of the day.
    ///
    /// `24:00 - 30` is `23:30`; `00:15 - 30` is `23:45`.
    pub fn sub_minutes(self, minutes: u32) -> Self {
        if minutes == 0 {
            return self;
        }
        let shifted =
            (i64::from(self.0) - i64::from(minutes)).rem_euclid(i64::from(MINUTES_PER_DAY));
        Self(shifted as u16)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = AvailabilityError;

    /// Parse `H:MM` or `HH:MM` (24-hour). A trailing `:SS` is accepted and
    /// ignored.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || AvailabilityError::InvalidTime(s.to_string());
        let digits = |part: &str, min: usize, max: usize| {
            (min..=max).contains(&part.len()) && part.bytes().all(|b| b.is_ascii_digit())
        };

        let mut parts = s.trim().split(':');
        let (Some(hour), Some(minute)) = (parts.next(), parts.next()) else {
            return Err(invalid());
        };
        if let Some(second) = parts.next() {
            if !digits(second, 2, 2) {
                return Err(invalid());
            }
        }
        if parts.next().is_some() || !digits(hour, 1, 2) || !digits(minute, 2, 2) {
            return Err(invalid());
        }

        let hour: u32 = hour.parse().map_err(|_| invalid())?;
        let minute: u32 = minute.parse().map_err(|_| invalid())?;
        Self::from_hm(hour, minute).map_err(|_| invalid())
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = AvailabilityError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

impl From<NaiveTime> for TimeOfDay {
    /// Truncates to the minute.
    fn from(value: NaiveTime) -> Self {
        Self((value.hour() * 60 + value.minute()) as u16)
    }
}

/// One `(from, to)` opening window of a rule on a given weekday.
///
/// Bounds are inclusive. Ranges never cross midnight: a window that closes at
/// midnight ends at `24:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: TimeOfDay,
    pub to: TimeOfDay,
}

impl TimeRange {
    pub fn new(from: TimeOfDay, to: TimeOfDay) -> Self {
        Self { from, to }
    }

    /// The same range with an end of `00:00` read as `24:00`.
    pub fn normalized(self) -> Self {
        if self.to.is_midnight() {
            Self::new(self.from, TimeOfDay::END_OF_DAY)
        } else {
            self
        }
    }

    /// Whether `time` falls inside the range, bounds included.
    pub fn contains(&self, time: TimeOfDay) -> bool {
        self.from <= time && time <= self.to
    }

    /// Whether the whole of `interval` lies inside this range.
    pub fn contains_interval(&self, interval: &TimeInterval) -> bool {
        self.contains(interval.from) && self.contains(interval.to)
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

/// A requested booking interval starting on a single calendar day.
///
/// An overnight interval ends on the following day. It reaches no further
/// than that: `to` is always on the starting day or the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeInterval {
    from: TimeOfDay,
    to: TimeOfDay,
    overnight: bool,
}

impl TimeInterval {
    /// An interval between two clock times. It is overnight when `from > to`.
    pub fn new(from: TimeOfDay, to: TimeOfDay) -> Self {
        Self {
            from,
            to,
            overnight: from > to,
        }
    }

    /// The interval `[start, start + duration_minutes]`.
    ///
    /// Returns `None` when the end falls after `24:00` of the following day,
    /// since such a booking cannot be split into a same-day part and one
    /// overnight continuation.
    pub fn starting_at(start: TimeOfDay, duration_minutes: u32) -> Option<Self> {
        let end = start.minutes().checked_add(duration_minutes)?;
        if end > 2 * MINUTES_PER_DAY {
            return None;
        }
        Some(Self {
            from: start,
            to: start.add_minutes(duration_minutes),
            overnight: end > MINUTES_PER_DAY,
        })
    }

    pub fn from(&self) -> TimeOfDay {
        self.from
    }

    pub fn to(&self) -> TimeOfDay {
        self.to
    }

    pub fn is_overnight(&self) -> bool {
        self.overnight
    }

    /// Split an overnight interval at midnight.
    ///
    /// Returns the part on the starting day (`[from, 23:59]`) and the part on
    /// the following day (`[00:00, to]`). The first part is `None` when the
    /// interval starts at `24:00`, since nothing of it remains on that day.
    /// Returns `None` for same-day intervals.
    pub fn split_at_midnight(&self) -> Option<(Option<TimeInterval>, TimeInterval)> {
        if !self.is_overnight() {
            return None;
        }
        let head = (!self.from.is_end_of_day())
            .then(|| TimeInterval::new(self.from, TimeOfDay::LAST_MINUTE));
        let tail = TimeInterval::new(TimeOfDay::MIDNIGHT, self.to);
        Some((head, tail))
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.from, self.to)
    }
}
