//! Time-of-day values and the fixed half-hour grid the day is rendered on.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::errors::{GdayError, Result};

/// Width of one schedule block ("pomodoro") in minutes.
pub const BLOCK_MINUTES: u16 = 30;
/// Minutes in a civil day.
pub const MINUTES_PER_DAY: u16 = 24 * 60;
/// Number of blocks the day is partitioned into.
pub const BLOCKS_PER_DAY: u16 = MINUTES_PER_DAY / BLOCK_MINUTES;

// `10:15am`, `10am`, `10:15 p.m.`, `14:30`, and the compact `1015` / `930`.
static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d{1,2})(?::?(\d{2}))?\s*(?:([ap])\.?\s*m?\.?)?$")
        .expect("time-of-day pattern is a valid regex")
});

/// A wall-clock time with minute precision, stored as minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime {
    minutes: u16,
}

impl ClockTime {
    /// Midnight (12:00am).
    pub const MIDNIGHT: Self = Self { minutes: 0 };

    /// Build from a 24-hour `hour` and `minute`.
    pub fn new(hour: u8, minute: u8) -> Result<Self> {
        if hour > 23 {
            return Err(GdayError::InvalidTime {
                input: format!("{hour}:{minute:02}"),
                reason: "hour must be in 0..=23",
            });
        }
        if minute > 59 {
            return Err(GdayError::InvalidTime {
                input: format!("{hour}:{minute:02}"),
                reason: "minute must be in 0..=59",
            });
        }
        Ok(Self {
            minutes: u16::from(hour) * 60 + u16::from(minute),
        })
    }

    /// Build from minutes since midnight; `None` past the end of the day.
    #[must_use]
    pub const fn from_minutes(minutes: u16) -> Option<Self> {
        if minutes < MINUTES_PER_DAY {
            Some(Self { minutes })
        } else {
            None
        }
    }

    /// Parse a user or agenda supplied time of day.
    ///
    /// Accepts 12-hour forms (`10:15am`, `10am`, `12:30 PM`, `9:05 a.m.`) and
    /// 24-hour forms (`14:30`, `1015`). A bare hour without a meridiem is rejected
    /// because it is ambiguous.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let invalid = |reason| GdayError::InvalidTime {
            input: input.to_string(),
            reason,
        };

        let caps = TIME_RE
            .captures(trimmed)
            .ok_or_else(|| invalid("expected h:mm[am|pm] or HH:MM"))?;

        let hour: u8 = caps[1]
            .parse()
            .map_err(|_| invalid("hour is not a number"))?;
        let minute: u8 = match caps.get(2) {
            Some(m) => m
                .as_str()
                .parse()
                .map_err(|_| invalid("minute is not a number"))?,
            None => 0,
        };
        if minute > 59 {
            return Err(invalid("minute must be in 0..=59"));
        }

        let hour = match caps.get(3).map(|m| m.as_str().to_ascii_lowercase()) {
            Some(meridiem) => {
                if !(1..=12).contains(&hour) {
                    return Err(invalid("12-hour clock hour must be in 1..=12"));
                }
                match (meridiem.as_str(), hour) {
                    ("a", 12) => 0,
                    ("a", h) => h,
                    (_, 12) => 12,
                    (_, h) => h + 12,
                }
            }
            None => {
                if caps.get(2).is_none() {
                    return Err(invalid("bare hour needs minutes or am/pm"));
                }
                if hour > 23 {
                    return Err(invalid("hour must be in 0..=23"));
                }
                hour
            }
        };

        Self::new(hour, minute).map_err(|_| invalid("out of range"))
    }

    /// Hour on the 24-hour clock.
    #[must_use]
    pub const fn hour(self) -> u8 {
        (self.minutes / 60) as u8
    }

    /// Minute within the hour.
    #[must_use]
    pub const fn minute(self) -> u8 {
        (self.minutes % 60) as u8
    }

    /// Minutes since midnight.
    #[must_use]
    pub const fn minutes_since_midnight(self) -> u16 {
        self.minutes
    }

    /// True when the time sits exactly on a block boundary (:00 or :30).
    #[must_use]
    pub const fn is_on_boundary(self) -> bool {
        self.minutes % BLOCK_MINUTES == 0
    }

    /// Round down to the enclosing block boundary.
    #[must_use]
    pub const fn floor_to_boundary(self) -> Self {
        Self {
            minutes: self.minutes - self.minutes % BLOCK_MINUTES,
        }
    }

    /// The block this time falls into.
    #[must_use]
    pub const fn block(self) -> TimeBlock {
        TimeBlock {
            index: (self.minutes / BLOCK_MINUTES) as u8,
        }
    }

    /// True for 12:00pm onwards.
    #[must_use]
    pub const fn is_pm(self) -> bool {
        self.hour() >= 12
    }

    /// Hour on the 12-hour dial, 1..=12.
    #[must_use]
    pub const fn hour12(self) -> u8 {
        match self.hour() % 12 {
            0 => 12,
            h => h,
        }
    }

    /// Compact 12-hour label, e.g. `10:15am`, `12:00pm`.
    #[must_use]
    pub fn label(self) -> String {
        let suffix = if self.is_pm() { "pm" } else { "am" };
        format!("{}:{:02}{suffix}", self.hour12(), self.minute())
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl FromStr for ClockTime {
    type Err = GdayError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = GdayError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.label()
    }
}

/// One fixed 30-minute slot of the day, identified by its position in the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "String")]
pub struct TimeBlock {
    index: u8,
}

impl TimeBlock {
    /// Block at position `index` (0 is 12:00am); `None` past the end of the day.
    #[must_use]
    pub fn from_index(index: u16) -> Option<Self> {
        if index < BLOCKS_PER_DAY {
            u8::try_from(index).ok().map(|index| Self { index })
        } else {
            None
        }
    }

    /// Position within the day.
    #[must_use]
    pub const fn index(self) -> u16 {
        self.index as u16
    }

    /// Boundary time the block starts at.
    #[must_use]
    pub const fn start(self) -> ClockTime {
        ClockTime {
            minutes: self.index as u16 * BLOCK_MINUTES,
        }
    }

    /// The block `offset` slots later, if it is still within the day.
    #[must_use]
    pub fn offset(self, offset: u16) -> Option<Self> {
        Self::from_index(self.index().checked_add(offset)?)
    }

    /// The full partition of a day, in order.
    pub fn day() -> impl Iterator<Item = Self> {
        (0..BLOCKS_PER_DAY).filter_map(Self::from_index)
    }
}

impl fmt::Display for TimeBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.start(), f)
    }
}

impl From<TimeBlock> for String {
    fn from(value: TimeBlock) -> Self {
        value.start().label()
    }
}
