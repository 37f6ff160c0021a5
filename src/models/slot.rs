use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Wall-clock slot label, always rendered as zero-padded `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeSlot(NaiveTime);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid slot label '{0}', expected HH:MM")]
pub struct InvalidTimeSlot(pub String);

impl TimeSlot {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    /// Slot starting `minutes` after midnight; `None` past 23:59.
    pub fn from_minutes(minutes: u32) -> Option<Self> {
        NaiveTime::from_num_seconds_from_midnight_opt(minutes.checked_mul(60)?, 0).map(Self)
    }

    /// Minutes since midnight.
    pub fn minutes_of_day(&self) -> u32 {
        self.0.hour() * 60 + self.0.minute()
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0.hour(), self.0.minute())
    }
}

impl FromStr for TimeSlot {
    type Err = InvalidTimeSlot;

    /// Strict parse: exactly two digits, a colon, two digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        let well_formed = bytes.len() == 5
            && bytes[2] == b':'
            && bytes[..2].iter().all(u8::is_ascii_digit)
            && bytes[3..].iter().all(u8::is_ascii_digit);
        if !well_formed {
            return Err(InvalidTimeSlot(s.to_string()));
        }

        let hour: u32 = s[..2].parse().map_err(|_| InvalidTimeSlot(s.to_string()))?;
        let minute: u32 = s[3..].parse().map_err(|_| InvalidTimeSlot(s.to_string()))?;
        Self::new(hour, minute).ok_or_else(|| InvalidTimeSlot(s.to_string()))
    }
}

impl TryFrom<String> for TimeSlot {
    type Error = InvalidTimeSlot;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeSlot> for String {
    fn from(slot: TimeSlot) -> Self {
        slot.to_string()
    }
}
