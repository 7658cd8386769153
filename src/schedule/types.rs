use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Smallest time unit in minutes; every boundary and duration is a multiple of it
pub const GRANULARITY: u32 = 10;

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Working day of the weekly calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Weekday {
    pub const ALL: [Weekday; 5] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Weekday::Monday => "MONDAY",
            Weekday::Tuesday => "TUESDAY",
            Weekday::Wednesday => "WEDNESDAY",
            Weekday::Thursday => "THURSDAY",
            Weekday::Friday => "FRIDAY",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Weekday {
    type Err = Error;

    /// Accepts English and French day names, case-insensitive
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "monday" | "lundi" => Ok(Weekday::Monday),
            "tuesday" | "mardi" => Ok(Weekday::Tuesday),
            "wednesday" | "mercredi" => Ok(Weekday::Wednesday),
            "thursday" | "jeudi" => Ok(Weekday::Thursday),
            "friday" | "vendredi" => Ok(Weekday::Friday),
            other => Err(Error::config(format!("invalid day '{}'", other))),
        }
    }
}

/// Wall-clock time within a day, stored as minutes past midnight
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub fn new(hour: u32, minute: u32) -> Result<Self> {
        if hour >= 24 {
            return Err(Error::config(format!("hour needs to be in range 0-23, but is {}", hour)));
        }
        if minute >= 60 {
            return Err(Error::config(format!("minute needs to be in range 0-59, but is {}", minute)));
        }
        Ok(TimeOfDay((hour * 60 + minute) as u16))
    }

    pub fn from_minutes(minutes: u32) -> Option<Self> {
        (minutes < MINUTES_PER_DAY).then_some(TimeOfDay(minutes as u16))
    }

    pub fn hour(self) -> u32 {
        self.minutes() / 60
    }

    pub fn minute(self) -> u32 {
        self.minutes() % 60
    }

    pub fn minutes(self) -> u32 {
        u32::from(self.0)
    }

    /// Adds a minute offset with hour carry; `None` once the day is left
    pub fn checked_add(self, minutes: u32) -> Option<Self> {
        self.minutes()
            .checked_add(minutes)
            .and_then(Self::from_minutes)
    }

    pub fn is_aligned(self, step: u32) -> bool {
        self.minutes() % step == 0
    }

    /// Rounds up to the next multiple of `step` minutes
    pub fn round_up(self, step: u32) -> Option<Self> {
        let rem = self.minutes() % step;
        if rem == 0 {
            Some(self)
        } else {
            self.checked_add(step - rem)
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = Error;

    /// Parses `HH:MM`, also accepting the `14h00` form of older printouts
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (hours, minutes) = s
            .split_once(':')
            .or_else(|| s.split_once('h'))
            .ok_or_else(|| Error::config(format!("invalid time '{}'", s)))?;
        let hour = hours
            .trim()
            .parse()
            .map_err(|_| Error::config(format!("invalid hour in '{}'", s)))?;
        let minute = minutes
            .trim()
            .parse()
            .map_err(|_| Error::config(format!("invalid minute in '{}'", s)))?;
        TimeOfDay::new(hour, minute)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(time: TimeOfDay) -> Self {
        time.to_string()
    }
}

/// One declared availability of a student: start inclusive, end exclusive or open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    pub day: Weekday,
    pub start: TimeOfDay,
    pub end: Option<TimeOfDay>,
}

impl AvailabilityWindow {
    pub fn new(day: Weekday, start: TimeOfDay, end: Option<TimeOfDay>) -> Self {
        Self { day, start, end }
    }

    pub fn at(day: Weekday, start: TimeOfDay) -> Self {
        Self::new(day, start, None)
    }
}

/// A student with a fixed lesson duration and ordered availability windows.
///
/// Window order is significant: the first window has priority rank 1, the
/// second rank 2 and so on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Student {
    name: String,
    lesson_duration: u32,
    windows: Vec<AvailabilityWindow>,
}

impl Student {
    pub fn new(
        name: impl Into<String>,
        lesson_duration: u32,
        windows: Vec<AvailabilityWindow>,
    ) -> Result<Self> {
        let name = name.into();
        if lesson_duration == 0 || lesson_duration % GRANULARITY != 0 {
            return Err(Error::config(format!(
                "lesson duration of {} must be a positive multiple of {} minutes, but is {}",
                name, GRANULARITY, lesson_duration
            )));
        }

        for window in &windows {
            let end_aligned = window.end.map_or(true, |end| end.is_aligned(GRANULARITY));
            if !window.start.is_aligned(GRANULARITY) || !end_aligned {
                return Err(Error::config(format!(
                    "availability of {} on {} at {} is not aligned to {} minutes",
                    name, window.day, window.start, GRANULARITY
                )));
            }
        }

        Ok(Self { name, lesson_duration, windows })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lesson duration in minutes
    pub fn lesson_duration(&self) -> u32 {
        self.lesson_duration
    }

    pub fn windows(&self) -> &[AvailabilityWindow] {
        &self.windows
    }
}

/// The value recorded in an occupied slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Occupant {
    /// Roster index of the student inside its plan
    pub student: usize,
    /// 1-based rank of the availability window the slot came from
    pub priority: u32,
}

impl Occupant {
    pub fn new(student: usize, priority: u32) -> Self {
        Self { student, priority }
    }
}
