use std::path::Path;

use figment::{
    providers::{Env, Format, Json, Serialized},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::schedule::{TimeOfDay, Weekday, GRANULARITY};

/// Parameters of the candidate expansion used by the search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Extra anchors tried inside a bounded availability window
    pub range_attempts: u32,
    /// Step between anchors in minutes
    pub range_increment: u32,
}

impl SearchConfig {
    pub fn new(range_attempts: u32, range_increment: u32) -> Self {
        Self { range_attempts, range_increment }
    }

    pub fn validate(&self) -> Result<()> {
        if self.range_increment == 0 || self.range_increment % GRANULARITY != 0 {
            return Err(Error::config(format!(
                "range increment must be a positive multiple of {} minutes, but is {}",
                GRANULARITY, self.range_increment
            )));
        }
        Ok(())
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { range_attempts: 1, range_increment: GRANULARITY }
    }
}

/// A contiguous block in which lessons may be placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenRange {
    pub day: Weekday,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl OpenRange {
    pub fn new(day: Weekday, start: TimeOfDay, end: TimeOfDay) -> Self {
        Self { day, start, end }
    }
}

/// Weekly opening hours handed to the grid at construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenHours {
    pub ranges: Vec<OpenRange>,
}

impl OpenHours {
    pub fn new(ranges: Vec<OpenRange>) -> Self {
        Self { ranges }
    }
}

impl Default for OpenHours {
    fn default() -> Self {
        // (day, from, to) in whole minutes past midnight
        const WEEK: [(Weekday, u32, u32); 7] = [
            (Weekday::Monday, 14 * 60, 21 * 60),
            (Weekday::Wednesday, 9 * 60, 12 * 60 + 30),
            (Weekday::Wednesday, 13 * 60 + 30, 15 * 60),
            (Weekday::Wednesday, 16 * 60 + 50, 21 * 60),
            (Weekday::Thursday, 16 * 60, 21 * 60),
            (Weekday::Friday, 13 * 60, 18 * 60 + 30),
            (Weekday::Friday, 19 * 60 + 30, 21 * 60),
        ];

        let ranges = WEEK
            .iter()
            .filter_map(|&(day, from, to)| {
                Some(OpenRange::new(day, TimeOfDay::from_minutes(from)?, TimeOfDay::from_minutes(to)?))
            })
            .collect();
        Self { ranges }
    }
}

/// Everything the planner reads before a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub open_hours: OpenHours,
    pub search: SearchConfig,
}

impl Default for Settings {
    fn default() -> Self {
        // the command line tool steps through ranges in 20 minute increments
        Self {
            open_hours: OpenHours::default(),
            search: SearchConfig::new(1, GRANULARITY * 2),
        }
    }
}

impl Settings {
    /// Built-in defaults, overridden by an optional JSON file, then by
    /// `PLANNER_` environment variables (`PLANNER_SEARCH__RANGE_ATTEMPTS=3`).
    pub fn load(json_path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));
        if let Some(path) = json_path {
            if !path.exists() {
                return Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("settings file {} does not exist", path.display()),
                )));
            }
            figment = figment.merge(Json::file(path));
        }
        let settings: Settings = figment
            .merge(Env::prefixed("PLANNER_").split("__"))
            .extract()?;
        settings.search.validate()?;
        Ok(settings)
    }
}
