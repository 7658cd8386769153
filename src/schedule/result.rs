use serde::Serialize;

use super::backtrack::SearchStats;
use super::grid::TimeGrid;
use super::types::{Occupant, TimeOfDay, Weekday, GRANULARITY};

/// How a scheduling run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Every student holds a lesson; the grid is the assignment
    Scheduled,
    /// The search ran out of candidates; the grid is back to empty
    Infeasible,
}

impl Outcome {
    pub fn is_scheduled(self) -> bool {
        self == Outcome::Scheduled
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScheduleReport {
    pub outcome: Outcome,
    pub stats: SearchStats,
}

/// One placed lesson, folded from a contiguous run of slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lesson {
    pub day: Weekday,
    pub start: TimeOfDay,
    /// Exclusive
    pub end: TimeOfDay,
    pub occupant: Occupant,
}

impl Lesson {
    pub fn duration(&self) -> u32 {
        self.end.minutes() - self.start.minutes()
    }
}

/// Folds the occupied slots of a grid into lessons ordered by (day, start).
///
/// Adjacent slots belong to the same lesson when they share the occupant and
/// follow each other without a gap.
pub fn lessons(grid: &TimeGrid) -> Vec<Lesson> {
    let mut lessons: Vec<Lesson> = Vec::new();

    for (day, time, occupant) in grid.occupied() {
        // seeded keys end at 23:40 at the latest, so the slot end always exists
        let Some(slot_end) = time.checked_add(GRANULARITY) else {
            continue;
        };
        match lessons.last_mut() {
            Some(last) if last.day == day && last.end == time && last.occupant == occupant => {
                last.end = slot_end;
            }
            _ => lessons.push(Lesson { day, start: time, end: slot_end, occupant }),
        }
    }

    lessons
}
