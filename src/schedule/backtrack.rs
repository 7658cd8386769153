use log::debug;
use serde::Serialize;

use crate::config::SearchConfig;
use super::availability::anchors;
use super::grid::TimeGrid;
use super::types::{Occupant, Student};

/// Counters collected during one search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    /// Anchors handed to `try_occupy`
    pub attempts: u64,
    /// Anchors that were free and got occupied
    pub placements: u64,
    /// Placements undone because a later student could not be placed
    pub backtracks: u64,
    /// Deepest roster position reached
    pub max_depth: usize,
}

/// Depth-first search placing students one at a time in roster order.
///
/// Each recursion level owns a single decision: which anchor the current
/// student gets. A placement is released again when no completion exists
/// for the students after it, so a failed search leaves the grid exactly
/// as it found it.
pub struct BacktrackingScheduler<'a> {
    students: &'a [Student],
    config: SearchConfig,
    stats: SearchStats,
}

impl<'a> BacktrackingScheduler<'a> {
    pub fn new(students: &'a [Student], config: SearchConfig) -> Self {
        Self { students, config, stats: SearchStats::default() }
    }

    /// Runs the search on a seeded grid; occupants refer to roster indices.
    pub fn run(mut self, grid: &mut TimeGrid) -> (bool, SearchStats) {
        let found = self.place(grid, 0);
        (found, self.stats)
    }

    fn place(&mut self, grid: &mut TimeGrid, index: usize) -> bool {
        let students = self.students;
        let Some(student) = students.get(index) else {
            return true;
        };
        self.stats.max_depth = self.stats.max_depth.max(index + 1);

        let duration = student.lesson_duration();
        for anchor in anchors(student, self.config) {
            self.stats.attempts += 1;
            let occupant = Occupant::new(index, anchor.priority);
            if !grid.try_occupy(anchor.day, anchor.time, duration, occupant) {
                continue;
            }
            self.stats.placements += 1;
            debug!(
                "trying {} on {} at {} for {}min (priority {})",
                student.name(),
                anchor.day,
                anchor.time,
                duration,
                anchor.priority
            );

            if self.place(grid, index + 1) {
                return true;
            }

            // nobody after us fits with this choice, rewind and try the next anchor
            debug!("backtrack {}", student.name());
            self.stats.backtracks += 1;
            grid.release(anchor.day, anchor.time, duration);
        }

        debug!("no options left for {}", student.name());
        false
    }
}
