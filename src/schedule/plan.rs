use log::info;

use crate::config::{OpenHours, SearchConfig};
use crate::error::{Error, Result};
use super::backtrack::BacktrackingScheduler;
use super::grid::TimeGrid;
use super::result::{lessons, Lesson, Outcome, ScheduleReport};
use super::types::{Occupant, Student, TimeOfDay, Weekday, GRANULARITY};

/// A roster of students and the weekly grid they are planned into
#[derive(Debug, Clone, Default)]
pub struct Plan {
    grid: TimeGrid,
    students: Vec<Student>,
}

impl Plan {
    /// Creates a plan whose grid is seeded with every open range
    pub fn new(open_hours: &OpenHours) -> Result<Self> {
        let mut plan = Self::default();
        for range in &open_hours.ranges {
            plan.seed_open(range.day, range.start, range.end)?;
        }
        Ok(plan)
    }

    pub fn seed_open(&mut self, day: Weekday, start: TimeOfDay, end: TimeOfDay) -> Result<()> {
        self.grid.seed_open(day, start, end)
    }

    /// Appends a student; roster order is the search order
    pub fn add_student(&mut self, student: Student) -> Result<()> {
        if self.position(student.name()).is_some() {
            return Err(Error::config(format!("student {} is listed twice", student.name())));
        }
        self.students.push(student);
        Ok(())
    }

    /// Searches for the first assignment in roster and anchor order.
    ///
    /// An infeasible roster is a normal outcome, not an error; the grid is
    /// then back to its empty pre-search state.
    pub fn schedule(&mut self, config: SearchConfig) -> Result<ScheduleReport> {
        config.validate()?;
        if !self.grid.is_empty() {
            return Err(Error::config("grid already holds lessons, cannot schedule again"));
        }

        info!(
            "scheduling {} students into {} open slots (range attempts {}, increment {}min)",
            self.students.len(),
            self.grid.slot_count(),
            config.range_attempts,
            config.range_increment
        );
        let (found, stats) = BacktrackingScheduler::new(&self.students, config).run(&mut self.grid);
        let outcome = if found { Outcome::Scheduled } else { Outcome::Infeasible };

        info!(
            "{:?} after {} attempts, {} placements, {} backtracks, depth {}",
            outcome, stats.attempts, stats.placements, stats.backtracks, stats.max_depth
        );
        Ok(ScheduleReport { outcome, stats })
    }

    /// Places a known student directly, bypassing the search.
    ///
    /// Used to rebuild a grid from a printed schedule. A duration or start
    /// off the granularity is a configuration error, a taken or missing
    /// slot is `Ok(false)`.
    pub fn try_occupy(
        &mut self,
        day: Weekday,
        start: TimeOfDay,
        duration: u32,
        student_name: &str,
        priority: u32,
    ) -> Result<bool> {
        let index = self
            .position(student_name)
            .ok_or_else(|| Error::config(format!("unknown student {}", student_name)))?;
        if duration == 0 || duration % GRANULARITY != 0 {
            return Err(Error::config(format!(
                "lesson of {} lasts {} minutes, not a positive multiple of {}",
                student_name, duration, GRANULARITY
            )));
        }
        if !start.is_aligned(GRANULARITY) {
            return Err(Error::config(format!(
                "lesson of {} starts at {}, not aligned to {} minutes",
                student_name, start, GRANULARITY
            )));
        }
        Ok(self.grid.try_occupy(day, start, duration, Occupant::new(index, priority)))
    }

    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn student(&self, occupant: Occupant) -> Option<&Student> {
        self.students.get(occupant.student)
    }

    pub fn lessons(&self) -> Vec<Lesson> {
        lessons(&self.grid)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.students.iter().position(|s| s.name() == name)
    }
}
