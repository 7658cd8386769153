use std::collections::BTreeMap;

use crate::error::{Error, Result};
use super::types::{Occupant, TimeOfDay, Weekday, GRANULARITY};

/// Register of every open slot of the week and who currently holds it.
///
/// The key set is fixed by the seeding calls; a slot that was never seeded
/// does not exist and can never be occupied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeGrid {
    slots: BTreeMap<(Weekday, TimeOfDay), Option<Occupant>>,
}

impl TimeGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every slot in [start, end) as open and empty.
    ///
    /// Overlapping ranges are redundant; an existing occupant is kept.
    pub fn seed_open(&mut self, day: Weekday, start: TimeOfDay, end: TimeOfDay) -> Result<()> {
        if !start.is_aligned(GRANULARITY) || !end.is_aligned(GRANULARITY) {
            return Err(Error::config(format!(
                "open range {} {}-{} is not aligned to {} minutes",
                day, start, end, GRANULARITY
            )));
        }
        if start >= end {
            return Err(Error::config(format!(
                "open range {} {}-{} must start before it ends",
                day, start, end
            )));
        }

        let mut time = Some(start);
        while let Some(t) = time.filter(|t| *t < end) {
            self.slots.entry((day, t)).or_insert(None);
            time = t.checked_add(GRANULARITY);
        }
        Ok(())
    }

    /// Occupies every slot of [start, start + duration) or none of them.
    ///
    /// Returns false when any slot of the run is missing or already taken.
    pub fn try_occupy(
        &mut self,
        day: Weekday,
        start: TimeOfDay,
        duration: u32,
        occupant: Occupant,
    ) -> bool {
        debug_assert!(duration % GRANULARITY == 0, "duration {} is not aligned", duration);
        if duration == 0 {
            return false;
        }

        let Some(run) = run_of(start, duration) else {
            return false;
        };
        let all_free = run
            .iter()
            .all(|time| matches!(self.slots.get(&(day, *time)), Some(None)));
        if !all_free {
            return false;
        }

        for time in run {
            self.slots.insert((day, time), Some(occupant));
        }
        true
    }

    /// Empties the slots of a run previously taken by `try_occupy`.
    pub fn release(&mut self, day: Weekday, start: TimeOfDay, duration: u32) {
        debug_assert!(duration % GRANULARITY == 0, "duration {} is not aligned", duration);

        let Some(run) = run_of(start, duration) else {
            return;
        };
        for time in run {
            if let Some(slot) = self.slots.get_mut(&(day, time)) {
                *slot = None;
            }
        }
    }

    pub fn contains(&self, day: Weekday, time: TimeOfDay) -> bool {
        self.slots.contains_key(&(day, time))
    }

    pub fn occupant(&self, day: Weekday, time: TimeOfDay) -> Option<Occupant> {
        self.slots.get(&(day, time)).copied().flatten()
    }

    /// All slots in (day, time) order
    pub fn iter(&self) -> impl Iterator<Item = (Weekday, TimeOfDay, Option<Occupant>)> + '_ {
        self.slots
            .iter()
            .map(|(&(day, time), occupant)| (day, time, *occupant))
    }

    pub fn occupied(&self) -> impl Iterator<Item = (Weekday, TimeOfDay, Occupant)> + '_ {
        self.iter()
            .filter_map(|(day, time, occupant)| occupant.map(|o| (day, time, o)))
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn occupied_count(&self) -> usize {
        self.slots.values().filter(|o| o.is_some()).count()
    }

    /// True when no slot is occupied
    pub fn is_empty(&self) -> bool {
        self.slots.values().all(Option::is_none)
    }
}

/// Slot keys covered by a lesson, `None` if the run leaves the day
fn run_of(start: TimeOfDay, duration: u32) -> Option<Vec<TimeOfDay>> {
    (0..duration / GRANULARITY)
        .map(|i| start.checked_add(i * GRANULARITY))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(hour: u32, minute: u32) -> TimeOfDay {
        TimeOfDay::new(hour, minute).unwrap()
    }

    fn grid() -> TimeGrid {
        let mut grid = TimeGrid::new();
        grid.seed_open(Weekday::Monday, t(14, 0), t(15, 0)).unwrap();
        grid
    }

    #[test]
    fn test_seed_registers_half_open_range() {
        let grid = grid();
        assert_eq!(grid.slot_count(), 6);
        assert!(grid.contains(Weekday::Monday, t(14, 0)));
        assert!(grid.contains(Weekday::Monday, t(14, 50)));
        assert!(!grid.contains(Weekday::Monday, t(15, 0)));
        assert!(!grid.contains(Weekday::Tuesday, t(14, 0)));
        assert!(grid.is_empty());
    }

    #[test]
    fn test_seed_rejects_malformed_ranges() {
        let mut grid = TimeGrid::new();
        assert!(grid.seed_open(Weekday::Monday, t(14, 5), t(15, 0)).is_err());
        assert!(grid.seed_open(Weekday::Monday, t(15, 0), t(15, 0)).is_err());
        assert!(grid.seed_open(Weekday::Monday, t(16, 0), t(15, 0)).is_err());
        assert_eq!(grid.slot_count(), 0);
    }

    #[test]
    fn test_seed_overlap_keeps_occupant() {
        let mut grid = grid();
        assert!(grid.try_occupy(Weekday::Monday, t(14, 0), 20, Occupant::new(0, 1)));
        grid.seed_open(Weekday::Monday, t(13, 30), t(14, 30)).unwrap();
        assert_eq!(grid.slot_count(), 9);
        assert_eq!(grid.occupant(Weekday::Monday, t(14, 10)), Some(Occupant::new(0, 1)));
    }

    #[test]
    fn test_occupy_covers_exact_run() {
        let mut grid = grid();
        let occupant = Occupant::new(3, 2);
        assert!(grid.try_occupy(Weekday::Monday, t(14, 10), 30, occupant));
        assert_eq!(grid.occupant(Weekday::Monday, t(14, 0)), None);
        assert_eq!(grid.occupant(Weekday::Monday, t(14, 10)), Some(occupant));
        assert_eq!(grid.occupant(Weekday::Monday, t(14, 30)), Some(occupant));
        assert_eq!(grid.occupant(Weekday::Monday, t(14, 40)), None);
        assert_eq!(grid.occupied_count(), 3);
    }

    #[test]
    fn test_occupy_is_all_or_nothing() {
        let mut grid = grid();
        assert!(grid.try_occupy(Weekday::Monday, t(14, 30), 10, Occupant::new(0, 1)));
        let before = grid.clone();

        // overlaps the taken slot at 14:30
        assert!(!grid.try_occupy(Weekday::Monday, t(14, 0), 40, Occupant::new(1, 1)));
        // runs past the open range
        assert!(!grid.try_occupy(Weekday::Monday, t(14, 40), 30, Occupant::new(1, 1)));
        // never seeded
        assert!(!grid.try_occupy(Weekday::Tuesday, t(14, 0), 10, Occupant::new(1, 1)));
        assert_eq!(grid, before);
    }

    #[test]
    fn test_release_restores_previous_state() {
        let mut grid = grid();
        assert!(grid.try_occupy(Weekday::Monday, t(14, 0), 20, Occupant::new(0, 1)));
        let before = grid.clone();

        assert!(grid.try_occupy(Weekday::Monday, t(14, 20), 30, Occupant::new(1, 1)));
        grid.release(Weekday::Monday, t(14, 20), 30);
        assert_eq!(grid, before);
    }

    #[test]
    fn test_occupy_rejects_run_past_midnight() {
        let mut grid = TimeGrid::new();
        grid.seed_open(Weekday::Friday, t(23, 40), t(23, 50)).unwrap();
        assert!(!grid.try_occupy(Weekday::Friday, t(23, 50), 20, Occupant::new(0, 1)));
        assert!(grid.is_empty());
    }

    #[test]
    fn test_iter_is_ordered_by_day_then_time() {
        let mut grid = TimeGrid::new();
        grid.seed_open(Weekday::Wednesday, t(9, 0), t(9, 20)).unwrap();
        grid.seed_open(Weekday::Monday, t(14, 0), t(14, 20)).unwrap();
        let keys: Vec<_> = grid.iter().map(|(day, time, _)| (day, time)).collect();
        assert_eq!(
            keys,
            vec![
                (Weekday::Monday, t(14, 0)),
                (Weekday::Monday, t(14, 10)),
                (Weekday::Wednesday, t(9, 0)),
                (Weekday::Wednesday, t(9, 10)),
            ]
        );
    }
}
