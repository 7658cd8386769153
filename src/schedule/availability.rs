use std::iter;

use crate::config::SearchConfig;
use super::types::{AvailabilityWindow, Student, TimeOfDay, Weekday};

/// A candidate start for a lesson
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub day: Weekday,
    pub time: TimeOfDay,
    pub priority: u32,
}

/// Anchors of a single window, in increasing time order.
///
/// The start is always produced. A bounded window adds up to
/// `range_attempts` anchors every `range_increment` minutes while they stay
/// before the end; an open window produces only its start.
pub fn window_anchors(
    window: &AvailabilityWindow,
    priority: u32,
    config: SearchConfig,
) -> impl Iterator<Item = Anchor> {
    let AvailabilityWindow { day, start, end } = *window;
    let extra = match end {
        Some(_) => config.range_attempts as usize,
        None => 0,
    };

    iter::successors(Some(start), move |time| time.checked_add(config.range_increment))
        .take(extra.saturating_add(1))
        .enumerate()
        .take_while(move |(i, time)| *i == 0 || end.is_some_and(|end| *time < end))
        .map(move |(_, time)| Anchor { day, time, priority })
}

/// Every anchor of a student, window by window in declaration order.
///
/// Regenerated on each call, so a search can restart it freely.
pub fn anchors(student: &Student, config: SearchConfig) -> impl Iterator<Item = Anchor> + '_ {
    student
        .windows()
        .iter()
        .zip(1..)
        .flat_map(move |(window, priority)| window_anchors(window, priority, config))
}
