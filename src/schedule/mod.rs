pub mod types;
pub mod grid;
pub mod availability;
pub mod backtrack;
pub mod result;
pub mod plan;

pub use types::{AvailabilityWindow, Occupant, Student, TimeOfDay, Weekday, GRANULARITY};
pub use grid::TimeGrid;
pub use availability::{anchors, Anchor};
pub use backtrack::{BacktrackingScheduler, SearchStats};
pub use result::{Lesson, Outcome, ScheduleReport};
pub use plan::Plan;
