use std::io::{self, BufRead};

use log::{debug, info};

use crate::error::{Error, Result};
use crate::schedule::{Plan, TimeOfDay, Weekday, GRANULARITY};

/// One lesson line of a printed schedule
#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    start: TimeOfDay,
    duration: u32,
    student: String,
    priority: u32,
}

fn parse_entry(text: &str) -> std::result::Result<Entry, String> {
    let (times, rest) = text
        .split_once(": ")
        .ok_or_else(|| format!("expected 'time: name (priority)', got '{}'", text))?;
    let (student, priority) = rest
        .trim_end()
        .strip_suffix(')')
        .and_then(|r| r.rsplit_once(" ("))
        .ok_or_else(|| format!("missing priority in '{}'", rest))?;
    let priority: u32 = priority
        .trim()
        .parse()
        .map_err(|_| format!("invalid priority '{}'", priority))?;

    // older printouts list every slot on its own line without an end time
    let (start, duration) = match times.split_once('-') {
        Some((start, end)) => {
            let start: TimeOfDay = start.parse().map_err(|e: Error| e.to_string())?;
            let end: TimeOfDay = end.parse().map_err(|e: Error| e.to_string())?;
            if end <= start {
                return Err(format!("lesson {} ends before it starts", times));
            }
            (start, end.minutes() - start.minutes())
        }
        None => (times.parse::<TimeOfDay>().map_err(|e: Error| e.to_string())?, GRANULARITY),
    };

    Ok(Entry { start, duration, student: student.trim().to_string(), priority })
}

/// Rebuilds a grid from a schedule printed by [`crate::display::print_schedule`].
///
/// Every lesson line is placed with [`Plan::try_occupy`]; no search runs.
/// Returns the number of lessons placed.
pub fn replay_schedule<R: BufRead>(plan: &mut Plan, reader: R) -> Result<usize> {
    let mut day: Option<Weekday> = None;
    let mut placed = 0;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = index + 1;
        let trimmed = line.trim();
        let replay_error = |message: String| Error::Replay { line: line_no, message };

        if trimmed.is_empty() {
            continue;
        }
        if let Some(entry) = trimmed.strip_prefix("- ") {
            let day = day.ok_or_else(|| replay_error("lesson listed before any day".to_string()))?;
            let entry = parse_entry(entry).map_err(replay_error)?;
            let occupied = plan
                .try_occupy(day, entry.start, entry.duration, &entry.student, entry.priority)
                .map_err(|e| replay_error(e.to_string()))?;
            if !occupied {
                return Err(replay_error(format!(
                    "{} on {} at {} is not free",
                    entry.student, day, entry.start
                )));
            }
            debug!("replayed {} on {} at {}", entry.student, day, entry.start);
            placed += 1;
        } else if let Some(header) = trimmed.strip_suffix(':') {
            day = Some(header.parse().map_err(|e: Error| replay_error(e.to_string()))?);
        } else {
            return Err(replay_error(format!("unrecognised line '{}'", trimmed)));
        }
    }

    info!("Replayed {} lessons", placed);
    Ok(placed)
}

/// Replays a printed schedule file, see [`replay_schedule`]
pub fn replay_file<P: AsRef<std::path::Path>>(plan: &mut Plan, path: P) -> Result<usize> {
    let file = std::fs::File::open(path)?;
    replay_schedule(plan, io::BufReader::new(file))
}
