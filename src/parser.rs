use std::io;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use log::{info, warn};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::schedule::{AvailabilityWindow, Student, TimeOfDay, Weekday, GRANULARITY};

/// Columns describing one availability: day, from hour, from minute, to hour, to minute
const WINDOW_COLUMNS: usize = 5;

/// Parses an hour or minute column; empty means "not given"
fn parse_number(value: Option<&str>) -> std::result::Result<Option<u32>, String> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(|_| format!("'{}' is not a number", s)),
    }
}

/// Builds an aligned time from an hour and an optional minute, rounding up to the granularity
fn aligned_time(hour: Option<u32>, minute: Option<u32>) -> std::result::Result<Option<TimeOfDay>, String> {
    let Some(hour) = hour else {
        return Ok(None);
    };
    let time = TimeOfDay::new(hour, minute.unwrap_or(0)).map_err(|e| e.to_string())?;
    time.round_up(GRANULARITY)
        .map(Some)
        .ok_or_else(|| format!("{} cannot be rounded up within the day", time))
}

fn make_window(
    day: &str,
    from: (Option<u32>, Option<u32>),
    to: (Option<u32>, Option<u32>),
) -> std::result::Result<AvailabilityWindow, String> {
    let day: Weekday = day.parse().map_err(|_| format!("unknown day ({})", day))?;
    let start = aligned_time(from.0, from.1)?.ok_or_else(|| format!("no start hour given for {}", day))?;
    let end = aligned_time(to.0, to.1)?;
    Ok(AvailabilityWindow::new(day, start, end))
}

/// Parses one 5-column availability group
fn parse_window(group: &[&str]) -> std::result::Result<AvailabilityWindow, String> {
    let column = |i: usize| parse_number(group.get(i).copied());
    make_window(group[0], (column(1)?, column(2)?), (column(3)?, column(4)?))
}

fn parse_student(record: &StringRecord) -> Result<Student> {
    let line = record.position().map(|p| p.line()).unwrap_or(0);
    let fields: Vec<&str> = record.iter().collect();
    if fields.len() < 3 {
        return Err(Error::Roster {
            line,
            message: "expected first name, last name and lesson duration".to_string(),
        });
    }

    let name = format!("{} {}", fields[0], fields[1].to_uppercase());
    let lesson_duration: u32 = fields[2].parse().map_err(|_| Error::Roster {
        line,
        message: format!("invalid lesson duration '{}' for {}", fields[2], name),
    })?;

    let mut windows = Vec::new();
    for group in fields[3..].chunks(WINDOW_COLUMNS) {
        // trailing tabs leave empty groups behind
        if group.iter().all(|f| f.is_empty()) {
            continue;
        }
        match parse_window(group) {
            Ok(window) => windows.push(window),
            Err(message) => warn!("line {}: skipping availability of {}: {}", line, name, message),
        }
    }

    Student::new(name, lesson_duration, windows)
}

/// Reads a tab-separated roster.
///
/// Each record is `first name, last name, lesson duration` followed by any
/// number of availability groups. Lines starting with `#` are comments.
/// A malformed availability only drops that availability; the student is kept.
pub fn read_roster<R: io::Read>(reader: R) -> Result<Vec<Student>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .trim(Trim::All)
        .from_reader(reader);

    let mut students = Vec::new();
    for result in reader.records() {
        let record = result?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        students.push(parse_student(&record)?);
    }
    Ok(students)
}

#[derive(Debug, Deserialize)]
struct StudentRecord {
    name: String,
    lesson_duration: u32,
    #[serde(default)]
    availabilities: Vec<AvailabilityRecord>,
}

#[derive(Debug, Deserialize)]
struct AvailabilityRecord {
    day: String,
    from_hour: Option<u32>,
    from_minute: Option<u32>,
    to_hour: Option<u32>,
    to_minute: Option<u32>,
}

impl AvailabilityRecord {
    fn to_window(&self) -> std::result::Result<AvailabilityWindow, String> {
        make_window(&self.day, (self.from_hour, self.from_minute), (self.to_hour, self.to_minute))
    }
}

/// Reads a JSON roster: an array of
/// `{ name, lesson_duration, availabilities: [{ day, from_hour, from_minute, to_hour, to_minute }] }`.
///
/// Times are rounded up like the tab-separated format, and a malformed
/// availability is skipped with a warning.
pub fn read_json_roster<R: io::Read>(reader: R) -> Result<Vec<Student>> {
    let records: Vec<StudentRecord> = serde_json::from_reader(reader)?;
    records
        .into_iter()
        .map(|record| {
            let mut windows = Vec::new();
            for availability in &record.availabilities {
                match availability.to_window() {
                    Ok(window) => windows.push(window),
                    Err(message) => warn!("skipping availability of {}: {}", record.name, message),
                }
            }
            Student::new(record.name, record.lesson_duration, windows)
        })
        .collect()
}

/// Loads a roster file; `.json` files go through [`read_json_roster`],
/// anything else through [`read_roster`]
pub fn load_roster<P: AsRef<Path>>(path: P) -> Result<Vec<Student>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let students = if is_json { read_json_roster(file)? } else { read_roster(file)? };
    info!("Loaded {} students from {}", students.len(), path.display());
    Ok(students)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(hour: u32, minute: u32) -> TimeOfDay {
        TimeOfDay::new(hour, minute).unwrap()
    }

    #[test]
    fn test_reads_students_and_windows() {
        let roster = "# first\tlast\tduration\tavailabilities...\n\
                      Ana\tMartin\t30\tLundi\t14\t\t\t\tMercredi\t9\t5\t11\t30\n\
                      \n\
                      Ben\tDupont\t40\tVendredi\t16\t0\n";
        let students = read_roster(roster.as_bytes()).unwrap();
        assert_eq!(students.len(), 2);

        let ana = &students[0];
        assert_eq!(ana.name(), "Ana MARTIN");
        assert_eq!(ana.lesson_duration(), 30);
        assert_eq!(
            ana.windows(),
            &[
                AvailabilityWindow::at(Weekday::Monday, t(14, 0)),
                AvailabilityWindow::new(Weekday::Wednesday, t(9, 10), Some(t(11, 30))),
            ]
        );

        let ben = &students[1];
        assert_eq!(ben.name(), "Ben DUPONT");
        assert_eq!(ben.windows(), &[AvailabilityWindow::at(Weekday::Friday, t(16, 0))]);
    }

    #[test]
    fn test_unknown_day_skips_only_that_window() {
        let roster = "Ana\tMartin\t30\tSamedi\t10\t0\t\t\tJeudi\t17\t0\t18\t0\n";
        let students = read_roster(roster.as_bytes()).unwrap();
        assert_eq!(students.len(), 1);
        assert_eq!(
            students[0].windows(),
            &[AvailabilityWindow::new(Weekday::Thursday, t(17, 0), Some(t(18, 0)))]
        );
    }

    #[test]
    fn test_window_without_hour_is_skipped() {
        let roster = "Ana\tMartin\t30\tLundi\t\t\t\t\tMardi\t8\t45\n";
        let students = read_roster(roster.as_bytes()).unwrap();
        assert_eq!(students[0].windows(), &[AvailabilityWindow::at(Weekday::Tuesday, t(8, 50))]);
    }

    #[test]
    fn test_misaligned_duration_is_config_error() {
        let roster = "Ana\tMartin\t25\tLundi\t14\t0\n";
        assert!(matches!(read_roster(roster.as_bytes()), Err(Error::Config(_))));
    }

    #[test]
    fn test_bad_duration_is_roster_error() {
        let roster = "Ana\tMartin\thalf an hour\n";
        assert!(matches!(read_roster(roster.as_bytes()), Err(Error::Roster { .. })));

        let roster = "Ana\tMartin\n";
        assert!(matches!(read_roster(roster.as_bytes()), Err(Error::Roster { .. })));
    }

    #[test]
    fn test_reads_json_roster() {
        let roster = r#"[
            {
                "id": 7,
                "name": "Ana MARTIN",
                "lesson_duration": 30,
                "availabilities": [
                    { "day": "MONDAY", "from_hour": 14, "from_minute": 0, "to_hour": 15, "to_minute": 0 },
                    { "day": "Mercredi", "from_hour": 9, "from_minute": 5 }
                ]
            },
            { "name": "Ben DUPONT", "lesson_duration": 40, "availabilities": [] }
        ]"#;
        let students = read_json_roster(roster.as_bytes()).unwrap();
        assert_eq!(students.len(), 2);
        assert_eq!(students[0].name(), "Ana MARTIN");
        assert_eq!(
            students[0].windows(),
            &[
                AvailabilityWindow::new(Weekday::Monday, t(14, 0), Some(t(15, 0))),
                AvailabilityWindow::at(Weekday::Wednesday, t(9, 10)),
            ]
        );
        assert_eq!(students[1].lesson_duration(), 40);
        assert!(students[1].windows().is_empty());
    }

    #[test]
    fn test_json_roster_skips_bad_windows() {
        let roster = r#"[{ "name": "Ana MARTIN", "lesson_duration": 30, "availabilities": [
            { "day": "SUNDAY", "from_hour": 10, "from_minute": 0 },
            { "day": "FRIDAY", "from_minute": 30 },
            { "day": "FRIDAY", "from_hour": 25, "from_minute": 0 },
            { "day": "THURSDAY", "from_hour": 17, "from_minute": 0, "to_hour": 18, "to_minute": 0 }
        ] }]"#;
        let students = read_json_roster(roster.as_bytes()).unwrap();
        assert_eq!(
            students[0].windows(),
            &[AvailabilityWindow::new(Weekday::Thursday, t(17, 0), Some(t(18, 0)))]
        );
    }

    #[test]
    fn test_json_roster_errors() {
        let roster = r#"[{ "name": "Ana MARTIN", "lesson_duration": 25 }]"#;
        assert!(matches!(read_json_roster(roster.as_bytes()), Err(Error::Config(_))));

        let roster = r#"[{ "name": "Ana MARTIN" }]"#;
        assert!(matches!(read_json_roster(roster.as_bytes()), Err(Error::Json(_))));
    }
}
