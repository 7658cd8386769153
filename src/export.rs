use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::Local;
use csv::WriterBuilder;
use serde::Serialize;

use crate::config::SearchConfig;
use crate::error::Result;
use crate::schedule::{Plan, SearchStats, TimeOfDay, Weekday};

/// One lesson as written to JSON or CSV
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LessonRecord {
    pub day: Weekday,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub student: String,
    pub priority: u32,
    pub duration_minutes: u32,
}

#[derive(Debug, Serialize)]
struct ScheduleDocument<'a> {
    generated_at: String,
    options: SearchConfig,
    /// absent when the plan was replayed rather than searched
    #[serde(skip_serializing_if = "Option::is_none")]
    statistics: Option<SearchStats>,
    lessons: &'a [LessonRecord],
}

/// Lessons of the plan in (day, start) order
pub fn lesson_records(plan: &Plan) -> Vec<LessonRecord> {
    plan.lessons()
        .into_iter()
        .filter_map(|lesson| {
            let student = plan.student(lesson.occupant)?;
            Some(LessonRecord {
                day: lesson.day,
                start: lesson.start,
                end: lesson.end,
                student: student.name().to_string(),
                priority: lesson.occupant.priority,
                duration_minutes: lesson.duration(),
            })
        })
        .collect()
}

/// Writes the schedule as a pretty-printed JSON document, together with the
/// search options of the run and its statistics when a search produced it
pub fn write_json<W: Write>(
    plan: &Plan,
    options: SearchConfig,
    statistics: Option<SearchStats>,
    writer: W,
) -> Result<()> {
    let lessons = lesson_records(plan);
    let document = ScheduleDocument {
        generated_at: Local::now().to_rfc3339(),
        options,
        statistics,
        lessons: &lessons,
    };
    serde_json::to_writer_pretty(writer, &document)?;
    Ok(())
}

pub fn export_json<P: AsRef<Path>>(
    plan: &Plan,
    options: SearchConfig,
    statistics: Option<SearchStats>,
    path: P,
) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_json(plan, options, statistics, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Writes one CSV row per lesson, with a header row
pub fn write_csv<W: Write>(plan: &Plan, writer: W) -> Result<()> {
    let mut wtr = WriterBuilder::new().has_headers(true).from_writer(writer);
    for record in lesson_records(plan) {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_csv<P: AsRef<Path>>(plan: &Plan, path: P) -> Result<()> {
    write_csv(plan, File::create(path)?)
}
