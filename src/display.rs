use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::schedule::{Lesson, Plan, Weekday};

/// Formats one lesson line: ` - HH:MM-HH:MM: name (priority)`
pub fn format_lesson(plan: &Plan, lesson: &Lesson) -> String {
    let name = plan
        .student(lesson.occupant)
        .map(|s| s.name())
        .unwrap_or("?");
    format!(" - {}-{}: {} ({})", lesson.start, lesson.end, name, lesson.occupant.priority)
}

/// Renders the plan day by day; days without lessons are left out
pub fn render_schedule(plan: &Plan) -> String {
    let lessons = plan.lessons();
    let mut out = String::new();

    for day in Weekday::ALL {
        let mut day_lessons = lessons.iter().filter(|l| l.day == day).peekable();
        if day_lessons.peek().is_none() {
            continue;
        }
        out.push_str(&format!("{}:\n", day));
        for lesson in day_lessons {
            out.push_str(&format_lesson(plan, lesson));
            out.push('\n');
        }
    }

    out
}

/// Prints the schedule to stdout
pub fn print_schedule(plan: &Plan) {
    print!("{}", render_schedule(plan));
}

/// Writes the schedule to a file in the same format as [`print_schedule`]
pub fn write_schedule_to_file<P: AsRef<Path>>(plan: &Plan, path: P) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(render_schedule(plan).as_bytes())?;
    Ok(())
}
