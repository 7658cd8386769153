use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use log::{info, warn};

use lesson_planner::display::{print_schedule, write_schedule_to_file};
use lesson_planner::export::{export_csv, export_json};
use lesson_planner::parser::load_roster;
use lesson_planner::replay::replay_file;
use lesson_planner::schedule::{ScheduleReport, SearchStats};
use lesson_planner::{Plan, SearchConfig, Settings};

/// Primitive constraint solver for student lesson scheduling.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Student availability roster, tab-separated or JSON (`.json`)
    #[arg(short, long, value_name = "FILE")]
    availability: PathBuf,
    /// Number of increments that are attempted for availability ranges
    #[arg(short, long)]
    range_attempts: Option<u32>,
    /// Increment in minutes used for availability ranges
    #[arg(short = 'i', long)]
    range_increment: Option<u32>,
    /// JSON settings with opening hours and search parameters
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Rebuild the plan from a printed schedule instead of searching
    #[arg(long, value_name = "FILE")]
    replay: Option<PathBuf>,
    /// Also write the printed schedule to this file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
    /// Export the schedule as JSON
    #[arg(long, value_name = "FILE")]
    json: Option<PathBuf>,
    /// Export the schedule as CSV
    #[arg(long, value_name = "FILE")]
    csv: Option<PathBuf>,
    /// Give up the search after this many seconds
    #[arg(short, long, value_name = "SECONDS")]
    timeout: Option<u64>,
}

/// Runs the search on a worker thread and waits at most `timeout` for it.
///
/// Returns `None` when the deadline passes first; the worker is left behind
/// and dies with the process.
fn schedule_within(
    mut plan: Plan,
    config: SearchConfig,
    timeout: Option<Duration>,
) -> lesson_planner::Result<Option<(Plan, ScheduleReport)>> {
    let Some(timeout) = timeout else {
        let report = plan.schedule(config)?;
        return Ok(Some((plan, report)));
    };

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let report = plan.schedule(config);
        // the receiver is gone once the deadline has passed
        let _ = tx.send(report.map(|report| (plan, report)));
    });

    match rx.recv_timeout(timeout) {
        Ok(result) => result.map(Some),
        Err(mpsc::RecvTimeoutError::Timeout) => Ok(None),
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            warn!("search worker stopped without a result");
            Ok(None)
        }
    }
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    env_logger::builder()
        .target(env_logger::Target::Stdout)
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();
    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(range_attempts) = args.range_attempts {
        settings.search.range_attempts = range_attempts;
    }
    if let Some(range_increment) = args.range_increment {
        settings.search.range_increment = range_increment;
    }

    let mut plan = Plan::new(&settings.open_hours)?;
    for student in load_roster(&args.availability)? {
        plan.add_student(student)?;
    }

    let statistics: Option<SearchStats> = match &args.replay {
        Some(path) => {
            replay_file(&mut plan, path)?;
            None
        }
        None => {
            let timeout = args.timeout.map(Duration::from_secs);
            let Some((scheduled, report)) = schedule_within(plan, settings.search, timeout)? else {
                println!("timeout reached");
                return Ok(ExitCode::FAILURE);
            };
            if !report.outcome.is_scheduled() {
                println!("no schedule found");
                return Ok(ExitCode::SUCCESS);
            }
            plan = scheduled;
            Some(report.stats)
        }
    };

    print_schedule(&plan);
    if let Some(path) = &args.output {
        write_schedule_to_file(&plan, path)?;
        info!("Schedule saved to {}", path.display());
    }
    if let Some(path) = &args.json {
        export_json(&plan, settings.search, statistics, path)?;
        info!("JSON export saved to {}", path.display());
    }
    if let Some(path) = &args.csv {
        export_csv(&plan, path)?;
        info!("CSV export saved to {}", path.display());
    }

    Ok(ExitCode::SUCCESS)
}
