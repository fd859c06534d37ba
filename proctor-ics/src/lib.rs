pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod prompt;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use proctor_schedule::buildings::{self, Abbreviations};
use proctor_schedule::conflicts::{double_bookings, Conflict};
use proctor_schedule::zone::TORONTO;
use proctor_schedule::{normalize, sheet, CalendarSet, RawRow};
use tracing::{info, warn};

use crate::cli::Args;
use crate::config::{Config, ABBREVIATIONS_FILE};
use crate::error::{AppError, AppResult};
use crate::output::OutputDirs;

/// What a successful conversion produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub period: String,
    pub events: usize,
    pub conflicts: usize,
    pub files: Vec<PathBuf>,
}

pub fn run(args: &Args, config: &Config) -> AppResult<()> {
    if let Some(index) = &args.extract_abbreviations {
        let path = extract_abbreviations(index, config)?;
        info!("Wrote building abbreviations to {}", path.display());
        return Ok(());
    }

    let schedule = select_schedule(args, config)?;
    let abbreviations = load_abbreviations(&config.abbreviations_path())?;
    let rows = sheet::read_schedule(&schedule, args.header_row)?;

    let dirs = OutputDirs {
        aggregate: config.interim_dir(),
        per_proctor: config.processed_dir(),
    };
    let summary = convert(&rows, &abbreviations, args.start_offset, &dirs)?;

    let source = schedule
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    info!(
        events = summary.events,
        calendars = summary.files.len(),
        "Created ICS calendars for {} from {}",
        summary.period,
        source
    );

    Ok(())
}

/// Normalizes `rows`, reports double-bookings, then renders and writes
/// every calendar. Conflicts never stop the run.
pub fn convert(
    rows: &[RawRow],
    abbreviations: &Abbreviations,
    start_offset_minutes: i64,
    dirs: &OutputDirs,
) -> AppResult<Summary> {
    let events = normalize::normalize(rows, &TORONTO, start_offset_minutes)?;

    let mut conflicts = 0;
    for conflict in double_bookings(&events) {
        report(&conflict);
        conflicts += 1;
    }

    let set = CalendarSet::assemble(&events, abbreviations)?;
    let rendered = set.to_ics_files(&TORONTO, Utc::now());
    let files = output::write_calendars(&rendered, dirs)?;

    Ok(Summary {
        period: set.period,
        events: events.len(),
        conflicts,
        files,
    })
}

fn report(conflict: &Conflict) {
    let (first, second) = (&conflict.first, &conflict.second);
    warn!(
        proctor = conflict.proctor(),
        "{} is double-booked on {}: {} assigned from {} to {}; {} assigned from {} to {}",
        conflict.proctor(),
        conflict.date(),
        first.label(),
        first.start().format("%H:%M"),
        first.end().format("%H:%M"),
        second.label(),
        second.start().format("%H:%M"),
        second.end().format("%H:%M"),
    );
}

fn select_schedule(args: &Args, config: &Config) -> AppResult<PathBuf> {
    let path = match &args.schedule {
        Some(schedule) => config.raw_path(schedule),
        None => {
            let raw_dir = config.raw_dir();
            let files = prompt::list_schedules(&raw_dir).map_err(|err| {
                AppError::Config(format!("cannot list schedules in {}: {err}", raw_dir.display()))
            })?;
            let choice = prompt::prompt_for_file(&files, io::stdin().lock(), io::stdout())?;
            raw_dir.join(choice)
        }
    };

    if !path.is_file() {
        return Err(AppError::Config(format!("schedule {} does not exist", path.display())));
    }

    Ok(path)
}

/// A missing table only costs the building names, so the run continues
/// with raw codes.
pub fn load_abbreviations(path: &Path) -> AppResult<Abbreviations> {
    if !path.exists() {
        warn!(
            "No building abbreviations at {}; descriptions will show building codes",
            path.display()
        );
        return Ok(Abbreviations::default());
    }

    Ok(Abbreviations::from_path(path)?)
}

/// Scrapes a saved building index page into `<interim>/building_abbreviations.csv`.
pub fn extract_abbreviations(index: &Path, config: &Config) -> AppResult<PathBuf> {
    let html = fs::read_to_string(config.raw_path(index))?;
    let entries = buildings::parse_building_index(html);

    if entries.is_empty() {
        return Err(AppError::Config(format!("no buildings found in {}", index.display())));
    }

    let mut csv = Vec::new();
    buildings::write_csv(&mut csv, &entries)?;

    let path = output::write_atomic(&config.interim_dir(), ABBREVIATIONS_FILE, &csv)?;
    info!(count = entries.len(), "extracted building abbreviations");

    Ok(path)
}
