//! Reading the proctoring workbook into typed [`RawRow`]s.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::{RawRow, Result, ScheduleError};

/// Row index of the header in the registrar's export; the rows above it
/// hold the sheet title.
pub const DEFAULT_HEADER_ROW: usize = 2;

pub(crate) const DATE: &str = "Date";
pub(crate) const START_TIME: &str = "Start time";
pub(crate) const END_TIME: &str = "End time";
pub(crate) const LOCATION: &str = "Location";
pub(crate) const SUBJECT: &str = "Subject";
pub(crate) const COURSE: &str = "Course";
pub(crate) const SECTION: &str = "Section";
pub(crate) const INSTRUCTOR: &str = "Instructor";
pub(crate) const STUDENTS_ENROLLED: &str = "Students enrolled";
const PROCTOR_PREFIX: &str = "Proctor";

/// Reads the first worksheet of the workbook at `path`.
pub fn read_schedule<P: AsRef<Path>>(path: P, header_row: usize) -> Result<Vec<RawRow>> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ScheduleError::NoWorksheet)??;

    parse_range(&range, header_row)
}

/// Upper-cases the first character and lower-cases the rest, so
/// `"STUDENTS Enrolled"` and `"students enrolled"` both become
/// `"Students enrolled"`.
pub fn capitalize(header: &str) -> String {
    let mut chars = header.trim().chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

struct Columns {
    names: Vec<String>,
    date: usize,
    start_time: usize,
    end_time: usize,
    location: usize,
    subject: usize,
    course: usize,
    section: usize,
    instructor: usize,
    students_enrolled: usize,
    proctors: Vec<usize>,
}

impl Columns {
    fn from_header(header: &[Data]) -> Result<Self> {
        let names = header
            .iter()
            .map(|cell| capitalize(&cell.to_string()))
            .collect::<Vec<_>>();

        let find = |name: &'static str| {
            names
                .iter()
                .position(|candidate| candidate == name)
                .ok_or(ScheduleError::MissingColumn(name))
        };

        let proctors = names
            .iter()
            .enumerate()
            .filter(|(_, name)| name.starts_with(PROCTOR_PREFIX))
            .map(|(idx, _)| idx)
            .collect::<Vec<_>>();

        if proctors.is_empty() {
            return Err(ScheduleError::NoProctorColumns);
        }

        Ok(Self {
            date: find(DATE)?,
            start_time: find(START_TIME)?,
            end_time: find(END_TIME)?,
            location: find(LOCATION)?,
            subject: find(SUBJECT)?,
            course: find(COURSE)?,
            section: find(SECTION)?,
            instructor: find(INSTRUCTOR)?,
            students_enrolled: find(STUDENTS_ENROLLED)?,
            proctors,
            names,
        })
    }
}

/// Parses an in-memory worksheet. `header_row` is the absolute (0-based)
/// worksheet row holding the column names.
pub fn parse_range(range: &Range<Data>, header_row: usize) -> Result<Vec<RawRow>> {
    // calamine ranges start at the first used cell, not at A1.
    let (first_row, _) = range.start().ok_or(ScheduleError::MissingHeaderRow(header_row))?;
    let offset = header_row
        .checked_sub(first_row as usize)
        .ok_or(ScheduleError::MissingHeaderRow(header_row))?;

    let mut rows = range.rows().skip(offset);
    let header = rows.next().ok_or(ScheduleError::MissingHeaderRow(header_row))?;
    let columns = Columns::from_header(header)?;

    rows.enumerate()
        .map(|(idx, cells)| -> Result<RawRow> {
            let cursor = Cursor {
                cells,
                columns: &columns,
                row: header_row + idx + 2,
            };

            Ok(RawRow {
                row: cursor.row,
                date: cursor.date(columns.date)?,
                start_time: cursor.time(columns.start_time)?,
                end_time: cursor.time(columns.end_time)?,
                location: cursor.text(columns.location)?,
                subject: cursor.text(columns.subject)?,
                course: cursor.text(columns.course)?,
                section: cursor.text(columns.section)?,
                instructor: cursor.text(columns.instructor)?,
                students_enrolled: cursor.text(columns.students_enrolled)?,
                proctors: columns
                    .proctors
                    .iter()
                    .map(|&col| cursor.text(col))
                    .collect::<Result<_>>()?,
            })
        })
        .collect()
}

/// Typed access to the cells of one worksheet row.
struct Cursor<'a> {
    cells: &'a [Data],
    columns: &'a Columns,
    row: usize,
}

impl Cursor<'_> {
    fn invalid(&self, col: usize, cell: &Data) -> ScheduleError {
        ScheduleError::InvalidCell {
            row: self.row,
            column: self.columns.names[col].clone(),
            value: cell.to_string(),
        }
    }

    fn cell(&self, col: usize) -> &Data {
        self.cells.get(col).unwrap_or(&Data::Empty)
    }

    fn text(&self, col: usize) -> Result<Option<String>> {
        let cell = self.cell(col);
        let text = match cell {
            Data::Empty => return Ok(None),
            Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
            Data::Int(i) => i.to_string(),
            Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
            Data::Float(f) => f.to_string(),
            Data::Bool(b) => b.to_string(),
            Data::DateTime(dt) => from_serial(dt.as_f64())
                .ok_or_else(|| self.invalid(col, cell))?
                .to_string(),
            Data::Error(_) => return Err(self.invalid(col, cell)),
        };

        Ok((!text.is_empty()).then_some(text))
    }

    fn date(&self, col: usize) -> Result<Option<NaiveDate>> {
        let cell = self.cell(col);
        let date = match cell {
            Data::Empty => None,
            Data::DateTime(dt) => from_serial(dt.as_f64()).map(|dt| dt.date()),
            Data::Float(f) => from_serial(*f).map(|dt| dt.date()),
            Data::Int(i) => from_serial(*i as f64).map(|dt| dt.date()),
            Data::String(s) | Data::DateTimeIso(s) if s.trim().is_empty() => return Ok(None),
            Data::String(s) | Data::DateTimeIso(s) => parse_date(s.trim()),
            _ => None,
        };

        match (cell, date) {
            (Data::Empty, _) => Ok(None),
            (_, Some(date)) => Ok(Some(date)),
            (_, None) => Err(self.invalid(col, cell)),
        }
    }

    fn time(&self, col: usize) -> Result<Option<NaiveTime>> {
        let cell = self.cell(col);
        // Excel stores a time-of-day as a day fraction; any whole-day part
        // is a placeholder date and is discarded.
        let time = match cell {
            Data::Empty => None,
            Data::DateTime(dt) => from_serial(dt.as_f64()).map(|dt| dt.time()),
            Data::Float(f) => from_serial(*f).map(|dt| dt.time()),
            Data::String(s) | Data::DateTimeIso(s) if s.trim().is_empty() => return Ok(None),
            Data::String(s) | Data::DateTimeIso(s) => parse_time(s.trim()),
            _ => None,
        };

        match (cell, time) {
            (Data::Empty, _) => Ok(None),
            (_, Some(time)) => Ok(Some(time)),
            (_, None) => Err(self.invalid(col, cell)),
        }
    }
}

/// Converts an Excel serial date (days since 1899-12-30) to a timestamp,
/// keeping millisecond precision.
fn from_serial(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }

    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::try_milliseconds(millis)?)
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_timestamp(s).map(|dt| dt.date()))
}

fn parse_time(s: &str) -> Option<NaiveTime> {
    ["%H:%M:%S%.f", "%H:%M", "%I:%M %p", "%I:%M:%S %p"]
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(s, format).ok())
        .or_else(|| parse_timestamp(s).map(|dt| dt.time()))
}
