use std::io;

use chrono::NaiveDateTime;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScheduleError>;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("workbook contains no worksheet")]
    NoWorksheet,

    #[error("worksheet has no header row at row {0}")]
    MissingHeaderRow(usize),

    #[error("missing column `{0}`")]
    MissingColumn(&'static str),

    #[error("no `Proctor` columns found")]
    NoProctorColumns,

    #[error("row {row}, column `{column}`: cannot read `{value}`")]
    InvalidCell {
        row: usize,
        column: String,
        value: String,
    },

    /// A non-proctor cell is still blank after the forward fill, which only
    /// happens when the first assigned row leaves it empty.
    #[error("row {row}, column `{column}` is blank and has no earlier value to carry down")]
    MissingValue { row: usize, column: &'static str },

    #[error("{0} does not exist in the local timezone")]
    InvalidLocalTime(NaiveDateTime),

    #[error("row {row}: a start offset of {minutes} minutes moves the event out of range")]
    StartOffsetOutOfRange { row: usize, minutes: i64 },

    #[error("schedule contains no proctoring assignments")]
    EmptySchedule,

    #[error("failed to read building abbreviations: {0}")]
    Abbreviations(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}
