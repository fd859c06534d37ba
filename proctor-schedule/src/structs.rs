use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// One data row of the proctoring spreadsheet, as it was typed in.
///
/// Every field is nullable because continuation rows of a multi-proctor
/// event usually leave the shared columns blank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based row number in the worksheet, for error messages.
    pub row: usize,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub location: Option<String>,
    pub subject: Option<String>,
    pub course: Option<String>,
    pub section: Option<String>,
    pub instructor: Option<String>,
    pub students_enrolled: Option<String>,
    /// One entry per "Proctor N" column, in header order.
    pub proctors: Vec<Option<String>>,
}

/// A single exam sitting with everyone assigned to proctor it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedEvent {
    pub date: NaiveDate,
    /// Arrival time: the exam start minus the configured offset.
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub location: String,
    pub subject: String,
    pub course: String,
    pub section: String,
    pub instructor: String,
    pub students_enrolled: String,
    pub proctors: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingAbbreviation {
    #[serde(rename = "Abbreviation")]
    pub code: String,
    #[serde(rename = "Building")]
    pub name: String,
    #[serde(rename = "Address", default)]
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub uid: String,
    pub summary: String,
    pub description: String,
    pub location: String,
    pub dtstart: DateTime<FixedOffset>,
    pub dtend: DateTime<FixedOffset>,
}
