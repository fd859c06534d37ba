//! Reshapes spreadsheet rows into one [`NormalizedEvent`] per exam sitting.
//!
//! The steps run in a fixed order: [`unpivot`] the proctor columns,
//! [`forward_fill`] the blanks left on continuation rows, then resolve
//! timestamps and group rows that describe the same sitting.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, SubsecRound, Utc};

use crate::sheet::{
    COURSE, DATE, END_TIME, INSTRUCTOR, LOCATION, SECTION, START_TIME, STUDENTS_ENROLLED, SUBJECT,
};
use crate::zone::Zone;
use crate::{NormalizedEvent, RawRow, Result, ScheduleError};

pub const DEFAULT_START_OFFSET_MINUTES: i64 = 30;

/// The non-proctor columns of a row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFields {
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub location: Option<String>,
    pub subject: Option<String>,
    pub course: Option<String>,
    pub section: Option<String>,
    pub instructor: Option<String>,
    pub students_enrolled: Option<String>,
}

/// One (row, proctor) pair after the proctor columns are stacked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProctorRow {
    pub row: usize,
    pub fields: EventFields,
    pub proctor: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct EventKey {
    date: NaiveDate,
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
    location: String,
    subject: String,
    course: String,
    section: String,
    instructor: String,
    students_enrolled: String,
}

impl From<&RawRow> for EventFields {
    fn from(row: &RawRow) -> Self {
        Self {
            date: row.date,
            start_time: row.start_time,
            end_time: row.end_time,
            location: row.location.clone(),
            subject: row.subject.clone(),
            course: row.course.clone(),
            section: row.section.clone(),
            instructor: row.instructor.clone(),
            students_enrolled: row.students_enrolled.clone(),
        }
    }
}

fn fill<T: Clone>(slot: &mut Option<T>, previous: &Option<T>) {
    if slot.is_none() {
        slot.clone_from(previous);
    }
}

impl EventFields {
    fn fill_from(&mut self, previous: &EventFields) {
        fill(&mut self.date, &previous.date);
        fill(&mut self.start_time, &previous.start_time);
        fill(&mut self.end_time, &previous.end_time);
        fill(&mut self.location, &previous.location);
        fill(&mut self.subject, &previous.subject);
        fill(&mut self.course, &previous.course);
        fill(&mut self.section, &previous.section);
        fill(&mut self.instructor, &previous.instructor);
        fill(&mut self.students_enrolled, &previous.students_enrolled);
    }
}

/// Stacks the "Proctor N" columns into one proctor per output row, in
/// input row order. Rows without any proctor disappear.
pub fn unpivot(rows: &[RawRow]) -> Vec<ProctorRow> {
    rows.iter()
        .flat_map(|row| {
            let fields = EventFields::from(row);
            row.proctors.iter().flatten().map(move |proctor| ProctorRow {
                row: row.row,
                fields: fields.clone(),
                proctor: proctor.clone(),
            })
        })
        .collect()
}

/// Copies the last seen value into each blank non-proctor cell.
///
/// This mirrors how the sheet is typed (shared columns filled in only on
/// the first row of an event) and is wrong wherever a value was meant to
/// be blank, e.g. a make-up exam inserted without a course.
pub fn forward_fill(rows: &mut [ProctorRow]) {
    for idx in 1..rows.len() {
        let (done, rest) = rows.split_at_mut(idx);
        rest[0].fields.fill_from(&done[idx - 1].fields);
    }
}

fn required<T: Clone>(value: &Option<T>, row: usize, column: &'static str) -> Result<T> {
    value
        .clone()
        .ok_or(ScheduleError::MissingValue { row, column })
}

impl EventKey {
    fn resolve(row: &ProctorRow, zone: &Zone, start_offset_minutes: i64) -> Result<Self> {
        let fields = &row.fields;
        let date = required(&fields.date, row.row, DATE)?;
        let start_time = required(&fields.start_time, row.row, START_TIME)?;
        let end_time = required(&fields.end_time, row.row, END_TIME)?;

        let exam_start = zone.localize(date.and_time(start_time).trunc_subsecs(3))?;
        let start = Duration::try_minutes(start_offset_minutes)
            .and_then(|offset| exam_start.checked_sub_signed(offset))
            .and_then(|shifted| zone.from_utc(shifted.with_timezone(&Utc)))
            .ok_or(ScheduleError::StartOffsetOutOfRange {
                row: row.row,
                minutes: start_offset_minutes,
            })?;
        let end = zone.localize(date.and_time(end_time).trunc_subsecs(3))?;

        Ok(Self {
            date,
            start,
            end,
            location: required(&fields.location, row.row, LOCATION)?,
            subject: required(&fields.subject, row.row, SUBJECT)?,
            course: required(&fields.course, row.row, COURSE)?,
            section: required(&fields.section, row.row, SECTION)?,
            instructor: required(&fields.instructor, row.row, INSTRUCTOR)?,
            students_enrolled: required(&fields.students_enrolled, row.row, STUDENTS_ENROLLED)?,
        })
    }

    fn into_event(self, proctors: BTreeSet<String>) -> NormalizedEvent {
        NormalizedEvent {
            date: self.date,
            start: self.start,
            end: self.end,
            location: self.location,
            subject: self.subject,
            course: self.course,
            section: self.section,
            instructor: self.instructor,
            students_enrolled: self.students_enrolled,
            proctors,
        }
    }
}

/// Runs the whole reshaping pipeline.
///
/// Every event starts `start_offset_minutes` before the exam so proctors
/// arrive early. Rows that agree on every column except the proctor are
/// merged into one event, including accidental duplicates.
pub fn normalize(
    rows: &[RawRow],
    zone: &Zone,
    start_offset_minutes: i64,
) -> Result<Vec<NormalizedEvent>> {
    let mut stacked = unpivot(rows);
    forward_fill(&mut stacked);

    let mut index = HashMap::<EventKey, usize>::new();
    let mut groups = Vec::<(EventKey, BTreeSet<String>)>::new();

    for row in stacked {
        let key = EventKey::resolve(&row, zone, start_offset_minutes)?;
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push((key, BTreeSet::new()));
            groups.len() - 1
        });
        groups[slot].1.insert(row.proctor);
    }

    tracing::debug!(rows = rows.len(), events = groups.len(), "normalized schedule");

    Ok(groups
        .into_iter()
        .map(|(key, proctors)| key.into_event(proctors))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zone::TORONTO;

    fn date(d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2024, 7, d)
    }

    fn time(h: u32, m: u32) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(h, m, 0)
    }

    fn text(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    fn exam(row: usize, course: &str, proctors: &[Option<&str>]) -> RawRow {
        RawRow {
            row,
            date: date(15),
            start_time: time(9, 0),
            end_time: time(12, 0),
            location: text("NCB-113"),
            subject: text("Calculus"),
            course: text(course),
            section: text("001"),
            instructor: text("Dr. Smith"),
            students_enrolled: text("120"),
            proctors: proctors.iter().map(|p| p.map(str::to_string)).collect(),
        }
    }

    fn continuation(row: usize, proctors: &[Option<&str>]) -> RawRow {
        RawRow {
            row,
            proctors: proctors.iter().map(|p| p.map(str::to_string)).collect(),
            ..RawRow::default()
        }
    }

    fn sample() -> Vec<RawRow> {
        vec![
            exam(4, "1000", &[Some("Alice"), Some("Bob")]),
            continuation(5, &[Some("Carol"), None]),
            continuation(6, &[None, None]),
            exam(7, "2200", &[None, Some("Alice")]),
            continuation(8, &[Some("Alice"), Some("Dave")]),
        ]
    }

    #[test]
    fn unpivot_drops_rows_without_proctors() {
        let stacked = unpivot(&sample());
        let proctors = stacked.iter().map(|r| r.proctor.as_str()).collect::<Vec<_>>();

        assert_eq!(proctors, ["Alice", "Bob", "Carol", "Alice", "Alice", "Dave"]);
        assert!(stacked.iter().all(|r| r.row != 6));
    }

    #[test]
    fn forward_fill_carries_previous_values() {
        let mut stacked = unpivot(&sample());
        forward_fill(&mut stacked);

        let carol = stacked.iter().find(|r| r.proctor == "Carol").unwrap();
        assert_eq!(carol.fields.course.as_deref(), Some("1000"));
        assert_eq!(carol.fields.location.as_deref(), Some("NCB-113"));

        let dave = stacked.iter().find(|r| r.proctor == "Dave").unwrap();
        assert_eq!(dave.fields.course.as_deref(), Some("2200"));
    }

    #[test]
    fn forward_fill_is_idempotent() {
        let mut once = unpivot(&sample());
        forward_fill(&mut once);

        let mut twice = once.clone();
        forward_fill(&mut twice);

        assert_eq!(once, twice);
    }

    #[test]
    fn every_proctor_lands_in_exactly_one_event() {
        let rows = sample();
        let events = normalize(&rows, &TORONTO, 30).unwrap();
        assert_eq!(events.len(), 2);

        let mut stacked = unpivot(&rows);
        forward_fill(&mut stacked);
        for assigned in &stacked {
            let holders = events
                .iter()
                .filter(|e| Some(&e.course) == assigned.fields.course.as_ref())
                .filter(|e| Some(&e.location) == assigned.fields.location.as_ref())
                .filter(|e| e.proctors.contains(&assigned.proctor))
                .count();
            assert_eq!(holders, 1, "{} on row {}", assigned.proctor, assigned.row);
        }

        let first = &events[0];
        assert_eq!(first.course, "1000");
        assert_eq!(
            first.proctors.iter().map(String::as_str).collect::<Vec<_>>(),
            ["Alice", "Bob", "Carol"]
        );

        let second = &events[1];
        assert_eq!(second.course, "2200");
        assert_eq!(
            second.proctors.iter().map(String::as_str).collect::<Vec<_>>(),
            ["Alice", "Dave"]
        );
    }

    #[test]
    fn start_is_moved_earlier_by_the_offset() {
        let events = normalize(&[exam(4, "1000", &[Some("Alice")])], &TORONTO, 45).unwrap();

        assert_eq!(events[0].start.to_rfc3339(), "2024-07-15T08:15:00-04:00");
        assert_eq!(events[0].end.to_rfc3339(), "2024-07-15T12:00:00-04:00");
    }

    #[test]
    fn offset_across_spring_forward_uses_standard_time() {
        let mut row = exam(4, "1000", &[Some("Alice")]);
        row.date = NaiveDate::from_ymd_opt(2024, 3, 10);
        row.start_time = time(3, 15);

        let events = normalize(&[row], &TORONTO, 30).unwrap();
        assert_eq!(events[0].start.to_rfc3339(), "2024-03-10T01:45:00-05:00");
    }

    #[test]
    fn offset_into_repeated_hour_uses_standard_time() {
        let mut row = exam(4, "1000", &[Some("Alice")]);
        row.date = NaiveDate::from_ymd_opt(2024, 11, 3);
        row.start_time = time(2, 15);

        let events = normalize(&[row], &TORONTO, 30).unwrap();
        assert_eq!(events[0].start.to_rfc3339(), "2024-11-03T01:45:00-05:00");
    }

    #[test]
    fn huge_offset_is_an_error() {
        for minutes in [999_999_999_999, i64::MAX, i64::MIN] {
            assert!(matches!(
                normalize(&[exam(4, "1000", &[Some("Alice")])], &TORONTO, minutes),
                Err(ScheduleError::StartOffsetOutOfRange { row: 4, .. })
            ));
        }
    }

    #[test]
    fn identical_rows_merge() {
        let rows = [
            exam(4, "1000", &[Some("Alice")]),
            exam(5, "1000", &[Some("Bob")]),
            exam(6, "1000", &[Some("Alice")]),
        ];

        let events = normalize(&rows, &TORONTO, 30).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].proctors.len(), 2);
    }

    #[test]
    fn blank_first_row_is_fatal() {
        let mut first = exam(4, "1000", &[Some("Alice")]);
        first.instructor = None;

        assert!(matches!(
            normalize(&[first], &TORONTO, 30),
            Err(ScheduleError::MissingValue {
                row: 4,
                column: "Instructor"
            })
        ));
    }
}
