//! Double-booking detection.
//!
//! A proctor is double-booked when one assignment starts before another,
//! is still running when the other begins, and is in a different place.
//! The test is one-sided: a pair is only reported from the side of the
//! assignment that starts first, so two sittings with identical start
//! times are never flagged.

use chrono::{DateTime, FixedOffset, NaiveDate};

use crate::NormalizedEvent;

/// One proctor's share of a sitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment<'a> {
    pub proctor: &'a str,
    pub event: &'a NormalizedEvent,
}

impl<'a> Assignment<'a> {
    pub fn start(&self) -> DateTime<FixedOffset> {
        self.event.start
    }

    pub fn end(&self) -> DateTime<FixedOffset> {
        self.event.end
    }

    pub fn location(&self) -> &'a str {
        &self.event.location
    }

    /// `"<course>-<section>"`, as printed in warnings.
    pub fn label(&self) -> String {
        format!("{}-{}", self.event.course, self.event.section)
    }

    fn overlaps_later(&self, other: &Assignment) -> bool {
        self.proctor == other.proctor
            && self.start() < other.start()
            && self.end() > other.start()
            && self.location() != other.location()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conflict<'a> {
    /// The assignment that starts first.
    pub first: Assignment<'a>,
    pub second: Assignment<'a>,
}

impl Conflict<'_> {
    pub fn proctor(&self) -> &str {
        self.first.proctor
    }

    pub fn date(&self) -> NaiveDate {
        self.first.event.date
    }
}

/// One assignment per proctor per event.
pub fn assignments(events: &[NormalizedEvent]) -> impl Iterator<Item = Assignment<'_>> + Clone {
    events.iter().flat_map(|event| {
        event.proctors.iter().map(move |proctor| Assignment {
            proctor,
            event,
        })
    })
}

/// Lazily yields every double-booking in `events`. This is a plain
/// self-join, quadratic in the number of assignments.
pub fn double_bookings(events: &[NormalizedEvent]) -> impl Iterator<Item = Conflict<'_>> {
    let all = assignments(events);
    all.clone().flat_map(move |first| {
        all.clone()
            .filter(move |second| first.overlaps_later(second))
            .map(move |second| Conflict { first, second })
    })
}
