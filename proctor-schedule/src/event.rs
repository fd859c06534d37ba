use uuid::Uuid;

use crate::buildings::Abbreviations;
use crate::{CalendarEvent, NormalizedEvent};

pub const SUMMARY: &str = "Proctoring";

/// Subject value the registrar uses for make-up sittings, which carry no
/// meaningful course details.
pub const MAKE_UP_SUBJECT: &str = "Make-up Exam";

impl NormalizedEvent {
    /// The building part of `"BUILDING-ROOM"` locations.
    pub fn building(&self) -> &str {
        self.location.split('-').next().unwrap_or_default()
    }

    pub fn proctor_list(&self) -> String {
        self.proctors
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn description(&self, abbreviations: &Abbreviations) -> String {
        if self.subject == MAKE_UP_SUBJECT {
            return format!("Make-up exam\nProctors: {}", self.proctor_list());
        }

        format!(
            "{} {}-{} for {}, {} students\nProctors: {}\nBuilding: {}",
            self.subject,
            self.course,
            self.section,
            self.instructor,
            self.students_enrolled,
            self.proctor_list(),
            abbreviations.substitute(self.building()),
        )
    }
}

impl CalendarEvent {
    /// Builds the calendar entry for one sitting. Every call draws a new
    /// random UID, so rebuilding the same schedule yields different UIDs.
    pub fn build(event: &NormalizedEvent, abbreviations: &Abbreviations) -> Self {
        Self {
            uid: Uuid::new_v4().to_string(),
            summary: SUMMARY.to_string(),
            description: event.description(abbreviations),
            location: event.location.clone(),
            dtstart: event.start,
            dtend: event.end,
        }
    }
}
