use chrono::{DateTime, FixedOffset, Utc};
use ics::{
    escape_text,
    parameters::TzIDParam,
    properties::{Description, DtEnd, DtStart, Location, RRule, Summary, TzName},
    Daylight, ICalendar, Standard, TimeZone,
};

use crate::calendar::CalendarSet;
use crate::zone::Zone;
use crate::CalendarEvent;

/// Which calendar of a [`CalendarSet`] a rendered file holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Audience {
    Everyone,
    Proctor(String),
}

/// A fully rendered `.ics` file, ready to be written.
#[derive(Debug, Clone)]
pub struct IcsFile {
    pub audience: Audience,
    pub file_name: String,
    pub contents: String,
}

fn local_stamp(instant: &DateTime<FixedOffset>) -> String {
    instant.naive_local().format("%Y%m%dT%H%M%S").to_string()
}

impl Zone {
    #[must_use]
    pub fn to_ics(&self) -> TimeZone<'static> {
        let mut standard = Standard::new(
            self.standard.dtstart(),
            self.daylight.offset_string(),
            self.standard.offset_string(),
        );
        standard.push(TzName::new(self.standard.abbreviation));
        standard.push(RRule::new(self.standard.rrule()));

        let mut daylight = Daylight::new(
            self.daylight.dtstart(),
            self.standard.offset_string(),
            self.daylight.offset_string(),
        );
        daylight.push(TzName::new(self.daylight.abbreviation));
        daylight.push(RRule::new(self.daylight.rrule()));

        let mut timezone = TimeZone::daylight(self.name, daylight);
        timezone.add_standard(standard);

        timezone
    }
}

impl CalendarEvent {
    /// Start and end are written as wall-clock times qualified by the
    /// zone's TZID.
    #[must_use]
    pub fn to_ics(&self, zone: &Zone, stamp: DateTime<Utc>) -> ics::Event<'_> {
        let mut ics_event = ics::Event::new(&self.uid, stamp.format("%Y%m%dT%H%M%SZ").to_string());

        let mut start = DtStart::new(local_stamp(&self.dtstart));
        start.add(TzIDParam::new(zone.name));

        let mut end = DtEnd::new(local_stamp(&self.dtend));
        end.add(TzIDParam::new(zone.name));

        ics_event.push(start);
        ics_event.push(end);
        ics_event.push(Summary::new(escape_text(self.summary.as_str())));
        ics_event.push(Description::new(escape_text(self.description.as_str())));
        ics_event.push(Location::new(escape_text(self.location.as_str())));

        ics_event
    }
}

/// Renders `events` as one calendar named `name`.
pub fn render(name: &str, events: &[CalendarEvent], zone: &Zone, stamp: DateTime<Utc>) -> String {
    let mut icalendar = ICalendar::new("2.0", name);
    icalendar.add_timezone(zone.to_ics());

    for event in events {
        icalendar.add_event(event.to_ics(zone, stamp));
    }

    icalendar.to_string()
}

impl CalendarSet {
    /// Renders the aggregate calendar first, then one per proctor in name
    /// order. Nothing touches the disk here.
    pub fn to_ics_files(&self, zone: &Zone, stamp: DateTime<Utc>) -> Vec<IcsFile> {
        let aggregate = IcsFile {
            audience: Audience::Everyone,
            file_name: self.aggregate_file_name(),
            contents: render(&self.aggregate_name(), &self.aggregate, zone, stamp),
        };

        let proctors = self
            .by_proctor
            .iter()
            .zip(self.proctor_file_names())
            .map(|((proctor, events), file_name)| IcsFile {
                audience: Audience::Proctor(proctor.clone()),
                file_name,
                contents: render(&self.proctor_name(proctor), events, zone, stamp),
            });

        std::iter::once(aggregate).chain(proctors).collect()
    }
}
