//! Turns an exam-proctoring spreadsheet into iCalendar files.
//!
//! ```text
//! sheet::read_schedule → normalize::normalize → CalendarSet::assemble → CalendarSet::to_ics_files
//!                                      └──────→ conflicts::double_bookings
//! ```

pub mod buildings;
pub mod calendar;
pub mod conflicts;
mod error;
mod event;
pub mod normalize;
pub mod sheet;
mod structs;
pub mod zone;

#[cfg(feature = "ics")]
pub mod ics;

pub use buildings::Abbreviations;
pub use calendar::CalendarSet;
pub use error::{Result, ScheduleError};
pub use event::{MAKE_UP_SUBJECT, SUMMARY};
pub use structs::{BuildingAbbreviation, CalendarEvent, NormalizedEvent, RawRow};
