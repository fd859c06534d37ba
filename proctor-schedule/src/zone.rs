//! The fixed local timezone every exam is scheduled in.
//!
//! Only America/Toronto is supported. Its current DST rules are encoded
//! directly so the same definition drives both offset resolution and the
//! VTIMEZONE block written into each calendar.

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
    Weekday,
};

use crate::{Result, ScheduleError};

/// One half of a yearly DST rule: the offset that applies from the
/// `nth` Sunday of `month` at `hour` local time.
#[derive(Debug, Clone, Copy)]
pub struct Transition {
    pub abbreviation: &'static str,
    pub offset_secs: i32,
    pub month: u32,
    pub nth_sunday: u8,
    pub hour: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct Zone {
    pub name: &'static str,
    pub standard: Transition,
    pub daylight: Transition,
}

pub const TORONTO: Zone = Zone {
    name: "America/Toronto",
    standard: Transition {
        abbreviation: "EST",
        offset_secs: -5 * 3600,
        month: 11,
        nth_sunday: 1,
        hour: 2,
    },
    daylight: Transition {
        abbreviation: "EDT",
        offset_secs: -4 * 3600,
        month: 3,
        nth_sunday: 2,
        hour: 2,
    },
};

impl Transition {
    fn local_start(&self, year: i32) -> Option<NaiveDateTime> {
        let day =
            NaiveDate::from_weekday_of_month_opt(year, self.month, Weekday::Sun, self.nth_sunday)?;
        Some(day.and_time(NaiveTime::from_hms_opt(self.hour, 0, 0)?))
    }

    fn offset(&self) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.offset_secs)
    }

    /// RFC 5545 UTC offset notation, e.g. `-0500`.
    pub fn offset_string(&self) -> String {
        let sign = if self.offset_secs < 0 { '-' } else { '+' };
        let secs = self.offset_secs.abs();
        format!("{sign}{:02}{:02}", secs / 3600, secs % 3600 / 60)
    }

    /// The rule's first onset, in the 1970 form VTIMEZONE expects.
    pub fn dtstart(&self) -> String {
        self.local_start(1970)
            .map(|start| start.format("%Y%m%dT%H%M%S").to_string())
            .unwrap_or_default()
    }

    pub fn rrule(&self) -> String {
        format!("FREQ=YEARLY;BYMONTH={};BYDAY={}SU", self.month, self.nth_sunday)
    }
}

impl Zone {
    /// Resolves a wall-clock time to an instant in this zone.
    ///
    /// Times skipped by the spring-forward jump are rejected. Times repeated
    /// by the fall-back jump resolve to the earlier (daylight) instant.
    pub fn localize(&self, local: NaiveDateTime) -> Result<DateTime<FixedOffset>> {
        let invalid = || ScheduleError::InvalidLocalTime(local);
        let year = local.year();

        let dst_start = self.daylight.local_start(year).ok_or_else(invalid)?;
        let dst_end = self.standard.local_start(year).ok_or_else(invalid)?;
        let gap = Duration::seconds(i64::from(
            self.daylight.offset_secs - self.standard.offset_secs,
        ));

        let transition = if local >= dst_start && local < dst_start + gap {
            return Err(invalid());
        } else if local >= dst_start && local < dst_end {
            &self.daylight
        } else {
            &self.standard
        };

        transition
            .offset()
            .and_then(|offset| offset.from_local_datetime(&local).single())
            .ok_or_else(invalid)
    }

    /// Expresses an instant with the offset in force at that instant.
    ///
    /// Shifting a zoned time keeps its old offset, which is wrong once the
    /// shift crosses a DST switch. Re-anchoring through this fixes the
    /// wall-clock reading.
    pub fn from_utc(&self, instant: DateTime<Utc>) -> Option<DateTime<FixedOffset>> {
        let utc = instant.naive_utc();
        let year = utc
            .checked_add_signed(Duration::seconds(i64::from(self.standard.offset_secs)))?
            .year();

        let dst_start = self.daylight.local_start(year)?
            - Duration::seconds(i64::from(self.standard.offset_secs));
        let dst_end = self.standard.local_start(year)?
            - Duration::seconds(i64::from(self.daylight.offset_secs));

        let transition = if utc >= dst_start && utc < dst_end {
            &self.daylight
        } else {
            &self.standard
        };
        Some(instant.with_timezone(&transition.offset()?))
    }
}
