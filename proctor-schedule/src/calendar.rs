use std::collections::{BTreeMap, HashSet};

use crate::buildings::Abbreviations;
use crate::{CalendarEvent, NormalizedEvent, Result, ScheduleError};

/// Every calendar produced from one schedule.
#[derive(Debug, Clone)]
pub struct CalendarSet {
    /// `YYYY-MM` of the earliest exam date.
    pub period: String,
    /// One event per sitting.
    pub aggregate: Vec<CalendarEvent>,
    /// Each proctor's own sittings, keyed by name.
    pub by_proctor: BTreeMap<String, Vec<CalendarEvent>>,
}

impl CalendarSet {
    /// Builds one event per sitting and files a copy of it under each of
    /// its proctors. The copies share the aggregate event's UID.
    pub fn assemble(events: &[NormalizedEvent], abbreviations: &Abbreviations) -> Result<Self> {
        let first_date = events
            .iter()
            .map(|event| event.date)
            .min()
            .ok_or(ScheduleError::EmptySchedule)?;

        let mut aggregate = Vec::with_capacity(events.len());
        let mut by_proctor = BTreeMap::<String, Vec<CalendarEvent>>::new();

        for event in events {
            let built = CalendarEvent::build(event, abbreviations);
            for proctor in &event.proctors {
                by_proctor
                    .entry(proctor.clone())
                    .or_default()
                    .push(built.clone());
            }
            aggregate.push(built);
        }

        Ok(Self {
            period: first_date.format("%Y-%m").to_string(),
            aggregate,
            by_proctor,
        })
    }

    /// `<period>_proctoring.ics`
    pub fn aggregate_file_name(&self) -> String {
        format!("{}_proctoring.ics", self.period)
    }

    /// `<period>_<proctor>_proctoring.ics`, with path separators in the
    /// name replaced so the file stays inside its directory.
    pub fn proctor_file_name(&self, proctor: &str) -> String {
        format!("{}_{}_proctoring.ics", self.period, file_safe(proctor))
    }

    /// File names for every proctor calendar, in `by_proctor` order.
    ///
    /// Names that only differ by path separators would share a file, so
    /// later ones get a numeric suffix instead of overwriting.
    pub fn proctor_file_names(&self) -> Vec<String> {
        let mut taken = HashSet::from([self.aggregate_file_name()]);

        self.by_proctor
            .keys()
            .map(|proctor| {
                let mut file_name = self.proctor_file_name(proctor);
                let mut suffix = 1;
                while taken.contains(&file_name) {
                    suffix += 1;
                    file_name = format!(
                        "{}_{}_{suffix}_proctoring.ics",
                        self.period,
                        file_safe(proctor)
                    );
                }
                if suffix > 1 {
                    tracing::warn!(
                        proctor = %proctor,
                        file = %file_name,
                        "proctor file name already in use, writing to a numbered file"
                    );
                }
                taken.insert(file_name.clone());
                file_name
            })
            .collect()
    }

    /// Calendar title for the aggregate file.
    pub fn aggregate_name(&self) -> String {
        format!("Proctoring {}", self.period)
    }

    pub fn proctor_name(&self, proctor: &str) -> String {
        format!("Proctoring {} ({})", self.period, proctor)
    }
}

fn file_safe(proctor: &str) -> String {
    proctor.replace(['/', '\\'], "_")
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::NaiveDate;

    use super::*;
    use crate::zone::TORONTO;

    fn sitting(day: u32, month: u32, proctors: &[&str]) -> NormalizedEvent {
        let date = NaiveDate::from_ymd_opt(2024, month, day).unwrap();
        NormalizedEvent {
            date,
            start: TORONTO.localize(date.and_hms_opt(8, 30, 0).unwrap()).unwrap(),
            end: TORONTO.localize(date.and_hms_opt(12, 0, 0).unwrap()).unwrap(),
            location: "NCB-113".to_string(),
            subject: "Calculus".to_string(),
            course: format!("10{day:02}"),
            section: "001".to_string(),
            instructor: "Dr. Smith".to_string(),
            students_enrolled: "120".to_string(),
            proctors: proctors.iter().map(|p| p.to_string()).collect::<BTreeSet<_>>(),
        }
    }

    fn schedule() -> Vec<NormalizedEvent> {
        vec![
            sitting(22, 7, &["Alice", "Bob"]),
            sitting(8, 7, &["Alice"]),
            sitting(30, 7, &["Alice", "Bob", "Carol"]),
        ]
    }

    #[test]
    fn aggregate_has_one_event_per_sitting() {
        let set = CalendarSet::assemble(&schedule(), &Abbreviations::default()).unwrap();
        assert_eq!(set.aggregate.len(), 3);
    }

    #[test]
    fn per_proctor_counts_match_assignments() {
        let events = schedule();
        let set = CalendarSet::assemble(&events, &Abbreviations::default()).unwrap();

        let total = set.by_proctor.values().map(Vec::len).sum::<usize>();
        let expected = events.iter().map(|e| e.proctors.len()).sum::<usize>();
        assert_eq!(total, expected);

        assert_eq!(set.by_proctor["Alice"].len(), 3);
        assert_eq!(set.by_proctor["Bob"].len(), 2);
        assert_eq!(set.by_proctor["Carol"].len(), 1);
    }

    #[test]
    fn proctor_copies_share_uids() {
        let set = CalendarSet::assemble(&schedule(), &Abbreviations::default()).unwrap();
        let carol = &set.by_proctor["Carol"][0];

        assert!(set.aggregate.iter().any(|event| event == carol));
    }

    #[test]
    fn file_names_use_earliest_month() {
        let set = CalendarSet::assemble(&schedule(), &Abbreviations::default()).unwrap();

        assert_eq!(set.period, "2024-07");
        assert_eq!(set.aggregate_file_name(), "2024-07_proctoring.ics");
        assert_eq!(set.proctor_file_name("Alice"), "2024-07_Alice_proctoring.ics");
    }

    #[test]
    fn period_spans_months_from_minimum_date() {
        let events = vec![sitting(2, 8, &["Alice"]), sitting(28, 7, &["Bob"])];
        let set = CalendarSet::assemble(&events, &Abbreviations::default()).unwrap();
        assert_eq!(set.period, "2024-07");
    }

    #[test]
    fn slashes_in_names_are_replaced() {
        let set = CalendarSet::assemble(&schedule(), &Abbreviations::default()).unwrap();
        assert_eq!(set.proctor_file_name("A/B"), "2024-07_A_B_proctoring.ics");
    }

    #[test]
    fn colliding_file_names_get_a_suffix() {
        let events = vec![sitting(8, 7, &["A/B", "A_B", "A\\B", "Carol"])];
        let set = CalendarSet::assemble(&events, &Abbreviations::default()).unwrap();

        assert_eq!(
            set.proctor_file_names(),
            [
                "2024-07_A_B_proctoring.ics",
                "2024-07_A_B_2_proctoring.ics",
                "2024-07_A_B_3_proctoring.ics",
                "2024-07_Carol_proctoring.ics",
            ]
        );
    }

    #[test]
    fn empty_schedule_is_an_error() {
        assert!(matches!(
            CalendarSet::assemble(&[], &Abbreviations::default()),
            Err(ScheduleError::EmptySchedule)
        ));
    }
}
