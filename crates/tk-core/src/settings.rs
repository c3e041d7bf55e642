//! Calendar settings supplied by the orchestration layer.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, NaiveTime, TimeDelta, Weekday};

use crate::rounding::Rounding;
use crate::segment::TimedSegment;

/// A recurring break definition (time-of-day window plus weekdays),
/// instantiated into each newly created day whose weekday matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedBreakTemplate {
    pub name: String,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub weekdays: Vec<Weekday>,
}

impl PlannedBreakTemplate {
    /// Instantiates the template for `date`, or `None` when the weekday
    /// does not match.
    #[must_use]
    pub fn materialize(&self, date: NaiveDate) -> Option<TimedSegment> {
        if !self.weekdays.contains(&date.weekday()) {
            return None;
        }
        Some(TimedSegment::closed(
            self.name.clone(),
            date.and_time(self.start),
            date.and_time(self.end),
        ))
    }
}

/// Settings the calendar store reads at construction. Their persistence
/// (config file, flags) belongs to the caller.
#[derive(Debug, Clone, Default)]
pub struct CalendarSettings {
    pub rounding: Rounding,
    expected_work_week: HashMap<Weekday, TimeDelta>,
    pub planned_breaks: Vec<PlannedBreakTemplate>,
}

impl CalendarSettings {
    #[must_use]
    pub fn new(
        rounding: Rounding,
        expected_work_week: HashMap<Weekday, TimeDelta>,
        planned_breaks: Vec<PlannedBreakTemplate>,
    ) -> Self {
        Self {
            rounding,
            expected_work_week,
            planned_breaks,
        }
    }

    /// Expected work duration for `weekday`, falling back to the built-in
    /// default table when not configured.
    #[must_use]
    pub fn expected_work_day(&self, weekday: Weekday) -> TimeDelta {
        self.expected_work_week
            .get(&weekday)
            .copied()
            .unwrap_or_else(|| default_expected_work_day(weekday))
    }

    pub fn set_expected_work_day(&mut self, weekday: Weekday, duration: TimeDelta) {
        self.expected_work_week.insert(weekday, duration);
    }

    /// All planned breaks that apply to `date`, instantiated as completed
    /// segments.
    #[must_use]
    pub fn planned_breaks_for(&self, date: NaiveDate) -> Vec<TimedSegment> {
        self.planned_breaks
            .iter()
            .filter_map(|template| template.materialize(date))
            .collect()
    }
}

/// Default expected work week: 7h30m Monday–Thursday, 7h Friday, weekends
/// free.
#[must_use]
pub fn default_expected_work_day(weekday: Weekday) -> TimeDelta {
    match weekday {
        Weekday::Mon | Weekday::Tue | Weekday::Wed | Weekday::Thu => TimeDelta::minutes(450),
        Weekday::Fri => TimeDelta::hours(7),
        Weekday::Sat | Weekday::Sun => TimeDelta::zero(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lunch() -> PlannedBreakTemplate {
        PlannedBreakTemplate {
            name: "lunch".into(),
            start: NaiveTime::from_hms_opt(11, 30, 0).unwrap(),
            end: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            weekdays: vec![Weekday::Mon, Weekday::Wed],
        }
    }

    #[test]
    fn materialize_matches_weekday() {
        // 2025-03-10 is a Monday.
        let monday = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let segment = lunch().materialize(monday).unwrap();
        assert!(segment.is_completed());
        assert_eq!(segment.duration(), TimeDelta::minutes(30));

        let tuesday = NaiveDate::from_ymd_opt(2025, 3, 11).unwrap();
        assert_eq!(lunch().materialize(tuesday), None);
    }

    #[test]
    fn expected_work_day_falls_back_to_defaults() {
        let mut settings = CalendarSettings::default();
        assert_eq!(
            settings.expected_work_day(Weekday::Mon),
            TimeDelta::minutes(450)
        );
        assert_eq!(settings.expected_work_day(Weekday::Fri), TimeDelta::hours(7));
        assert_eq!(settings.expected_work_day(Weekday::Sun), TimeDelta::zero());

        settings.set_expected_work_day(Weekday::Mon, TimeDelta::hours(6));
        assert_eq!(settings.expected_work_day(Weekday::Mon), TimeDelta::hours(6));
    }

    #[test]
    fn planned_breaks_for_collects_matching_templates() {
        let settings = CalendarSettings::new(Rounding::None, HashMap::new(), vec![lunch()]);
        let monday = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        assert_eq!(settings.planned_breaks_for(monday).len(), 1);

        let saturday = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        assert!(settings.planned_breaks_for(saturday).is_empty());
    }
}
