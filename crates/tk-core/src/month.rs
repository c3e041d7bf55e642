//! Month-level aggregation over day records.

use std::collections::BTreeMap;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::day::DayRecord;

/// One calendar month.
///
/// Day records live in their own files, so the day map is never serialized;
/// only the identifier and the cached aggregates are. Aggregates are pure
/// functions of the children and are recomputed bottom-up after every
/// mutation, never patched incrementally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthRecord {
    /// Month number, 1–12.
    #[serde(default)]
    pub id: u32,
    #[serde(skip)]
    days: BTreeMap<u32, DayRecord>,
    #[serde(with = "crate::duration_serde", default = "TimeDelta::zero")]
    pub deficit: TimeDelta,
    #[serde(with = "crate::duration_serde", default = "TimeDelta::zero")]
    pub worked: TimeDelta,
    #[serde(with = "crate::duration_serde", default = "TimeDelta::zero")]
    pub average_work_day: TimeDelta,
}

impl MonthRecord {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self {
            id,
            days: BTreeMap::new(),
            deficit: TimeDelta::zero(),
            worked: TimeDelta::zero(),
            average_work_day: TimeDelta::zero(),
        }
    }

    #[must_use]
    pub fn contains_day(&self, id: u32) -> bool {
        self.days.contains_key(&id)
    }

    #[must_use]
    pub fn day(&self, id: u32) -> Option<&DayRecord> {
        self.days.get(&id)
    }

    pub fn day_mut(&mut self, id: u32) -> Option<&mut DayRecord> {
        self.days.get_mut(&id)
    }

    /// Loaded days in calendar order.
    pub fn days(&self) -> impl Iterator<Item = &DayRecord> {
        self.days.values()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Upserts a day by id and refreshes the cached aggregates.
    pub fn add_day(&mut self, day: DayRecord) {
        self.days.insert(day.id, day);
        self.update_status();
    }

    /// Evicts all loaded days. Storage is untouched; this is the lazy
    /// unload half of deactivation.
    pub fn clear_days(&mut self) {
        self.days.clear();
    }

    /// Recomputes deficit, worked time, and the average work day from
    /// complete days only. The average keeps its previous value while no
    /// day is complete, so it is never divided by zero.
    ///
    /// With no days loaded the cached values are the truth (the days may
    /// simply be evicted), so the recompute leaves them alone.
    pub fn update_status(&mut self) {
        if self.days.is_empty() {
            return;
        }
        let mut deficit = TimeDelta::zero();
        let mut worked = TimeDelta::zero();
        let mut completed = 0i32;
        for day in self.days.values() {
            if let Some(day_worked) = day.completed_worked() {
                worked = worked + day_worked;
                deficit = deficit + (day_worked - day.expected);
                completed += 1;
            }
        }
        self.deficit = deficit;
        self.worked = worked;
        if completed > 0 {
            self.average_work_day = worked / completed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn complete_day(id: u32, hours: i64) -> DayRecord {
        let mut day = DayRecord::new(id);
        day.clock_in(at(id, 8, 0), TimeDelta::minutes(450), Vec::new());
        day.clock_out(at(id, 8, 0) + TimeDelta::hours(hours));
        day
    }

    #[test]
    fn only_complete_days_contribute() {
        let mut month = MonthRecord::new(3);
        month.add_day(complete_day(10, 8));
        let mut open = DayRecord::new(11);
        open.clock_in(at(11, 8, 0), TimeDelta::minutes(450), Vec::new());
        month.add_day(open);

        assert_eq!(month.worked, TimeDelta::hours(8));
        assert_eq!(month.deficit, TimeDelta::minutes(30));
        assert_eq!(month.average_work_day, TimeDelta::hours(8));
    }

    #[test]
    fn average_is_worked_over_complete_count() {
        let mut month = MonthRecord::new(3);
        month.add_day(complete_day(10, 8));
        month.add_day(complete_day(11, 6));
        assert_eq!(month.average_work_day, TimeDelta::hours(7));
    }

    #[test]
    fn average_keeps_prior_value_with_zero_complete_days() {
        let mut month = MonthRecord::new(3);
        month.add_day(complete_day(10, 8));
        assert_eq!(month.average_work_day, TimeDelta::hours(8));

        month.clear_days();
        let mut open = DayRecord::new(11);
        open.clock_in(at(11, 8, 0), TimeDelta::minutes(450), Vec::new());
        month.add_day(open);

        assert_eq!(month.worked, TimeDelta::zero());
        assert_eq!(month.average_work_day, TimeDelta::hours(8));
    }

    #[test]
    fn update_status_keeps_cache_while_days_are_evicted() {
        let mut month = MonthRecord::new(3);
        month.add_day(complete_day(10, 8));
        assert_eq!(month.worked, TimeDelta::hours(8));

        month.clear_days();
        month.update_status();
        assert_eq!(month.worked, TimeDelta::hours(8));
        assert_eq!(month.deficit, TimeDelta::minutes(30));
    }

    #[test]
    fn add_day_replaces_by_id() {
        let mut month = MonthRecord::new(3);
        month.add_day(complete_day(10, 8));
        month.add_day(complete_day(10, 6));
        assert_eq!(month.days().count(), 1);
        assert_eq!(month.worked, TimeDelta::hours(6));
    }

    #[test]
    fn day_map_is_not_serialized() {
        let mut month = MonthRecord::new(3);
        month.add_day(complete_day(10, 8));
        let json = serde_json::to_string(&month).unwrap();
        assert!(!json.contains("breaks"));

        let parsed: MonthRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, 3);
        assert!(parsed.is_empty());
        assert_eq!(parsed.worked, TimeDelta::hours(8));
    }
}
