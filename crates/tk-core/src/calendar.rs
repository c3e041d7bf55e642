//! The calendar engine: activation state machine, clock transitions, and
//! persistence orchestration.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeDelta, Weekday};

use crate::day::DayRecord;
use crate::month::MonthRecord;
use crate::rounding::{self, Rounding};
use crate::segment::TimedSegment;
use crate::settings::CalendarSettings;
use crate::storage::{self, Storage, StorageError};
use crate::year::YearRecord;

/// What the active session is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// A break is open on the active day.
    OnBreak,
    /// The active day is clocked in and still running.
    Working,
    /// The active day is clocked out and its end has passed.
    DayComplete,
    /// No active day.
    Idle,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::OnBreak => "on break",
            Self::Working => "working",
            Self::DayComplete => "day complete",
            Self::Idle => "idle",
        };
        write!(f, "{text}")
    }
}

/// Owns the loaded Year→Month→Day hierarchy, the active pointer, the
/// rounding policy, and persistence through a [`Storage`] collaborator.
///
/// Activation is strictly nested: a month can be active only while its year
/// is, a day only while its month is. Activating a level lazily loads its
/// children; deactivating persists and evicts them. The active pointer and
/// the on-break flag are session state — they are never persisted and are
/// reconstructed on startup with [`Self::activate_date`].
pub struct CalendarStore<S: Storage> {
    store: S,
    root: PathBuf,
    settings: CalendarSettings,
    years: BTreeMap<i32, YearRecord>,
    active_year_id: Option<i32>,
    active_month_id: Option<u32>,
    active_day_id: Option<u32>,
    on_break: bool,
}

impl<S: Storage> CalendarStore<S> {
    /// Opens a calendar rooted at `root`, loading every year record found
    /// there. Months and days stay unloaded until activated.
    pub fn open(store: S, root: impl Into<PathBuf>, settings: CalendarSettings) -> Result<Self, StorageError> {
        let mut calendar = Self {
            store,
            root: root.into(),
            settings,
            years: BTreeMap::new(),
            active_year_id: None,
            active_month_id: None,
            active_day_id: None,
            on_break: false,
        };
        calendar.load_years()?;
        Ok(calendar)
    }

    // ----- active pointer ---------------------------------------------

    #[must_use]
    pub fn active_year(&self) -> Option<&YearRecord> {
        self.years.get(&self.active_year_id?)
    }

    #[must_use]
    pub fn active_month(&self) -> Option<&MonthRecord> {
        self.active_year()?.month(self.active_month_id?)
    }

    #[must_use]
    pub fn active_day(&self) -> Option<&DayRecord> {
        self.active_month()?.day(self.active_day_id?)
    }

    fn active_year_mut(&mut self) -> Option<&mut YearRecord> {
        let year = self.active_year_id?;
        self.years.get_mut(&year)
    }

    fn active_month_mut(&mut self) -> Option<&mut MonthRecord> {
        let month = self.active_month_id?;
        self.active_year_mut()?.month_mut(month)
    }

    fn active_day_mut(&mut self) -> Option<&mut DayRecord> {
        let day = self.active_day_id?;
        self.active_month_mut()?.day_mut(day)
    }

    #[must_use]
    pub fn is_year_active(&self) -> bool {
        self.active_year().is_some()
    }

    #[must_use]
    pub fn is_month_active(&self) -> bool {
        self.active_month().is_some()
    }

    #[must_use]
    pub fn is_day_active(&self) -> bool {
        self.active_day().is_some()
    }

    /// Whether the active session is mid-break. Session state, re-derived
    /// from the day's break list on activation.
    #[must_use]
    pub const fn is_on_break(&self) -> bool {
        self.on_break
    }

    // ----- activation -------------------------------------------------

    /// Activates a year already present in memory, lazily loading its
    /// months. Returns `false` when the year is unknown.
    pub fn activate_year(&mut self, year: i32) -> Result<bool, StorageError> {
        if !self.years.contains_key(&year) {
            return Ok(false);
        }
        self.active_year_id = Some(year);
        self.load_months()?;
        Ok(true)
    }

    /// Activates a month of the active year, lazily loading its days.
    /// Fails when no year is active or the month is unknown.
    pub fn activate_month(&mut self, month: u32) -> Result<bool, StorageError> {
        if !self.active_year().is_some_and(|y| y.contains_month(month)) {
            return Ok(false);
        }
        self.active_month_id = Some(month);
        self.load_days()?;
        Ok(true)
    }

    /// Activates a day of the active month and re-derives the on-break
    /// flag from its break list.
    pub fn activate_day(&mut self, day: u32) -> bool {
        if !self.active_month().is_some_and(|m| m.contains_day(day)) {
            return false;
        }
        self.active_day_id = Some(day);
        self.on_break = self.active_day().is_some_and(DayRecord::has_open_break);
        true
    }

    /// The explicit startup call: activates year, month, and day for
    /// `date`, stopping at the first level with no stored record.
    pub fn activate_date(&mut self, date: NaiveDate) -> Result<bool, StorageError> {
        if !self.activate_year(date.year())? {
            return Ok(false);
        }
        if !self.activate_month(date.month())? {
            return Ok(false);
        }
        Ok(self.activate_day(date.day()))
    }

    /// Persists everything, then clears the active day pointer.
    pub fn deactivate_day(&mut self) -> Result<(), StorageError> {
        self.update_deficit();
        self.save()?;
        self.active_day_id = None;
        self.on_break = false;
        Ok(())
    }

    /// Persists everything, then evicts the active month's days from
    /// memory and clears the month pointer.
    pub fn deactivate_month(&mut self) -> Result<(), StorageError> {
        self.update_deficit();
        self.save()?;
        self.active_day_id = None;
        self.on_break = false;
        if let Some(month) = self.active_month_mut() {
            month.clear_days();
        }
        self.active_month_id = None;
        Ok(())
    }

    /// Persists everything, then evicts the active year's months and
    /// clears the whole active pointer.
    pub fn deactivate_year(&mut self) -> Result<(), StorageError> {
        self.update_deficit();
        self.save()?;
        self.active_day_id = None;
        self.on_break = false;
        self.active_month_id = None;
        if let Some(year) = self.active_year_mut() {
            year.clear_months();
        }
        self.active_year_id = None;
        Ok(())
    }

    // ----- clock transitions ------------------------------------------

    /// Clocks in at `now`: ensures year, month, and day records exist
    /// (creating and activating as needed), then recomputes aggregates.
    ///
    /// Clocking in on a day that was already clocked out reopens it; the
    /// gap between the old end and `now` becomes a completed break, so
    /// worked time stays honest.
    pub fn clock_in(&mut self, now: NaiveDateTime) -> Result<(), StorageError> {
        let t = self.round(now);
        let date = now.date();

        if !self.years.contains_key(&date.year()) {
            tracing::debug!(year = date.year(), "creating year record");
            self.years.insert(date.year(), YearRecord::new(date.year()));
        }
        self.activate_year(date.year())?;

        if !self.active_year().is_some_and(|y| y.contains_month(date.month())) {
            if let Some(year) = self.active_year_mut() {
                year.add_month(MonthRecord::new(date.month()));
            }
        }
        self.activate_month(date.month())?;

        if self.active_month().is_some_and(|m| m.contains_day(date.day())) {
            self.activate_day(date.day());
            if let Some(day) = self.active_day_mut() {
                if let Some(gap_start) = day.end.take() {
                    tracing::debug!(day = day.id, "re-entry, recording gap as break");
                    day.add_break(TimedSegment::closed("break", gap_start, t));
                }
            }
        } else {
            let expected = self.settings.expected_work_day(t.weekday());
            let planned = self.settings.planned_breaks_for(t.date());
            let mut day = DayRecord::new(date.day());
            day.clock_in(t, expected, planned);
            if let Some(month) = self.active_month_mut() {
                month.add_day(day);
            }
            self.activate_day(date.day());
        }
        self.update_deficit();
        Ok(())
    }

    /// Clocks out the active day at `now`, closing any open break first.
    /// No-op when no day is active.
    pub fn clock_out(&mut self, now: NaiveDateTime) {
        if !self.is_day_active() {
            return;
        }
        if self.on_break {
            self.toggle_break("break", now);
        }
        let t = self.round(now);
        if let Some(day) = self.active_day_mut() {
            day.clock_out(t);
        }
        self.update_deficit();
    }

    /// Opens a break named `name`, or closes the currently open one.
    /// No-op when no day is active.
    pub fn toggle_break(&mut self, name: &str, now: NaiveDateTime) {
        if !self.is_day_active() {
            return;
        }
        let t = self.round(now);
        let mut open = false;
        if let Some(day) = self.active_day_mut() {
            open = day.toggle_break(name, t);
        }
        self.on_break = open;
        self.update_deficit();
    }

    /// Records a back-dated break of `length` ending at `now`.
    pub fn add_break(&mut self, length: TimeDelta, now: NaiveDateTime) {
        if !self.is_day_active() {
            return;
        }
        if let Some(day) = self.active_day_mut() {
            day.add_break(TimedSegment::closed("break", now - length, now));
        }
        self.update_deficit();
    }

    /// Moves the open break's start to `t`; opens a break at `t` when none
    /// is open.
    pub fn set_break_start(&mut self, t: NaiveDateTime) {
        if !self.is_day_active() {
            return;
        }
        let mut open = self.on_break;
        if let Some(day) = self.active_day_mut() {
            if !day.set_break_start(t) {
                open = day.toggle_break("break", t);
            }
        }
        self.on_break = open;
        self.update_deficit();
    }

    /// Ends the open break at `t`. No-op when no break is open.
    pub fn set_break_end(&mut self, t: NaiveDateTime) {
        if !self.on_break {
            return;
        }
        if let Some(day) = self.active_day_mut() {
            day.close_open_break(t);
        }
        self.on_break = false;
        self.update_deficit();
    }

    /// Overrides the active day's clock-in time.
    pub fn set_day_start(&mut self, t: NaiveDateTime) {
        if let Some(day) = self.active_day_mut() {
            day.start = Some(t);
            self.update_deficit();
        }
    }

    /// Overrides the active day's clock-out time.
    pub fn set_day_end(&mut self, t: NaiveDateTime) {
        if let Some(day) = self.active_day_mut() {
            day.end = Some(t);
            self.update_deficit();
        }
    }

    /// Overrides the active day's expected work duration.
    pub fn set_day_expected(&mut self, expected: TimeDelta) {
        if let Some(day) = self.active_day_mut() {
            day.expected = expected;
            self.update_deficit();
        }
    }

    // ----- queries ----------------------------------------------------

    /// Session status at `now`.
    #[must_use]
    pub fn status(&self, now: NaiveDateTime) -> SessionStatus {
        if self.on_break {
            return SessionStatus::OnBreak;
        }
        match self.active_day() {
            Some(day) => {
                if day.is_complete() && day.end.is_some_and(|end| end < now) {
                    SessionStatus::DayComplete
                } else {
                    SessionStatus::Working
                }
            }
            None => SessionStatus::Idle,
        }
    }

    /// All loaded years in calendar order.
    pub fn loaded_years(&self) -> impl Iterator<Item = &YearRecord> {
        self.years.values()
    }

    /// Loaded months of the active year; empty when no year is active.
    #[must_use]
    pub fn loaded_months(&self) -> Vec<&MonthRecord> {
        self.active_year().map_or_else(Vec::new, |y| y.months().collect())
    }

    /// Loaded days of the active month; empty when no month is active.
    #[must_use]
    pub fn loaded_days(&self) -> Vec<&DayRecord> {
        self.active_month().map_or_else(Vec::new, |m| m.days().collect())
    }

    /// Loaded days of the active month still missing a clock event.
    #[must_use]
    pub fn loaded_incomplete_days(&self) -> Vec<&DayRecord> {
        self.loaded_days()
            .into_iter()
            .filter(|day| !day.is_complete())
            .collect()
    }

    /// Years known to storage, parsed from the directory listing without
    /// loading any record.
    pub fn list_known_years(&self) -> Result<Vec<i32>, StorageError> {
        Ok(parse_ids(&self.store.list_files(&self.root)?))
    }

    /// Months of the active year known to storage.
    pub fn list_known_months(&self) -> Result<Vec<u32>, StorageError> {
        let Some(year) = self.active_year().map(|y| y.id) else {
            return Ok(Vec::new());
        };
        let dir = storage::year_dir(&self.root, year);
        Ok(parse_ids(&self.store.list_files(&dir)?))
    }

    /// Days of the active month known to storage.
    pub fn list_known_days(&self) -> Result<Vec<u32>, StorageError> {
        let Some(year) = self.active_year().map(|y| y.id) else {
            return Ok(Vec::new());
        };
        let Some(month) = self.active_month().map(|m| m.id) else {
            return Ok(Vec::new());
        };
        let dir = storage::month_dir(&self.root, year, month);
        Ok(parse_ids(&self.store.list_files(&dir)?))
    }

    // ----- settings ---------------------------------------------------

    #[must_use]
    pub const fn rounding(&self) -> Rounding {
        self.settings.rounding
    }

    pub fn set_rounding(&mut self, rounding: Rounding) {
        self.settings.rounding = rounding;
    }

    #[must_use]
    pub fn expected_work_day(&self, weekday: Weekday) -> TimeDelta {
        self.settings.expected_work_day(weekday)
    }

    pub fn set_expected_work_day(&mut self, weekday: Weekday, duration: TimeDelta) {
        self.settings.set_expected_work_day(weekday, duration);
    }

    /// Planned breaks that would populate a new day on `date`.
    #[must_use]
    pub fn planned_breaks(&self, date: NaiveDate) -> Vec<TimedSegment> {
        self.settings.planned_breaks_for(date)
    }

    // ----- persistence ------------------------------------------------

    /// Recomputes every loaded aggregate bottom-up.
    pub fn update_deficit(&mut self) {
        for year in self.years.values_mut() {
            year.update_status();
        }
    }

    /// Serializes every loaded year, month, and day to its path. O(loaded
    /// records), not O(changed records); write frequency is low enough
    /// that dirty tracking is not worth carrying.
    pub fn save(&self) -> Result<(), StorageError> {
        for year in self.years.values() {
            self.store
                .write(&storage::year_file(&self.root, year.id), year)?;
            for month in year.months() {
                self.store
                    .write(&storage::month_file(&self.root, year.id, month.id), month)?;
                for day in month.days() {
                    self.store.write(
                        &storage::day_file(&self.root, year.id, month.id, day.id),
                        day,
                    )?;
                }
            }
        }
        tracing::debug!(years = self.years.len(), "saved calendar");
        Ok(())
    }

    fn round(&self, t: NaiveDateTime) -> NaiveDateTime {
        rounding::round(t, self.settings.rounding)
    }

    fn load_years(&mut self) -> Result<(), StorageError> {
        for stem in self.store.list_files(&self.root)? {
            let Ok(year_id) = stem.parse::<i32>() else {
                continue;
            };
            let path = storage::year_file(&self.root, year_id);
            let mut year: YearRecord = self.store.read(&path)?;
            if year.id == 0 {
                year.id = year_id;
            }
            self.years.insert(year.id, year);
        }
        tracing::debug!(count = self.years.len(), "loaded years");
        Ok(())
    }

    /// Loads the active year's months unless they are already in memory.
    fn load_months(&mut self) -> Result<(), StorageError> {
        let Some(year_id) = self.active_year_id else {
            return Ok(());
        };
        if self.active_year().is_some_and(|y| !y.is_empty()) {
            return Ok(());
        }
        let dir = storage::year_dir(&self.root, year_id);
        if !self.store.dir_exists(&dir) {
            return Ok(());
        }
        let mut records = Vec::new();
        for stem in self.store.list_files(&dir)? {
            let Ok(month_id) = stem.parse::<u32>() else {
                continue;
            };
            let path = storage::month_file(&self.root, year_id, month_id);
            let mut month: MonthRecord = self.store.read(&path)?;
            if month.id == 0 {
                month.id = month_id;
            }
            records.push(month);
        }
        let count = records.len();
        if let Some(year) = self.years.get_mut(&year_id) {
            for month in records {
                year.add_month(month);
            }
        }
        tracing::debug!(year = year_id, count, "loaded months");
        Ok(())
    }

    /// Loads the active month's days unless they are already in memory,
    /// applying the load-time migrations: a missing day id is recovered
    /// from the file name, and a zero expected duration on a started day
    /// is recomputed from the weekday table.
    fn load_days(&mut self) -> Result<(), StorageError> {
        let (Some(year_id), Some(month_id)) = (self.active_year_id, self.active_month_id) else {
            return Ok(());
        };
        if self.active_month().is_some_and(|m| !m.is_empty()) {
            return Ok(());
        }
        let dir = storage::month_dir(&self.root, year_id, month_id);
        if !self.store.dir_exists(&dir) {
            return Ok(());
        }
        let mut records = Vec::new();
        for stem in self.store.list_files(&dir)? {
            let Ok(file_id) = stem.parse::<u32>() else {
                continue;
            };
            let path = storage::day_file(&self.root, year_id, month_id, file_id);
            let mut day: DayRecord = self.store.read(&path)?;
            if day.id == 0 {
                day.id = file_id;
            }
            match day.start {
                Some(start) if day.expected == TimeDelta::zero() => {
                    day.expected = self.settings.expected_work_day(start.weekday());
                }
                _ => {}
            }
            day.restore_open_break();
            records.push(day);
        }
        let count = records.len();
        if let Some(month) = self.active_month_mut() {
            for day in records {
                month.add_day(day);
            }
        }
        tracing::debug!(year = year_id, month = month_id, count, "loaded days");
        Ok(())
    }
}

fn parse_ids<T: std::str::FromStr + Ord>(stems: &[String]) -> Vec<T> {
    let mut ids: Vec<T> = stems.iter().filter_map(|s| s.parse().ok()).collect();
    ids.sort_unstable();
    ids
}
