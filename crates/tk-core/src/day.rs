//! A single calendar day's clock and break bookkeeping.

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::segment::TimedSegment;

/// One calendar day: clock-in/out times, breaks, and the expected work
/// duration they are measured against.
///
/// The open-break rule is a two-state machine: at most one break is open at
/// a time, and it is always the *last* element of `breaks`. The index is
/// tracked explicitly instead of re-scanning the list, and is session state
/// only — it is re-derived after deserialization, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayRecord {
    /// Day of month. Older files may omit this; the loader recovers it from
    /// the file name.
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub start: Option<NaiveDateTime>,
    #[serde(default)]
    pub end: Option<NaiveDateTime>,
    #[serde(default)]
    pub breaks: Vec<TimedSegment>,
    /// Expected work duration for this day, looked up per weekday at
    /// clock-in.
    #[serde(with = "crate::duration_serde", default = "TimeDelta::zero")]
    pub expected: TimeDelta,
    #[serde(skip)]
    open_break: Option<usize>,
}

impl DayRecord {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self {
            id,
            start: None,
            end: None,
            breaks: Vec::new(),
            expected: TimeDelta::zero(),
            open_break: None,
        }
    }

    /// Both clock events recorded.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    /// Records the first clock-in of the day: start time (already rounded
    /// by the caller), the weekday's expected duration, and any planned
    /// breaks instantiated for this date. No-op when already clocked in;
    /// same-day re-entry is an orchestration decision.
    pub fn clock_in(&mut self, start: NaiveDateTime, expected: TimeDelta, planned: Vec<TimedSegment>) {
        if self.start.is_some() {
            return;
        }
        self.start = Some(start);
        self.expected = expected;
        self.breaks.extend(planned);
        self.restore_open_break();
    }

    /// Records clock-out. Idempotent: calling again moves the end. No-op
    /// without a clock-in.
    pub fn clock_out(&mut self, end: NaiveDateTime) {
        if self.start.is_some() {
            self.end = Some(end);
        }
    }

    /// Closes the open break at `t`, or opens a new one named `name`.
    /// Returns whether a break is open afterwards. No-op without a
    /// clock-in.
    pub fn toggle_break(&mut self, name: &str, t: NaiveDateTime) -> bool {
        if self.start.is_none() {
            return false;
        }
        match self.open_break.take() {
            Some(index) => {
                if let Some(open) = self.breaks.get_mut(index) {
                    open.mark_end(t);
                }
                false
            }
            None => {
                self.breaks.push(TimedSegment::open(name, t));
                self.open_break = Some(self.breaks.len() - 1);
                true
            }
        }
    }

    /// Appends a segment directly, e.g. a back-dated break or the gap
    /// between a clock-out and a same-day re-entry.
    pub fn add_break(&mut self, segment: TimedSegment) {
        self.breaks.push(segment);
        if !self.breaks[self.breaks.len() - 1].is_completed() {
            self.open_break = Some(self.breaks.len() - 1);
        }
    }

    /// Moves the open break's start. Returns `false` when no break is open.
    pub fn set_break_start(&mut self, t: NaiveDateTime) -> bool {
        match self.open_break.and_then(|i| self.breaks.get_mut(i)) {
            Some(open) => {
                open.start = Some(t);
                true
            }
            None => false,
        }
    }

    /// Ends the open break at `t`. Returns `false` when no break is open.
    pub fn close_open_break(&mut self, t: NaiveDateTime) -> bool {
        match self.open_break.take() {
            Some(index) => {
                if let Some(open) = self.breaks.get_mut(index) {
                    open.end = Some(t);
                }
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub const fn has_open_break(&self) -> bool {
        self.open_break.is_some()
    }

    #[must_use]
    pub fn open_break(&self) -> Option<&TimedSegment> {
        self.open_break.and_then(|i| self.breaks.get(i))
    }

    /// Re-derives the open-break index after deserialization. Only the last
    /// break can be open; anything earlier left unclosed is treated as
    /// closed data damage and ignored.
    pub fn restore_open_break(&mut self) {
        self.open_break = match self.breaks.last() {
            Some(last) if !last.is_completed() => Some(self.breaks.len() - 1),
            _ => None,
        };
    }

    /// Elapsed day length: end−start once complete, running against `now`
    /// until then. Zero before clock-in.
    #[must_use]
    pub fn duration(&self, now: NaiveDateTime) -> TimeDelta {
        match (self.start, self.end) {
            (Some(start), Some(end)) => end - start,
            (Some(start), None) => now - start,
            _ => TimeDelta::zero(),
        }
    }

    /// Sum of completed breaks. The open break does not count until closed.
    #[must_use]
    pub fn total_breaks(&self) -> TimeDelta {
        self.breaks
            .iter()
            .filter(|b| b.is_completed())
            .fold(TimeDelta::zero(), |acc, b| acc + b.duration())
    }

    /// Worked time. Uses `now` as a live estimate while the day is open.
    #[must_use]
    pub fn worked(&self, now: NaiveDateTime) -> TimeDelta {
        self.duration(now) - self.total_breaks()
    }

    /// Worked minus expected; negative means under-worked.
    #[must_use]
    pub fn deficit(&self, now: NaiveDateTime) -> TimeDelta {
        self.worked(now) - self.expected
    }

    /// Final worked time, available only once the day is complete. Month
    /// aggregation uses this so live estimates never leak into cached
    /// aggregates.
    #[must_use]
    pub fn completed_worked(&self) -> Option<TimeDelta> {
        let start = self.start?;
        let end = self.end?;
        Some((end - start) - self.total_breaks())
    }
}
