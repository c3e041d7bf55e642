//! Timed segments: breaks and planned-break instances.

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

/// A named start/end interval within a day, usually a break.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedSegment {
    pub name: String,
    #[serde(default)]
    pub start: Option<NaiveDateTime>,
    #[serde(default)]
    pub end: Option<NaiveDateTime>,
}

impl TimedSegment {
    /// An open segment that started at `start`.
    pub fn open(name: impl Into<String>, start: NaiveDateTime) -> Self {
        Self {
            name: name.into(),
            start: Some(start),
            end: None,
        }
    }

    /// A completed segment.
    pub fn closed(name: impl Into<String>, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            name: name.into(),
            start: Some(start),
            end: Some(end),
        }
    }

    /// Closes the segment at `t`. Ending an already-closed segment is a
    /// caller logic error and is ignored.
    pub fn mark_end(&mut self, t: NaiveDateTime) {
        if self.end.is_none() {
            self.end = Some(t);
        }
    }

    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    /// Wall time covered by the segment. Zero until both ends are known;
    /// only completed segments feed into day aggregates.
    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        match (self.start, self.end) {
            (Some(start), Some(end)) => end - start,
            _ => TimeDelta::zero(),
        }
    }

    /// Live length of the segment: time since start while it is open, the
    /// final duration once closed. For display only, never summed.
    #[must_use]
    pub fn elapsed(&self, now: NaiveDateTime) -> TimeDelta {
        if self.is_completed() {
            return self.duration();
        }
        self.start.map_or_else(TimeDelta::zero, |start| now - start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 10)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn open_segment_has_zero_duration() {
        let segment = TimedSegment::open("break", at(12, 0));
        assert!(!segment.is_completed());
        assert_eq!(segment.duration(), TimeDelta::zero());
    }

    #[test]
    fn elapsed_tracks_now_until_closed() {
        let mut segment = TimedSegment::open("break", at(12, 0));
        assert_eq!(segment.elapsed(at(12, 20)), TimeDelta::minutes(20));

        segment.mark_end(at(12, 30));
        assert!(segment.is_completed());
        assert_eq!(segment.duration(), TimeDelta::minutes(30));
        assert_eq!(segment.elapsed(at(14, 0)), TimeDelta::minutes(30));
    }

    #[test]
    fn mark_end_does_not_reopen_or_move_the_end() {
        let mut segment = TimedSegment::closed("lunch", at(12, 0), at(12, 30));
        segment.mark_end(at(13, 0));
        assert_eq!(segment.end, Some(at(12, 30)));
    }

    #[test]
    fn serde_roundtrip_preserves_open_end() {
        let segment = TimedSegment::open("coffee", at(9, 30));
        let json = serde_json::to_string(&segment).unwrap();
        let parsed: TimedSegment = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, segment);
    }
}
