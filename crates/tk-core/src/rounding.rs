//! Timestamp rounding policy.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Minute granularity that clock and break timestamps snap to.
///
/// Modeled as a closed set so invalid bucket widths are unrepresentable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rounding {
    /// No minute rounding. Timestamps still snap to the nearest 30 seconds.
    #[default]
    None,
    Five,
    Ten,
    Fifteen,
    Thirty,
}

impl Rounding {
    /// Width of the minute bucket, if one is configured.
    #[must_use]
    pub const fn minutes(self) -> Option<i64> {
        match self {
            Self::None => None,
            Self::Five => Some(5),
            Self::Ten => Some(10),
            Self::Fifteen => Some(15),
            Self::Thirty => Some(30),
        }
    }

    /// Maps a raw minute count to a granularity. `0` means no minute
    /// rounding; anything outside the closed set is rejected.
    #[must_use]
    pub const fn from_minutes(minutes: u32) -> Option<Self> {
        match minutes {
            0 => Some(Self::None),
            5 => Some(Self::Five),
            10 => Some(Self::Ten),
            15 => Some(Self::Fifteen),
            30 => Some(Self::Thirty),
            _ => None,
        }
    }
}

/// Snaps `t` to the configured granularity.
///
/// Two stages, always in this order: round to the nearest 30 seconds, then
/// round that result to the minute bucket when one is configured. Collapsing
/// the stages into one changes results near half-minute marks, so the order
/// matters. Ties round to the later boundary.
#[must_use]
pub fn round(t: NaiveDateTime, granularity: Rounding) -> NaiveDateTime {
    let t = round_to_step(t, 30);
    match granularity.minutes() {
        Some(minutes) => round_to_step(t, minutes * 60),
        None => t,
    }
}

/// Rounds to the nearest multiple of `step_secs`, half up.
fn round_to_step(t: NaiveDateTime, step_secs: i64) -> NaiveDateTime {
    let step = step_secs * 1000;
    let millis = t.and_utc().timestamp_millis();
    let rem = millis.rem_euclid(step);
    let down = millis - rem;
    let rounded = if rem * 2 >= step { down + step } else { down };
    DateTime::from_timestamp_millis(rounded).map_or(t, |dt| dt.naive_utc())
}
