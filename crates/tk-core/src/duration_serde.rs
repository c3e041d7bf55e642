//! Serde helpers storing a `TimeDelta` as whole seconds.
//!
//! Deficits can be negative, so the on-disk representation is a signed
//! integer rather than a formatted duration string.

use chrono::TimeDelta;
use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S>(value: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_i64(value.num_seconds())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<TimeDelta, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = i64::deserialize(deserializer)?;
    TimeDelta::try_seconds(secs)
        .ok_or_else(|| serde::de::Error::custom(format!("duration out of range: {secs}s")))
}
