//! Overrides for the active day and session settings.

use std::io::Write;

use anyhow::{Result, anyhow};
use chrono::{NaiveDate, TimeDelta};

use tk_core::{CalendarStore, Rounding, Storage};

use crate::config::parse_time;

use super::format_delta;

pub fn day_start<S: Storage, W: Write>(
    writer: &mut W,
    cal: &mut CalendarStore<S>,
    time: &str,
    today: NaiveDate,
) -> Result<()> {
    if !cal.is_day_active() {
        writeln!(writer, "No active day.")?;
        return Ok(());
    }
    let t = today.and_time(parse_time(time)?);
    cal.set_day_start(t);
    cal.save()?;
    writeln!(writer, "Start set to {}", t.format("%H:%M"))?;
    Ok(())
}

pub fn day_end<S: Storage, W: Write>(
    writer: &mut W,
    cal: &mut CalendarStore<S>,
    time: &str,
    today: NaiveDate,
) -> Result<()> {
    if !cal.is_day_active() {
        writeln!(writer, "No active day.")?;
        return Ok(());
    }
    let t = today.and_time(parse_time(time)?);
    cal.set_day_end(t);
    cal.save()?;
    writeln!(writer, "End set to {}", t.format("%H:%M"))?;
    Ok(())
}

pub fn day_expected<S: Storage, W: Write>(
    writer: &mut W,
    cal: &mut CalendarStore<S>,
    minutes: i64,
) -> Result<()> {
    if !cal.is_day_active() {
        writeln!(writer, "No active day.")?;
        return Ok(());
    }
    let expected = TimeDelta::minutes(minutes);
    cal.set_day_expected(expected);
    cal.save()?;
    writeln!(writer, "Expected work set to {}", format_delta(expected))?;
    Ok(())
}

/// Changes the rounding granularity for this session. The config file is
/// the durable place for it.
pub fn rounding<S: Storage, W: Write>(
    writer: &mut W,
    cal: &mut CalendarStore<S>,
    minutes: u32,
) -> Result<()> {
    let rounding = Rounding::from_minutes(minutes)
        .ok_or_else(|| anyhow!("rounding must be one of 0, 5, 10, 15, 30 minutes"))?;
    cal.set_rounding(rounding);
    writeln!(
        writer,
        "Rounding set to {minutes} minutes for this session; edit config.toml to keep it."
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use chrono::{NaiveDate, NaiveDateTime};
    use tk_core::CalendarSettings;
    use tk_store::FsStore;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 10)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn set_end_updates_aggregates() {
        let temp = tempfile::tempdir().unwrap();
        let settings = CalendarSettings::new(Rounding::None, HashMap::new(), Vec::new());
        let mut cal = CalendarStore::open(FsStore::new(), temp.path(), settings).unwrap();
        cal.clock_in(at(8, 0)).unwrap();

        let mut output = Vec::new();
        day_end(&mut output, &mut cal, "16:30", at(0, 0).date()).unwrap();

        let day = cal.active_day().unwrap();
        assert!(day.is_complete());
        assert_eq!(cal.active_month().unwrap().worked, TimeDelta::minutes(510));
    }

    #[test]
    fn rejects_unknown_rounding() {
        let temp = tempfile::tempdir().unwrap();
        let settings = CalendarSettings::new(Rounding::None, HashMap::new(), Vec::new());
        let mut cal = CalendarStore::open(FsStore::new(), temp.path(), settings).unwrap();

        let mut output = Vec::new();
        assert!(rounding(&mut output, &mut cal, 7).is_err());
        assert!(rounding(&mut output, &mut cal, 15).is_ok());
        assert_eq!(cal.rounding(), Rounding::Fifteen);
    }
}
