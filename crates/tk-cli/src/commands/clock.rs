//! Clock-in/out and break commands.

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDateTime;

use tk_core::{CalendarStore, Storage};

pub fn clock_in<S: Storage, W: Write>(
    writer: &mut W,
    cal: &mut CalendarStore<S>,
    now: NaiveDateTime,
) -> Result<()> {
    cal.clock_in(now)?;
    cal.save()?;
    if let Some(start) = cal.active_day().and_then(|day| day.start) {
        writeln!(writer, "Clocked in at {}", start.format("%H:%M"))?;
    }
    Ok(())
}

pub fn clock_out<S: Storage, W: Write>(
    writer: &mut W,
    cal: &mut CalendarStore<S>,
    now: NaiveDateTime,
) -> Result<()> {
    if !cal.is_day_active() {
        writeln!(writer, "No active day to clock out.")?;
        return Ok(());
    }
    cal.clock_out(now);
    cal.save()?;
    if let Some(end) = cal.active_day().and_then(|day| day.end) {
        writeln!(writer, "Clocked out at {}", end.format("%H:%M"))?;
    }
    Ok(())
}

pub fn toggle_break<S: Storage, W: Write>(
    writer: &mut W,
    cal: &mut CalendarStore<S>,
    name: &str,
    now: NaiveDateTime,
) -> Result<()> {
    if !cal.is_day_active() {
        writeln!(writer, "No active day; clock in first.")?;
        return Ok(());
    }
    cal.toggle_break(name, now);
    cal.save()?;
    if cal.is_on_break() {
        writeln!(writer, "Break '{name}' started.")?;
    } else {
        writeln!(writer, "Break ended.")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use chrono::NaiveDate;
    use tk_core::{CalendarSettings, Rounding};
    use tk_store::FsStore;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 10)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn calendar(root: &std::path::Path) -> CalendarStore<FsStore> {
        let settings = CalendarSettings::new(Rounding::None, HashMap::new(), Vec::new());
        CalendarStore::open(FsStore::new(), root, settings).unwrap()
    }

    #[test]
    fn clock_in_reports_rounded_start_and_persists() {
        let temp = tempfile::tempdir().unwrap();
        let mut cal = calendar(temp.path());
        let mut output = Vec::new();

        clock_in(&mut output, &mut cal, at(8, 0)).unwrap();

        assert_eq!(String::from_utf8(output).unwrap(), "Clocked in at 08:00\n");
        assert!(temp.path().join("2025/03/10.json").is_file());
    }

    #[test]
    fn clock_out_without_day_explains_itself() {
        let temp = tempfile::tempdir().unwrap();
        let mut cal = calendar(temp.path());
        let mut output = Vec::new();

        clock_out(&mut output, &mut cal, at(16, 0)).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "No active day to clock out.\n"
        );
    }

    #[test]
    fn break_toggle_reports_both_directions() {
        let temp = tempfile::tempdir().unwrap();
        let mut cal = calendar(temp.path());
        let mut output = Vec::new();

        clock_in(&mut output, &mut cal, at(8, 0)).unwrap();
        output.clear();

        toggle_break(&mut output, &mut cal, "coffee", at(10, 0)).unwrap();
        toggle_break(&mut output, &mut cal, "coffee", at(10, 15)).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Break 'coffee' started.\nBreak ended.\n"
        );
    }
}
