//! Rendering of loaded years, months, and days.

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDateTime;

use tk_core::{CalendarStore, Storage};

use super::format_delta;

fn format_clock(t: Option<NaiveDateTime>) -> String {
    t.map_or_else(|| "--:--".to_string(), |t| t.format("%H:%M").to_string())
}

/// Days of the active month, one line each, with the month's cached
/// aggregates underneath.
pub fn days<S: Storage, W: Write>(
    writer: &mut W,
    cal: &CalendarStore<S>,
    now: NaiveDateTime,
) -> Result<()> {
    let Some(month) = cal.active_month() else {
        writeln!(writer, "No active month.")?;
        return Ok(());
    };

    for day in cal.loaded_days() {
        let marker = if day.is_complete() { " " } else { "*" };
        writeln!(
            writer,
            "{:02}{marker} {} - {}  breaks {}  worked {}  deficit {}",
            day.id,
            format_clock(day.start),
            format_clock(day.end),
            format_delta(day.total_breaks()),
            format_delta(day.worked(now)),
            format_delta(day.deficit(now)),
        )?;
    }
    writeln!(
        writer,
        "month {:02}: worked {}  deficit {}  avg {}",
        month.id,
        format_delta(month.worked),
        format_delta(month.deficit),
        format_delta(month.average_work_day),
    )?;
    Ok(())
}

/// Months of the active year with their cached aggregates.
pub fn months<S: Storage, W: Write>(writer: &mut W, cal: &CalendarStore<S>) -> Result<()> {
    if !cal.is_year_active() {
        writeln!(writer, "No active year.")?;
        return Ok(());
    }
    for month in cal.loaded_months() {
        writeln!(
            writer,
            "{:02}: worked {}  deficit {}  avg {}",
            month.id,
            format_delta(month.worked),
            format_delta(month.deficit),
            format_delta(month.average_work_day),
        )?;
    }
    Ok(())
}

/// All loaded years, plus identifiers known to storage but not loaded.
pub fn years<S: Storage, W: Write>(writer: &mut W, cal: &CalendarStore<S>) -> Result<()> {
    let mut loaded = Vec::new();
    for year in cal.loaded_years() {
        loaded.push(year.id);
        writeln!(
            writer,
            "{}: worked {}  deficit {}",
            year.id,
            format_delta(year.worked),
            format_delta(year.deficit),
        )?;
    }
    for id in cal.list_known_years()? {
        if !loaded.contains(&id) {
            writeln!(writer, "{id}: (not loaded)")?;
        }
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

    fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn days_renders_complete_and_running_days() {
        let temp = tempfile::tempdir().unwrap();
        let settings = CalendarSettings::new(Rounding::None, HashMap::new(), Vec::new());
        let mut cal = CalendarStore::open(FsStore::new(), temp.path(), settings).unwrap();
        cal.clock_in(at(10, 8, 0)).unwrap();
        cal.clock_out(at(10, 15, 30));
        cal.clock_in(at(11, 9, 0)).unwrap();

        let mut output = Vec::new();
        days(&mut output, &cal, at(11, 10, 0)).unwrap();
        let output = String::from_utf8(output).unwrap();

        assert!(output.contains("10  08:00 - 15:30"));
        assert!(output.contains("11* 09:00 - --:--"));
        // Only the complete Monday feeds the month aggregates.
        assert!(output.contains("month 03: worked 07:30  deficit 00:00  avg 07:30"));
    }

    #[test]
    fn days_without_active_month_says_so() {
        let temp = tempfile::tempdir().unwrap();
        let settings = CalendarSettings::new(Rounding::None, HashMap::new(), Vec::new());
        let cal = CalendarStore::open(FsStore::new(), temp.path(), settings).unwrap();

        let mut output = Vec::new();
        days(&mut output, &cal, at(10, 10, 0)).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "No active month.\n");
    }
}
