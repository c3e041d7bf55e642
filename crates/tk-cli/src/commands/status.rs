//! Session status command.

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDateTime;

use tk_core::{CalendarStore, SessionStatus, Storage};

use super::format_delta;

pub fn run<S: Storage, W: Write>(
    writer: &mut W,
    cal: &CalendarStore<S>,
    now: NaiveDateTime,
) -> Result<()> {
    let status = cal.status(now);
    writeln!(writer, "Status: {status}")?;

    let Some(day) = cal.active_day() else {
        writeln!(writer, "No day active; `tk in` starts one.")?;
        return Ok(());
    };

    if let Some(start) = day.start {
        writeln!(writer, "Started: {}", start.format("%H:%M"))?;
    }
    if let Some(end) = day.end {
        writeln!(writer, "Ended:   {}", end.format("%H:%M"))?;
    }
    writeln!(writer, "Worked:  {}", format_delta(day.worked(now)))?;
    writeln!(writer, "Breaks:  {}", format_delta(day.total_breaks()))?;
    writeln!(writer, "Deficit: {}", format_delta(day.deficit(now)))?;

    if status == SessionStatus::OnBreak {
        if let Some(open) = day.open_break() {
            writeln!(
                writer,
                "On '{}' for {}",
                open.name,
                format_delta(open.elapsed(now))
            )?;
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

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 10)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn reports_live_worked_time_and_open_break() {
        let temp = tempfile::tempdir().unwrap();
        let settings = CalendarSettings::new(Rounding::None, HashMap::new(), Vec::new());
        let mut cal = CalendarStore::open(FsStore::new(), temp.path(), settings).unwrap();
        cal.clock_in(at(8, 0)).unwrap();
        cal.toggle_break("coffee", at(10, 0));

        let mut output = Vec::new();
        run(&mut output, &cal, at(10, 20)).unwrap();
        let output = String::from_utf8(output).unwrap();

        assert!(output.contains("Status: on break"));
        assert!(output.contains("Worked:  02:20"));
        assert!(output.contains("On 'coffee' for 00:20"));
    }

    #[test]
    fn reports_idle_without_active_day() {
        let temp = tempfile::tempdir().unwrap();
        let settings = CalendarSettings::new(Rounding::None, HashMap::new(), Vec::new());
        let cal = CalendarStore::open(FsStore::new(), temp.path(), settings).unwrap();

        let mut output = Vec::new();
        run(&mut output, &cal, at(10, 0)).unwrap();
        let output = String::from_utf8(output).unwrap();

        assert!(output.contains("Status: idle"));
        assert!(output.contains("`tk in` starts one"));
    }
}
