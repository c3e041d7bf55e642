//! CLI subcommand implementations.

pub mod clock;
pub mod report;
pub mod set;
pub mod status;

use chrono::TimeDelta;

/// Renders a duration as signed `HH:MM`.
pub(crate) fn format_delta(delta: TimeDelta) -> String {
    let minutes = delta.num_minutes();
    let sign = if minutes < 0 { "-" } else { "" };
    let minutes = minutes.abs();
    format!("{sign}{:02}:{:02}", minutes / 60, minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_delta_handles_signs() {
        assert_eq!(format_delta(TimeDelta::minutes(450)), "07:30");
        assert_eq!(format_delta(TimeDelta::minutes(-30)), "-00:30");
        assert_eq!(format_delta(TimeDelta::zero()), "00:00");
        assert_eq!(format_delta(TimeDelta::hours(26)), "26:00");
    }
}
