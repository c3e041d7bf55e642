//! Configuration loading and management.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::{NaiveTime, TimeDelta, Weekday};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use tk_core::{CalendarSettings, PlannedBreakTemplate, Rounding};

/// Application configuration: the serializable face of the calendar
/// settings plus the storage location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding all projects' records.
    pub data_dir: PathBuf,

    /// Project sub-directory the calendar works against.
    pub project: String,

    /// Rounding granularity in minutes: 0, 5, 10, 15, or 30.
    pub rounding: u32,

    /// Expected work duration per weekday, in minutes (e.g. `mon = 450`).
    /// Weekdays left out fall back to the built-in table.
    pub expected_work_week: HashMap<String, i64>,

    /// Recurring breaks inserted into matching new days.
    pub planned_breaks: Vec<PlannedBreak>,
}

/// One planned break entry in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedBreak {
    pub name: String,
    /// Time of day, `HH:MM`.
    pub start: String,
    /// Time of day, `HH:MM`.
    pub end: String,
    /// Weekday names: `mon`, `tue`, ...
    pub weekdays: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            data_dir,
            project: "default".to_string(),
            rounding: 0,
            expected_work_week: HashMap::new(),
            planned_breaks: Vec::new(),
        }
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (TK_*)
        figment = figment.merge(Env::prefixed("TK_"));

        figment.extract()
    }

    /// Directory holding this project's year/month/day records.
    #[must_use]
    pub fn project_dir(&self) -> PathBuf {
        self.data_dir.join(&self.project)
    }

    /// Converts the file/env representation into core settings, rejecting
    /// malformed values here at the boundary.
    pub fn calendar_settings(&self) -> Result<CalendarSettings> {
        let rounding = Rounding::from_minutes(self.rounding)
            .ok_or_else(|| anyhow!("invalid rounding granularity: {} minutes", self.rounding))?;

        let mut work_week = HashMap::new();
        for (name, minutes) in &self.expected_work_week {
            work_week.insert(parse_weekday(name)?, TimeDelta::minutes(*minutes));
        }

        let mut templates = Vec::new();
        for entry in &self.planned_breaks {
            templates.push(PlannedBreakTemplate {
                name: entry.name.clone(),
                start: parse_time(&entry.start)?,
                end: parse_time(&entry.end)?,
                weekdays: entry
                    .weekdays
                    .iter()
                    .map(|name| parse_weekday(name))
                    .collect::<Result<_>>()?,
            });
        }

        Ok(CalendarSettings::new(rounding, work_week, templates))
    }
}

fn parse_weekday(name: &str) -> Result<Weekday> {
    name.parse::<Weekday>()
        .map_err(|_| anyhow!("invalid weekday: {name}"))
}

/// Parses a time of day, accepting `HH:MM` and `HH:MM:SS`.
pub(crate) fn parse_time(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .with_context(|| format!("invalid time of day: {value}"))
}

/// Returns the platform-specific config directory for tk.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("tk"))
}

/// Returns the platform-specific data directory for tk.
///
/// On Linux: `~/.local/share/tk`
fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("tk"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_points_at_data_dir() {
        let config = Config::default();
        assert_eq!(config.project, "default");
        assert!(config.project_dir().ends_with("default"));
    }

    #[test]
    fn settings_conversion_parses_weekdays_and_times() {
        let config = Config {
            rounding: 15,
            expected_work_week: HashMap::from([("mon".to_string(), 480)]),
            planned_breaks: vec![PlannedBreak {
                name: "lunch".to_string(),
                start: "11:30".to_string(),
                end: "12:00".to_string(),
                weekdays: vec!["mon".to_string(), "wed".to_string()],
            }],
            ..Config::default()
        };

        let settings = config.calendar_settings().unwrap();
        assert_eq!(settings.rounding, Rounding::Fifteen);
        assert_eq!(
            settings.expected_work_day(Weekday::Mon),
            TimeDelta::hours(8)
        );
        // Unconfigured weekdays fall back to the built-in table.
        assert_eq!(
            settings.expected_work_day(Weekday::Tue),
            TimeDelta::minutes(450)
        );
        assert_eq!(settings.planned_breaks.len(), 1);
    }

    #[test]
    fn settings_conversion_rejects_bad_values() {
        let bad_rounding = Config {
            rounding: 7,
            ..Config::default()
        };
        assert!(bad_rounding.calendar_settings().is_err());

        let bad_weekday = Config {
            expected_work_week: HashMap::from([("someday".to_string(), 60)]),
            ..Config::default()
        };
        assert!(bad_weekday.calendar_settings().is_err());
    }

    #[test]
    fn parse_time_accepts_minutes_and_seconds() {
        assert_eq!(
            parse_time("09:30").unwrap(),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap()
        );
        assert_eq!(
            parse_time("09:30:15").unwrap(),
            NaiveTime::from_hms_opt(9, 30, 15).unwrap()
        );
        assert!(parse_time("930").is_err());
    }
}
