//! Core calendar engine for the work-time keeper.
//!
//! This crate contains the hierarchical record model and the logic that
//! keeps it consistent:
//! - Records: [`YearRecord`] → [`MonthRecord`] → [`DayRecord`] → [`TimedSegment`]
//! - Rounding: the two-stage timestamp snapping policy
//! - [`CalendarStore`]: activation state machine, clock transitions, and
//!   persistence through a [`Storage`] collaborator

mod calendar;
mod day;
pub(crate) mod duration_serde;
mod month;
mod rounding;
mod segment;
mod settings;
mod storage;
mod year;

pub use calendar::{CalendarStore, SessionStatus};
pub use day::DayRecord;
pub use month::MonthRecord;
pub use rounding::{Rounding, round};
pub use segment::TimedSegment;
pub use settings::{CalendarSettings, PlannedBreakTemplate, default_expected_work_day};
pub use storage::{Storage, StorageError};
pub use year::YearRecord;
