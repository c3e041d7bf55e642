//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Personal work-time keeper.
///
/// Tracks clock-in/out events and breaks per day and reports the deficit
/// against the expected work duration.
#[derive(Debug, Parser)]
#[command(name = "tk", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Clock in now.
    In,

    /// Clock out now.
    Out,

    /// Start a break, or end the one that is running.
    Break {
        /// Name for the break.
        #[arg(long, default_value = "break")]
        name: String,
    },

    /// Show the current session status.
    Status,

    /// Show loaded records.
    Show {
        #[command(subcommand)]
        scope: ShowScope,
    },

    /// Adjust the active day or the session settings.
    Set {
        #[command(subcommand)]
        field: SetField,
    },
}

/// Hierarchy levels `show` can render.
#[derive(Debug, Subcommand)]
pub enum ShowScope {
    /// Days of the active month.
    Days,
    /// Months of the active year.
    Months,
    /// All loaded years.
    Years,
}

/// Fields `set` can override.
#[derive(Debug, Subcommand)]
pub enum SetField {
    /// Move today's clock-in time (HH:MM).
    Start { time: String },

    /// Move today's clock-out time (HH:MM).
    End { time: String },

    /// Expected work duration for today, in minutes.
    Expected { minutes: i64 },

    /// Rounding granularity for this session, in minutes (0, 5, 10, 15, 30).
    Rounding { minutes: u32 },
}
