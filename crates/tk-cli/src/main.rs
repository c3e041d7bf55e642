use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tk_cli::commands::{clock, report, set, status};
use tk_cli::{Cli, Commands, Config, SetField, ShowScope};
use tk_core::CalendarStore;
use tk_store::FsStore;

/// Load config and open the calendar for the configured project.
fn open_calendar(config_path: Option<&Path>) -> Result<CalendarStore<FsStore>> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let settings = config.calendar_settings()?;
    CalendarStore::open(FsStore::new(), config.project_dir(), settings)
        .context("failed to open calendar storage")
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let now = Local::now().naive_local();
    let mut stdout = std::io::stdout();

    let mut cal = open_calendar(cli.config.as_deref())?;
    // The active pointer is session state; point it at today. Nothing
    // existing yet for today is fine.
    cal.activate_date(now.date())
        .context("failed to load today's records")?;

    match &cli.command {
        Some(Commands::In) => clock::clock_in(&mut stdout, &mut cal, now)?,
        Some(Commands::Out) => clock::clock_out(&mut stdout, &mut cal, now)?,
        Some(Commands::Break { name }) => clock::toggle_break(&mut stdout, &mut cal, name, now)?,
        Some(Commands::Status) => status::run(&mut stdout, &cal, now)?,
        Some(Commands::Show { scope }) => match scope {
            ShowScope::Days => report::days(&mut stdout, &cal, now)?,
            ShowScope::Months => report::months(&mut stdout, &cal)?,
            ShowScope::Years => report::years(&mut stdout, &cal)?,
        },
        Some(Commands::Set { field }) => match field {
            SetField::Start { time } => set::day_start(&mut stdout, &mut cal, time, now.date())?,
            SetField::End { time } => set::day_end(&mut stdout, &mut cal, time, now.date())?,
            SetField::Expected { minutes } => set::day_expected(&mut stdout, &mut cal, *minutes)?,
            SetField::Rounding { minutes } => set::rounding(&mut stdout, &mut cal, *minutes)?,
        },
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
