//! Work-time keeper CLI library.
//!
//! This crate provides the command-line interface for the calendar engine.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, SetField, ShowScope};
pub use config::{Config, PlannedBreak};
