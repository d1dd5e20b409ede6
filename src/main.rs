mod calendar;
mod cli;
mod commands;
mod config;
mod datecell;
mod layout;
mod remind;
mod textbox;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::{self, OpenOptions};
use std::sync::Mutex;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    init_logging(&args)?;
    debug!("remcal v{} starting", env!("CARGO_PKG_VERSION"));
    match &args.command {
        None | Some(cli::Command::Tui) => commands::tui(&args),
        Some(cli::Command::List { month, year }) => commands::list(&args, *month, *year),
    }
}

/// The terminal belongs to the calendar, so logs always go to a file.
fn init_logging(args: &cli::Cli) -> Result<()> {
    let path = match &args.log_file {
        Some(path) => path.clone(),
        None => config::default_log_path()?,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {:?}", path))?;
    let filter = EnvFilter::try_new(format!("remcal={}", args.log_level))
        .with_context(|| format!("invalid log level {:?}", args.log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}
