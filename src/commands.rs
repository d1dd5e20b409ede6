use crate::cli::Cli;
use crate::config::{load_settings, Settings};
use crate::remind::{RemindCommand, Reminder, ReminderSource};
use crate::ui;
use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use std::collections::BTreeMap;
use tracing::info;

pub fn tui(cli: &Cli) -> Result<()> {
    let (settings, source) = resolve(cli)?;
    info!(file = %source.file.display(), program = %source.program, "starting calendar");
    ui::run(source, settings.poll_interval())
}

pub fn list(cli: &Cli, month: Option<u32>, year: Option<i32>) -> Result<()> {
    let (_, mut source) = resolve(cli)?;
    let today = Local::now().date_naive();
    let month = month.unwrap_or_else(|| today.month());
    let year = year.unwrap_or_else(|| today.year());
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .with_context(|| format!("invalid month {month}/{year}"))?;
    let reminders = source
        .fetch_month(month, year)
        .with_context(|| format!("loading reminders for {}", first.format("%B %Y")))?;
    print!("{}", format_month(first, &reminders));
    Ok(())
}

/// Settings file first, then command-line overrides.
fn resolve(cli: &Cli) -> Result<(Settings, RemindCommand)> {
    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(program) = &cli.remind {
        settings.remind = program.clone();
    }
    if let Some(file) = &cli.file {
        settings.reminders_file = Some(file.clone());
    }
    let file = settings.reminders_file()?;
    let source = RemindCommand::new(settings.remind.clone(), file);
    Ok((settings, source))
}

fn format_month(first: NaiveDate, reminders: &[Reminder]) -> String {
    let mut by_day: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for reminder in reminders {
        by_day
            .entry(reminder.date_key.as_str())
            .or_default()
            .push(reminder.description.as_str());
    }
    let mut out = format!("{}\n", first.format("%B %Y"));
    if by_day.is_empty() {
        out.push_str("  (no reminders)\n");
    }
    for (day, descriptions) in by_day {
        out.push_str(&format!("{day}\n"));
        for description in descriptions {
            out.push_str(&format!("  - {description}\n"));
        }
    }
    out
}
