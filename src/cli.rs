use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "remcal", version, about = "Terminal month calendar for remind(1)")]
pub struct Cli {
    /// Settings file (defaults to the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// remind executable to run
    #[arg(long, global = true)]
    pub remind: Option<String>,
    /// Reminders file passed to remind
    #[arg(long, short = 'f', global = true)]
    pub file: Option<PathBuf>,
    /// Where to write the log (defaults to the user data directory)
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
    /// Log level: trace, debug, info, warn or error
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Browse the calendar interactively
    Tui,
    /// Print one month of reminders grouped by day
    List {
        /// Month number (1-12), defaults to the current month
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,
        /// Four-digit year, defaults to the current year
        #[arg(long)]
        year: Option<i32>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_tui() {
        let cli = Cli::try_parse_from(["remcal"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.log_level, "warn");
    }

    #[test]
    fn list_takes_month_and_year() {
        let cli =
            Cli::try_parse_from(["remcal", "list", "--month", "2", "--year", "2024", "-f", "r.rem"])
                .unwrap();
        assert_eq!(cli.file, Some(PathBuf::from("r.rem")));
        match cli.command {
            Some(Command::List { month, year }) => {
                assert_eq!(month, Some(2));
                assert_eq!(year, Some(2024));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn month_out_of_range_is_rejected() {
        assert!(Cli::try_parse_from(["remcal", "list", "--month", "13"]).is_err());
    }
}
