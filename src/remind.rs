use chrono::NaiveDate;
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

/// Extra days fetched past the end of the month so the trailing cells of
/// the sixth week are filled in too.
pub const LOOKAHEAD_DAYS: u32 = 6;

const HEADER_LINES: usize = 5;
const FOOTER_LINES: usize = 2;
const RECORD_FIELDS: usize = 6;

/// One entry of `remind -p` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    /// `YYYY/MM/DD`
    pub date_key: String,
    pub description: String,
}

#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status}:\n{stderr}")]
    Exit {
        program: String,
        status: String,
        stderr: String,
    },
    #[error("reminder output is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("malformed reminder record on line {line}: {text:?}")]
    Malformed { line: usize, text: String },
}

/// Where reminders for a month come from.
pub trait ReminderSource {
    /// Reminders from the 1st of `month`/`year` through
    /// [`LOOKAHEAD_DAYS`] days past its end, in source order.
    fn fetch_month(&mut self, month: u32, year: i32) -> Result<Vec<Reminder>, SourceError>;
}

/// Runs the `remind` binary against a reminders file.
#[derive(Debug, Clone)]
pub struct RemindCommand {
    pub program: String,
    pub file: PathBuf,
}

impl RemindCommand {
    pub fn new(program: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        RemindCommand {
            program: program.into(),
            file: file.into(),
        }
    }

    fn args(&self, month: u32, year: i32) -> Vec<String> {
        vec![
            "-gaaad".into(),
            "-p".into(),
            format!("-s+{LOOKAHEAD_DAYS}"),
            self.file.display().to_string(),
            "1".into(),
            month_abbrev(month).into(),
            year.to_string(),
        ]
    }
}

impl ReminderSource for RemindCommand {
    fn fetch_month(&mut self, month: u32, year: i32) -> Result<Vec<Reminder>, SourceError> {
        let args = self.args(month, year);
        debug!(program = %self.program, ?args, "running reminder source");
        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|source| SourceError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(SourceError::Exit {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
            });
        }
        parse_output(&String::from_utf8(output.stdout)?)
    }
}

/// Parses `remind -p` output: five header lines and two footer lines are
/// skipped, every other line is `date _ _ _ _ description`.
pub fn parse_output(output: &str) -> Result<Vec<Reminder>, SourceError> {
    let lines: Vec<&str> = output.split('\n').collect();
    if lines.len() <= HEADER_LINES + FOOTER_LINES {
        return Ok(Vec::new());
    }
    lines[HEADER_LINES..lines.len() - FOOTER_LINES]
        .iter()
        .enumerate()
        .map(|(idx, line)| parse_record(idx + HEADER_LINES + 1, line))
        .collect()
}

fn parse_record(line_no: usize, line: &str) -> Result<Reminder, SourceError> {
    let fields: Vec<&str> = line.splitn(RECORD_FIELDS, ' ').collect();
    if fields.len() < RECORD_FIELDS {
        return Err(SourceError::Malformed {
            line: line_no,
            text: line.to_string(),
        });
    }
    Ok(Reminder {
        date_key: fields[0].to_string(),
        description: fields[RECORD_FIELDS - 1].to_string(),
    })
}

/// Cache key used for a day, matching the first field of a record.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y/%m/%d").to_string()
}

pub fn month_abbrev(month: u32) -> &'static str {
    const ABBREVS: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
    ABBREVS[(month.clamp(1, 12) - 1) as usize]
}
