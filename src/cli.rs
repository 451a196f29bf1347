//! CLI interface for spendstat
//!
//! This module defines the command-line interface using clap. Every flag is
//! global, so it can appear before or after the subcommand. When the
//! subcommand is omitted, `report` runs.
//!
//! # Example
//!
//! ```bash
//! # Monthly breakdown for March-October 2022, newest month first
//! spendstat report --data spending.json --since 2022-03 --until 2022-10 --newest-first
//!
//! # Combined summary only, for windows listed in a file, as JSON
//! spendstat summary --windows windows.json --json
//!
//! # Show which windows would be analyzed
//! spendstat windows --since 2022-01 --until 2022-12
//! ```

use crate::error::{Result, SpendstatError};
use crate::windows::WindowSet;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Apportion expenditure records across date windows and summarize spend by category
#[derive(Parser, Debug, Clone)]
#[command(name = "spendstat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Show informational output (default is quiet mode with only warnings and errors)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Record file or directory (defaults to $SPENDSTAT_DATA, then ~/.spendstat/records)
    #[arg(long, short = 'd', global = true)]
    pub data: Option<PathBuf>,

    /// JSON file listing windows as [{"label", "start", "end"}]
    #[arg(long, short = 'w', global = true, conflicts_with_all = ["since", "until"])]
    pub windows: Option<PathBuf>,

    /// First month of generated monthly windows (YYYY-MM)
    #[arg(long, global = true)]
    pub since: Option<String>,

    /// Last month of generated monthly windows (YYYY-MM)
    #[arg(long, global = true)]
    pub until: Option<String>,

    /// Order windows with the most recent first
    #[arg(long, global = true)]
    pub newest_first: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Currency symbol for table output
    #[arg(long, default_value = "£", global = true)]
    pub currency: String,

    /// Analyze windows in parallel
    #[arg(long, global = true)]
    pub parallel: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Per-window breakdowns, unfinished items, combined summary and backlog totals
    Report,
    /// Combined category summary across all windows
    Summary,
    /// List the windows that would be analyzed
    Windows,
}

impl Cli {
    /// The command to run, defaulting to `report`
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Report)
    }

    /// Build the window list from `--windows` or `--since`/`--until`
    ///
    /// A single bound on its own selects that one month.
    pub fn resolve_windows(&self) -> Result<WindowSet> {
        let set = match (&self.windows, &self.since, &self.until) {
            (Some(path), _, _) => WindowSet::from_file(path)?,
            (None, Some(since), Some(until)) => {
                WindowSet::monthly(parse_month_filter(since)?, parse_month_filter(until)?)?
            }
            (None, Some(only), None) | (None, None, Some(only)) => {
                let month = parse_month_filter(only)?;
                WindowSet::monthly(month, month)?
            }
            (None, None, None) => {
                return Err(SpendstatError::Config(
                    "no windows given; pass --windows <FILE> or --since/--until YYYY-MM".into(),
                ));
            }
        };

        Ok(if self.newest_first {
            set.newest_first()
        } else {
            set
        })
    }
}

/// Parse a month filter in YYYY-MM format
///
/// # Example
///
/// ```
/// use spendstat::cli::parse_month_filter;
///
/// assert_eq!(parse_month_filter("2022-10").unwrap(), (2022, 10));
/// assert!(parse_month_filter("2022-13").is_err());
/// ```
pub fn parse_month_filter(month_str: &str) -> Result<(i32, u32)> {
    let parts: Vec<&str> = month_str.split('-').collect();
    if parts.len() != 2 {
        return Err(SpendstatError::InvalidDate(format!(
            "Invalid month format: {month_str}. Use YYYY-MM"
        )));
    }

    let year = parts[0]
        .parse::<i32>()
        .map_err(|_| SpendstatError::InvalidDate(format!("Invalid year in '{month_str}'")))?;
    let month = parts[1]
        .parse::<u32>()
        .map_err(|_| SpendstatError::InvalidDate(format!("Invalid month in '{month_str}'")))?;

    if !(1..=12).contains(&month) {
        return Err(SpendstatError::InvalidDate(format!(
            "Month must be between 1-12, got {month}"
        )));
    }

    Ok((year, month))
}
