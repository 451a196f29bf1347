//! Window provider
//!
//! Windows are supplied by the caller: read from a JSON file of
//! `{"label", "start", "end"}` objects, or generated as consecutive calendar
//! months. Nothing about the window list is fixed in the analysis code.
//!
//! # Examples
//!
//! ```
//! use spendstat::windows::WindowSet;
//!
//! // March through October 2022, newest first
//! let windows = WindowSet::monthly((2022, 3), (2022, 10)).unwrap().newest_first();
//! assert_eq!(windows.len(), 8);
//! assert_eq!(windows.windows()[0].label(), "Oct 2022");
//! ```

use crate::error::{Result, SpendstatError};
use crate::types::Window;
use chrono::{Datelike, Months, NaiveDate};
use std::path::Path;
use tracing::debug;

/// An ordered list of windows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowSet {
    windows: Vec<Window>,
}

impl WindowSet {
    /// Wrap an existing list of windows
    pub fn new(windows: Vec<Window>) -> Self {
        Self { windows }
    }

    /// One window per calendar month from `since` to `until` inclusive
    ///
    /// Months are `(year, month)` pairs; windows are labelled like `Oct 2022`
    /// and ordered oldest first.
    pub fn monthly(since: (i32, u32), until: (i32, u32)) -> Result<Self> {
        let first = month_start(since)?;
        let last = month_start(until)?;
        if last < first {
            return Err(SpendstatError::InvalidArgument(format!(
                "month range ends ({}-{:02}) before it starts ({}-{:02})",
                until.0, until.1, since.0, since.1
            )));
        }

        let mut windows = Vec::new();
        let mut start = first;
        while start <= last {
            let next = start
                .checked_add_months(Months::new(1))
                .ok_or_else(|| SpendstatError::InvalidDate(format!("month after {start}")))?;
            let end = next.pred_opt().unwrap_or(start);
            windows.push(Window::new(start.format("%b %Y").to_string(), start, end)?);
            start = next;
        }

        debug!(
            "Generated {} monthly windows starting {}-{:02}",
            windows.len(),
            first.year(),
            first.month()
        );
        Ok(Self { windows })
    }

    /// Read windows from a JSON array of `{"label", "start", "end"}`
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let windows: Vec<Window> =
            serde_json::from_str(&content).map_err(|e| SpendstatError::Parse {
                file: path.to_path_buf(),
                error: e.to_string(),
            })?;
        debug!("Read {} windows from {}", windows.len(), path.display());
        Ok(Self { windows })
    }

    /// Reverse the order so the latest window comes first
    pub fn newest_first(mut self) -> Self {
        self.windows.reverse();
        self
    }

    /// Windows in order
    pub fn windows(&self) -> &[Window] {
        &self.windows
    }

    /// Take the window list
    pub fn into_inner(self) -> Vec<Window> {
        self.windows
    }

    /// Number of windows
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// Whether there are no windows
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

impl IntoIterator for WindowSet {
    type Item = Window;
    type IntoIter = std::vec::IntoIter<Window>;

    fn into_iter(self) -> Self::IntoIter {
        self.windows.into_iter()
    }
}

fn month_start((year, month): (i32, u32)) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| SpendstatError::InvalidDate(format!("{year}-{month:02}")))
}
