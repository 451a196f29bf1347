//! Cross-period aggregation of analysis sessions
//!
//! This module merges the per-category summaries of several analyzed
//! sessions into one wide table: one row per category seen in any session,
//! one cost column per session (named `"<label> Cost"`), and a `Total` row
//! holding each column's sum.
//!
//! # Missing cells
//!
//! A category absent from a session keeps an empty cell (`None`) in that
//! session's column rather than an explicit zero, so consumers can tell
//! "no spend recorded" from "spend that apportioned to zero". Totals treat
//! empty cells as zero, and [`CombinedRow::cost`] reads them as zero.
//!
//! # Examples
//!
//! ```
//! use spendstat::{
//!     aggregation::aggregate,
//!     session::analyze_windows,
//!     types::{Category, Cost, Record, RecordId, Window},
//! };
//! use chrono::NaiveDate;
//! use rust_decimal::Decimal;
//!
//! # fn main() -> spendstat::Result<()> {
//! let date = |m, d| NaiveDate::from_ymd_opt(2022, m, d).unwrap();
//! let records = vec![
//!     Record::new(RecordId::new(0), Category::new("Travel"), Cost::new(Decimal::from(310)))
//!         .with_started(date(10, 1))
//!         .with_finished(date(10, 31)),
//! ];
//! let windows = vec![
//!     Window::new("Oct", date(10, 1), date(10, 31))?,
//!     Window::new("Sep", date(9, 1), date(9, 30))?,
//! ];
//!
//! let sessions = analyze_windows(&records, windows, false)?;
//! let summary = aggregate(&sessions)?;
//!
//! assert_eq!(summary.columns(), ["Oct Cost", "Sep Cost"]);
//! assert_eq!(summary.totals(), [Cost::new(Decimal::from(310)), Cost::ZERO]);
//! # Ok(())
//! # }
//! ```

use crate::analyzer::TOTAL_LABEL;
use crate::error::Result;
use crate::session::AnalysisSession;
use crate::types::{Category, Cost, Record, RecordState};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

/// One category row of the combined summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombinedRow {
    /// Category name
    pub category: Category,
    /// One cell per session column; `None` where the session had no spend
    pub cells: Vec<Option<Cost>>,
}

impl CombinedRow {
    /// Cost in a column, reading an empty cell as zero
    pub fn cost(&self, column: usize) -> Cost {
        self.cells.get(column).copied().flatten().unwrap_or(Cost::ZERO)
    }

    /// Sum across all columns
    pub fn total(&self) -> Cost {
        self.cells.iter().flatten().sum()
    }
}

/// Category-by-session cost table with a total row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CombinedSummary {
    columns: Vec<String>,
    rows: Vec<CombinedRow>,
    totals: Vec<Cost>,
}

impl CombinedSummary {
    /// Column names, in session order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Category rows sorted by category, excluding the total
    pub fn rows(&self) -> &[CombinedRow] {
        &self.rows
    }

    /// Per-column sums
    pub fn totals(&self) -> &[Cost] {
        &self.totals
    }

    /// Sum of every column
    pub fn grand_total(&self) -> Cost {
        self.totals.iter().sum()
    }

    /// Label used for the total row
    pub fn total_label(&self) -> &'static str {
        TOTAL_LABEL
    }

    /// Index of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Row for a category
    pub fn row(&self, category: &Category) -> Option<&CombinedRow> {
        self.rows
            .binary_search_by(|row| row.category.cmp(category))
            .ok()
            .map(|idx| &self.rows[idx])
    }

    /// Raw cell, distinguishing an empty cell from zero
    pub fn cell(&self, category: &Category, column: usize) -> Option<Cost> {
        self.row(category)
            .and_then(|row| row.cells.get(column).copied().flatten())
    }

    /// Cost for a category in a column, zero when absent
    pub fn cost(&self, category: &Category, column: usize) -> Cost {
        self.cell(category, column).unwrap_or(Cost::ZERO)
    }
}

/// Column name for a session
pub fn column_name(label: &str) -> String {
    format!("{label} Cost")
}

/// Merge analyzed sessions into one combined summary
///
/// Sessions must all be analyzed. Session order fixes column order only:
/// the set of categories, each category's values and the totals do not
/// depend on it.
pub fn aggregate(sessions: &[AnalysisSession]) -> Result<CombinedSummary> {
    let summaries = sessions
        .iter()
        .map(|s| s.require_analysis().map(|a| a.summary()))
        .collect::<Result<Vec<_>>>()?;

    let categories: BTreeSet<&Category> = summaries
        .iter()
        .flat_map(|summary| summary.rows().iter().map(|row| &row.category))
        .collect();

    let rows: Vec<CombinedRow> = categories
        .into_iter()
        .map(|category| CombinedRow {
            category: category.clone(),
            cells: summaries.iter().map(|s| s.get(category)).collect(),
        })
        .collect();

    let totals: Vec<Cost> = (0..summaries.len())
        .map(|column| rows.iter().map(|row| row.cost(column)).sum())
        .collect();

    let columns: Vec<String> = sessions.iter().map(|s| column_name(s.label())).collect();

    debug!(
        "Merged {} sessions into {} categories",
        sessions.len(),
        rows.len()
    );

    Ok(CombinedSummary {
        columns,
        rows,
        totals,
    })
}

/// Spend outside any window's apportionment
///
/// `unused` covers records that have not started; `unfinished` covers
/// records that started but have no finish date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BacklogTotals {
    /// Total cost of records with no start date
    pub unused: Cost,
    /// Number of records with no start date
    pub unused_count: usize,
    /// Total cost of started records with no finish date
    pub unfinished: Cost,
    /// Number of started records with no finish date
    pub unfinished_count: usize,
}

impl BacklogTotals {
    /// Sum unused and unfinished costs over the whole record set
    ///
    /// Every record is validated first, as in the window analysis, so an
    /// out-of-range cost is reported rather than overflowing the sums.
    pub fn from_records(records: &[Record]) -> Result<Self> {
        let mut totals = Self::default();
        for record in records {
            record.validate()?;
            match record.state() {
                RecordState::Unused => {
                    totals.unused += record.cost;
                    totals.unused_count += 1;
                }
                RecordState::Unfinished => {
                    totals.unfinished += record.cost;
                    totals.unfinished_count += 1;
                }
                RecordState::Finished => {}
            }
        }
        Ok(totals)
    }
}
