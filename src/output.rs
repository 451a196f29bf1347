//! Output formatting module for spendstat
//!
//! This module provides formatters for displaying analysis results in
//! different formats:
//! - Table format for human-readable terminal output
//! - JSON format for machine-readable output and integration with other tools
//!
//! Costs are rounded to two decimals only here; the analysis keeps full
//! decimal precision.
//!
//! # Examples
//!
//! ```
//! use spendstat::aggregation::{BacklogTotals, aggregate};
//! use spendstat::output::get_formatter;
//! use spendstat::session::analyze_windows;
//! use spendstat::windows::WindowSet;
//!
//! # fn main() -> spendstat::Result<()> {
//! let sessions = analyze_windows(&[], WindowSet::monthly((2022, 9), (2022, 10))?, false)?;
//! let summary = aggregate(&sessions)?;
//!
//! let formatter = get_formatter(false, "£");
//! println!("{}", formatter.format_summary(&summary));
//!
//! let json_formatter = get_formatter(true, "£");
//! println!("{}", json_formatter.format_report(&sessions, &summary, &BacklogTotals::default()));
//! # Ok(())
//! # }
//! ```

use crate::aggregation::{BacklogTotals, CombinedSummary};
use crate::analyzer::{MatchedRecord, TOTAL_LABEL};
use crate::session::AnalysisSession;
use crate::types::{Cost, Record, Window};
use chrono::NaiveDate;
use colored::Colorize;
use prettytable::{Cell, Row, Table, format, row};
use serde_json::{Value, json};

/// Trait for output formatters
///
/// This trait defines the interface for rendering analysis results.
/// Implementations can provide different output formats (table, JSON, etc.).
pub trait OutputFormatter {
    /// Format one session: bounds, category summary, matched and unfinished records
    fn format_session(&self, session: &AnalysisSession) -> String;

    /// Format the combined cross-window summary
    fn format_summary(&self, summary: &CombinedSummary) -> String;

    /// Format unused and unfinished totals for the whole record set
    fn format_backlog(&self, totals: &BacklogTotals) -> String;

    /// Format the list of windows to analyze
    fn format_windows(&self, windows: &[Window]) -> String;

    /// Format a full report
    fn format_report(
        &self,
        sessions: &[AnalysisSession],
        summary: &CombinedSummary,
        backlog: &BacklogTotals,
    ) -> String;
}

/// Table formatter for human-readable output
///
/// Produces ASCII tables suitable for terminal display, with costs shown
/// with a currency symbol and thousands separators.
pub struct TableFormatter {
    /// Currency symbol prefixed to costs
    pub currency: String,
}

impl TableFormatter {
    /// Create a new TableFormatter
    pub fn new(currency: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
        }
    }

    /// Insert thousands separators into a string of digits
    fn group_thousands(digits: &str) -> String {
        let mut result = String::new();

        for (count, ch) in digits.chars().rev().enumerate() {
            if count > 0 && count % 3 == 0 {
                result.push(',');
            }
            result.push(ch);
        }

        result.chars().rev().collect()
    }

    /// Format currency with symbol, separators and two decimals
    fn format_currency(&self, cost: Cost) -> String {
        let fixed = format!("{:.2}", cost.rounded());
        let (sign, unsigned) = match fixed.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", fixed.as_str()),
        };
        let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, "00"));
        format!(
            "{sign}{}{}.{fraction}",
            self.currency,
            Self::group_thousands(whole)
        )
    }

    fn format_date(date: Option<NaiveDate>) -> String {
        date.map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string())
    }

    fn new_table() -> Table {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table
    }

    fn heading(text: &str) -> String {
        format!("\n{}\n", format!("=== {text} ===").bold())
    }

    fn format_matched(&self, matched: &[MatchedRecord]) -> String {
        let mut table = Self::new_table();
        table.set_titles(row![
            b -> "Item",
            b -> "Category",
            b -> "Cost",
            b -> "Date Started",
            b -> "Date Finished",
            b -> "Days Used",
            b -> "Cost Per Day",
            b -> "Days Used in Window",
            b -> "Cost in Window"
        ]);

        for m in matched {
            table.add_row(row![
                m.record.item.as_deref().unwrap_or(""),
                m.record.category,
                r -> self.format_currency(m.record.cost),
                Self::format_date(m.record.date_started),
                Self::format_date(m.record.date_finished),
                r -> m.days_used,
                r -> self.format_currency(m.cost_per_day),
                r -> m.days_used_in_window,
                r -> self.format_currency(m.cost_in_window)
            ]);
        }

        table.to_string()
    }

    fn format_unfinished(&self, unfinished: &[Record]) -> String {
        let mut table = Self::new_table();
        table.set_titles(row![
            b -> "Item",
            b -> "Category",
            b -> "Cost",
            b -> "Date Started"
        ]);

        for record in unfinished {
            table.add_row(row![
                record.item.as_deref().unwrap_or(""),
                record.category,
                r -> self.format_currency(record.cost),
                Self::format_date(record.date_started)
            ]);
        }

        table.to_string()
    }
}

impl OutputFormatter for TableFormatter {
    fn format_session(&self, session: &AnalysisSession) -> String {
        let mut output = Self::heading(&session.window().to_string());

        let Some(analysis) = session.analysis() else {
            output.push_str("(not analyzed)\n");
            return output;
        };

        let mut table = Self::new_table();
        table.set_titles(row![b -> "Category", b -> "Cost in Window"]);
        for category_cost in analysis.summary().rows() {
            table.add_row(row![
                category_cost.category,
                r -> self.format_currency(category_cost.cost)
            ]);
        }
        table.add_row(row![
            b -> TOTAL_LABEL,
            br -> self.format_currency(analysis.summary().total())
        ]);
        output.push_str(&table.to_string());

        if !analysis.matched().is_empty() {
            output.push_str("\nFinished items:\n");
            output.push_str(&self.format_matched(analysis.matched()));
        }

        if !analysis.unfinished().is_empty() {
            output.push_str("\nUnfinished items:\n");
            output.push_str(&self.format_unfinished(analysis.unfinished()));
        }

        output
    }

    fn format_summary(&self, summary: &CombinedSummary) -> String {
        let mut table = Self::new_table();

        let mut titles = vec![Cell::new("Category").style_spec("b")];
        titles.extend(summary.columns().iter().map(|c| Cell::new(c).style_spec("b")));
        table.set_titles(Row::new(titles));

        for combined in summary.rows() {
            let mut cells = vec![Cell::new(combined.category.as_str())];
            cells.extend(combined.cells.iter().map(|cell| match cell {
                Some(cost) => Cell::new(&self.format_currency(*cost)).style_spec("r"),
                None => Cell::new("-").style_spec("r"),
            }));
            table.add_row(Row::new(cells));
        }

        let mut totals = vec![Cell::new(summary.total_label()).style_spec("b")];
        totals.extend(
            summary
                .totals()
                .iter()
                .map(|cost| Cell::new(&self.format_currency(*cost)).style_spec("br")),
        );
        table.add_row(Row::new(totals));

        table.to_string()
    }

    fn format_backlog(&self, totals: &BacklogTotals) -> String {
        format!(
            "Total Unused: {} ({} items)\nTotal Unfinished: {} ({} items)\n",
            self.format_currency(totals.unused),
            totals.unused_count,
            self.format_currency(totals.unfinished),
            totals.unfinished_count
        )
    }

    fn format_windows(&self, windows: &[Window]) -> String {
        let mut table = Self::new_table();
        table.set_titles(row![b -> "Label", b -> "Start Date", b -> "End Date", b -> "Days"]);

        for window in windows {
            table.add_row(row![
                window.label(),
                window.start().format("%Y-%m-%d"),
                window.end().format("%Y-%m-%d"),
                r -> window.days()
            ]);
        }

        table.to_string()
    }

    fn format_report(
        &self,
        sessions: &[AnalysisSession],
        summary: &CombinedSummary,
        backlog: &BacklogTotals,
    ) -> String {
        let mut output = String::new();

        for session in sessions {
            output.push_str(&self.format_session(session));
        }

        output.push_str(&Self::heading("Summary"));
        output.push_str(&self.format_summary(summary));
        output.push('\n');
        output.push_str(&self.format_backlog(backlog));

        output
    }
}

/// JSON formatter for machine-readable output
///
/// Costs are rendered as strings with two decimals so no precision is lost
/// to floating point; empty summary cells are `null`.
pub struct JsonFormatter;

impl JsonFormatter {
    fn cost(cost: Cost) -> Value {
        json!(cost.to_string())
    }

    fn date(date: Option<NaiveDate>) -> Value {
        json!(date.map(|d| d.format("%Y-%m-%d").to_string()))
    }

    fn record_json(record: &Record) -> Value {
        json!({
            "id": record.id.index(),
            "item": record.item,
            "category": record.category.as_str(),
            "cost": Self::cost(record.cost),
            "date_started": Self::date(record.date_started),
            "date_finished": Self::date(record.date_finished),
        })
    }

    fn session_json(session: &AnalysisSession) -> Value {
        let mut session_json = json!({
            "label": session.label(),
            "start": session.start().format("%Y-%m-%d").to_string(),
            "end": session.end().format("%Y-%m-%d").to_string(),
            "analyzed": session.is_analyzed(),
        });

        if let Some(analysis) = session.analysis() {
            session_json["summary"] = json!({
                "categories": analysis.summary().rows().iter().map(|row| json!({
                    "category": row.category.as_str(),
                    "cost": Self::cost(row.cost),
                })).collect::<Vec<_>>(),
                "total": Self::cost(analysis.summary().total()),
            });
            session_json["matched"] = json!(analysis.matched().iter().map(|m| {
                let mut matched_json = Self::record_json(&m.record);
                matched_json["days_used"] = json!(m.days_used);
                matched_json["cost_per_day"] = Self::cost(m.cost_per_day);
                matched_json["days_used_in_window"] = json!(m.days_used_in_window);
                matched_json["cost_in_window"] = Self::cost(m.cost_in_window);
                matched_json
            }).collect::<Vec<_>>());
            session_json["unfinished"] = json!(analysis
                .unfinished()
                .iter()
                .map(Self::record_json)
                .collect::<Vec<_>>());
        }

        session_json
    }

    fn summary_json(summary: &CombinedSummary) -> Value {
        json!({
            "columns": summary.columns(),
            "rows": summary.rows().iter().map(|row| json!({
                "category": row.category.as_str(),
                "costs": row.cells.iter().map(|cell| cell.map(Self::cost)).collect::<Vec<_>>(),
            })).collect::<Vec<_>>(),
            "totals": summary.totals().iter().map(|c| Self::cost(*c)).collect::<Vec<_>>(),
            "grand_total": Self::cost(summary.grand_total()),
        })
    }

    fn backlog_json(totals: &BacklogTotals) -> Value {
        json!({
            "unused": Self::cost(totals.unused),
            "unused_count": totals.unused_count,
            "unfinished": Self::cost(totals.unfinished),
            "unfinished_count": totals.unfinished_count,
        })
    }

    fn pretty(value: &Value) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_session(&self, session: &AnalysisSession) -> String {
        Self::pretty(&Self::session_json(session))
    }

    fn format_summary(&self, summary: &CombinedSummary) -> String {
        Self::pretty(&json!({ "summary": Self::summary_json(summary) }))
    }

    fn format_backlog(&self, totals: &BacklogTotals) -> String {
        Self::pretty(&json!({ "backlog": Self::backlog_json(totals) }))
    }

    fn format_windows(&self, windows: &[Window]) -> String {
        Self::pretty(&json!({
            "windows": windows.iter().map(|w| json!({
                "label": w.label(),
                "start": w.start().format("%Y-%m-%d").to_string(),
                "end": w.end().format("%Y-%m-%d").to_string(),
                "days": w.days(),
            })).collect::<Vec<_>>()
        }))
    }

    fn format_report(
        &self,
        sessions: &[AnalysisSession],
        summary: &CombinedSummary,
        backlog: &BacklogTotals,
    ) -> String {
        Self::pretty(&json!({
            "sessions": sessions.iter().map(Self::session_json).collect::<Vec<_>>(),
            "summary": Self::summary_json(summary),
            "backlog": Self::backlog_json(backlog),
        }))
    }
}

/// Get the appropriate formatter based on output preference
pub fn get_formatter(json: bool, currency: &str) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(TableFormatter::new(currency))
    }
}
