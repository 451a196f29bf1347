//! Period analysis of expenditure records
//!
//! For a single window this module:
//!
//! 1. keeps the records whose active range overlaps the window,
//! 2. sets aside the overlapping records with no finish date as unfinished,
//! 3. spreads each finished record's cost evenly over the days it was active
//!    and keeps the share that falls inside the window,
//! 4. sums those shares per category.
//!
//! Unfinished records carry no cost share: without a finish date there is no
//! daily rate to apportion.
//!
//! # Examples
//!
//! ```
//! use spendstat::analyzer::analyze;
//! use spendstat::types::{Category, Cost, Record, RecordId, Window};
//! use chrono::NaiveDate;
//! use rust_decimal::Decimal;
//!
//! # fn main() -> spendstat::Result<()> {
//! let day = |d| NaiveDate::from_ymd_opt(2022, 10, d).unwrap();
//! let records = vec![
//!     Record::new(RecordId::new(0), Category::new("Travel"), Cost::new(Decimal::from(310)))
//!         .with_started(day(1))
//!         .with_finished(day(31)),
//! ];
//!
//! let window = Window::new("Second half", day(15), day(31))?;
//! let analysis = analyze(&records, &window)?;
//!
//! assert_eq!(analysis.matched()[0].days_used_in_window, 17);
//! assert_eq!(analysis.summary().total(), Cost::new(Decimal::from(170)));
//! # Ok(())
//! # }
//! ```

use crate::error::Result;
use crate::filters::WindowFilter;
use crate::types::{Category, Cost, Record, RecordState, Window, inclusive_days};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Label of the synthetic row holding a column sum
pub const TOTAL_LABEL: &str = "Total";

/// A finished record overlapping the window, with its apportioned cost
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchedRecord {
    /// The source record
    pub record: Record,
    /// Inclusive days between start and finish
    pub days_used: i64,
    /// Cost spread evenly over `days_used`
    pub cost_per_day: Cost,
    /// Inclusive days the record was active inside the window
    pub days_used_in_window: i64,
    /// Share of the cost falling inside the window
    pub cost_in_window: Cost,
}

/// Apportioned cost for one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCost {
    /// Category name
    pub category: Category,
    /// Sum of `cost_in_window` for the category
    pub cost: Cost,
}

/// Cost in window per category, sorted by category, with a total
///
/// Categories without a matching finished record are absent rather than
/// present with zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    rows: Vec<CategoryCost>,
    total: Cost,
}

impl CategorySummary {
    /// Group matched records by category
    pub fn from_matched(matched: &[MatchedRecord]) -> Self {
        let mut by_category: BTreeMap<&Category, Cost> = BTreeMap::new();
        for m in matched {
            *by_category.entry(&m.record.category).or_default() += m.cost_in_window;
        }

        let rows: Vec<CategoryCost> = by_category
            .into_iter()
            .map(|(category, cost)| CategoryCost {
                category: category.clone(),
                cost,
            })
            .collect();
        let total = rows.iter().map(|r| r.cost).sum();

        Self { rows, total }
    }

    /// Category rows, excluding the total
    pub fn rows(&self) -> &[CategoryCost] {
        &self.rows
    }

    /// Sum of all category rows
    pub fn total(&self) -> Cost {
        self.total
    }

    /// Cost for a category, if it appears in this window
    pub fn get(&self, category: &Category) -> Option<Cost> {
        self.rows
            .binary_search_by(|row| row.category.cmp(category))
            .ok()
            .map(|idx| self.rows[idx].cost)
    }

    /// Number of category rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no category had spend in the window
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows as `(label, cost)` pairs followed by the `Total` row
    pub fn rows_with_total(&self) -> impl Iterator<Item = (&str, Cost)> {
        self.rows
            .iter()
            .map(|row| (row.category.as_str(), row.cost))
            .chain(std::iter::once((TOTAL_LABEL, self.total)))
    }
}

/// The three result tables for one window
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PeriodAnalysis {
    matched: Vec<MatchedRecord>,
    unfinished: Vec<Record>,
    summary: CategorySummary,
}

impl PeriodAnalysis {
    /// Finished records overlapping the window, in source order
    pub fn matched(&self) -> &[MatchedRecord] {
        &self.matched
    }

    /// Unfinished records overlapping the window, in source order
    pub fn unfinished(&self) -> &[Record] {
        &self.unfinished
    }

    /// Cost in window per category
    pub fn summary(&self) -> &CategorySummary {
        &self.summary
    }
}

/// Analyze `records` against a single window
///
/// Every record is checked for `finish >= start` first, whether or not it
/// overlaps the window, so the same record set fails the same way for every
/// window.
pub fn analyze(records: &[Record], window: &Window) -> Result<PeriodAnalysis> {
    for record in records {
        record.validate()?;
    }

    let mut matched = Vec::new();
    let mut unfinished = Vec::new();

    for record in WindowFilter::new(window).apply(records) {
        match record.state() {
            RecordState::Unfinished => unfinished.push(record.clone()),
            RecordState::Finished => {
                if let Some(m) = apportion(record, window) {
                    matched.push(m);
                }
            }
            RecordState::Unused => {}
        }
    }

    let summary = CategorySummary::from_matched(&matched);

    debug!(
        "Window {}: {} finished, {} unfinished, {} categories, total {}",
        window.label(),
        matched.len(),
        unfinished.len(),
        summary.len(),
        summary.total()
    );

    Ok(PeriodAnalysis {
        matched,
        unfinished,
        summary,
    })
}

/// Derive the per-day and in-window figures for a finished record
fn apportion(record: &Record, window: &Window) -> Option<MatchedRecord> {
    let (start, finish) = record.date_started.zip(record.date_finished)?;
    let (lo, hi) = window.intersection(start, finish)?;

    let days_used = inclusive_days(start, finish);
    let days_used_in_window = inclusive_days(lo, hi);

    Some(MatchedRecord {
        record: record.clone(),
        days_used,
        cost_per_day: record.cost.per_day(days_used),
        days_used_in_window,
        cost_in_window: record.cost.apportion(days_used_in_window, days_used),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SpendstatError;
    use crate::types::RecordId;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn october() -> Window {
        Window::new("October", date(2022, 10, 1), date(2022, 10, 31)).unwrap()
    }

    fn finished(
        id: usize,
        category: &str,
        cost: rust_decimal::Decimal,
        start: NaiveDate,
        finish: NaiveDate,
    ) -> Record {
        Record::new(RecordId::new(id), Category::new(category), Cost::new(cost))
            .with_started(start)
            .with_finished(finish)
    }

    #[test]
    fn test_full_window_match() {
        let records = vec![finished(0, "Travel", dec!(310), date(2022, 10, 1), date(2022, 10, 31))];
        let analysis = analyze(&records, &october()).unwrap();

        let m = &analysis.matched()[0];
        assert_eq!(m.days_used, 31);
        assert_eq!(m.cost_per_day, Cost::new(dec!(10)));
        assert_eq!(m.days_used_in_window, 31);
        assert_eq!(m.cost_in_window, Cost::new(dec!(310)));
        assert_eq!(analysis.summary().total(), Cost::new(dec!(310)));
    }

    #[test]
    fn test_partial_window_match() {
        let records = vec![finished(0, "Travel", dec!(310), date(2022, 10, 1), date(2022, 10, 31))];
        let window = Window::new("Late October", date(2022, 10, 15), date(2022, 10, 31)).unwrap();
        let analysis = analyze(&records, &window).unwrap();

        let m = &analysis.matched()[0];
        assert_eq!(m.days_used_in_window, 17);
        assert_eq!(m.cost_in_window, Cost::new(dec!(170)));
    }

    #[test]
    fn test_record_spanning_months() {
        // 61 days: Sep 15 - Nov 14, of which all 31 October days fall in the window
        let records = vec![finished(0, "Rent", dec!(610), date(2022, 9, 15), date(2022, 11, 14))];
        let analysis = analyze(&records, &october()).unwrap();

        let m = &analysis.matched()[0];
        assert_eq!(m.days_used, 61);
        assert_eq!(m.days_used_in_window, 31);
        assert_eq!(m.cost_in_window, Cost::new(dec!(310)));
    }

    #[test]
    fn test_single_day_record() {
        let records = vec![finished(0, "Food", dec!(7.25), date(2022, 10, 9), date(2022, 10, 9))];
        let analysis = analyze(&records, &october()).unwrap();

        let m = &analysis.matched()[0];
        assert_eq!(m.days_used, 1);
        assert_eq!(m.cost_per_day, Cost::new(dec!(7.25)));
        assert_eq!(m.cost_in_window, Cost::new(dec!(7.25)));
    }

    #[test]
    fn test_unfinished_records_are_set_aside() {
        let records = vec![
            Record::new(RecordId::new(0), Category::new("Gym"), Cost::new(dec!(50)))
                .with_started(date(2022, 10, 5)),
            finished(1, "Food", dec!(20), date(2022, 10, 1), date(2022, 10, 2)),
        ];
        let analysis = analyze(&records, &october()).unwrap();

        assert_eq!(analysis.unfinished().len(), 1);
        assert_eq!(analysis.unfinished()[0].id, RecordId::new(0));
        assert_eq!(analysis.matched().len(), 1);
        assert!(analysis.summary().get(&Category::new("Gym")).is_none());
        assert_eq!(analysis.summary().total(), Cost::new(dec!(20)));
    }

    #[test]
    fn test_unused_and_outside_records_are_ignored() {
        let records = vec![
            Record::new(RecordId::new(0), Category::new("Books"), Cost::new(dec!(30))),
            finished(1, "Food", dec!(20), date(2022, 9, 1), date(2022, 9, 30)),
            Record::new(RecordId::new(2), Category::new("Gym"), Cost::new(dec!(50)))
                .with_started(date(2022, 11, 1)),
        ];
        let analysis = analyze(&records, &october()).unwrap();

        assert!(analysis.matched().is_empty());
        assert!(analysis.unfinished().is_empty());
        assert!(analysis.summary().is_empty());
        assert_eq!(analysis.summary().total(), Cost::ZERO);
    }

    #[test]
    fn test_summary_groups_and_sorts_by_category() {
        let records = vec![
            finished(0, "Travel", dec!(31), date(2022, 10, 1), date(2022, 10, 31)),
            finished(1, "Food", dec!(10), date(2022, 10, 3), date(2022, 10, 3)),
            finished(2, "Travel", dec!(5), date(2022, 10, 4), date(2022, 10, 4)),
        ];
        let analysis = analyze(&records, &october()).unwrap();
        let rows: Vec<_> = analysis
            .summary()
            .rows_with_total()
            .map(|(label, cost)| (label.to_string(), cost))
            .collect();

        assert_eq!(
            rows,
            vec![
                ("Food".to_string(), Cost::new(dec!(10))),
                ("Travel".to_string(), Cost::new(dec!(36))),
                ("Total".to_string(), Cost::new(dec!(46))),
            ]
        );
    }

    #[test]
    fn test_inverted_record_fails_even_outside_window() {
        let records = vec![
            finished(0, "Food", dec!(10), date(2022, 10, 1), date(2022, 10, 2)),
            finished(1, "Travel", dec!(10), date(2021, 5, 2), date(2021, 5, 1)),
        ];
        let err = analyze(&records, &october()).unwrap_err();
        assert!(matches!(
            err,
            SpendstatError::DataIntegrity { record, .. } if record == RecordId::new(1)
        ));
    }

    #[test]
    fn test_empty_record_set() {
        let analysis = analyze(&[], &october()).unwrap();
        assert_eq!(analysis, PeriodAnalysis::default());
    }

    #[test]
    fn test_analyze_is_idempotent() {
        let records = vec![
            finished(0, "Travel", dec!(100), date(2022, 10, 1), date(2022, 10, 3)),
            Record::new(RecordId::new(1), Category::new("Gym"), Cost::new(dec!(50)))
                .with_started(date(2022, 10, 5)),
        ];
        let first = analyze(&records, &october()).unwrap();
        let second = analyze(&records, &october()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_oversized_cost_is_an_error_not_a_panic() {
        let huge = rust_decimal::Decimal::from_i128_with_scale(3 * 10i128.pow(27), 0);
        let records = vec![finished(0, "Travel", huge, date(2022, 9, 1), date(2022, 11, 30))];

        let err = analyze(&records, &october()).unwrap_err();
        assert!(matches!(err, SpendstatError::CostOutOfRange { .. }));
    }

    #[test]
    fn test_largest_allowed_cost_apportions() {
        let records = vec![finished(
            0,
            "Travel",
            Cost::MAX.inner(),
            date(2022, 9, 1),
            date(2022, 11, 30),
        )];
        let analysis = analyze(&records, &october()).unwrap();
        assert!(analysis.summary().total() < Cost::MAX);
    }
}
