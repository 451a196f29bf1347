//! Interval overlap filtering for expenditure records
//!
//! A record is active from its start date through its finish date, or
//! indefinitely when it has no finish. This module decides whether that
//! active range touches a query window.
//!
//! # Examples
//!
//! ```
//! use spendstat_core::filters::overlaps;
//! use spendstat_core::types::{Category, Cost, Record, RecordId, Window};
//! use chrono::NaiveDate;
//! use rust_decimal::Decimal;
//!
//! let october = Window::new(
//!     "October",
//!     NaiveDate::from_ymd_opt(2022, 10, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2022, 10, 31).unwrap(),
//! ).unwrap();
//!
//! let ongoing = Record::new(RecordId::new(0), Category::new("Rent"), Cost::new(Decimal::from(900)))
//!     .with_started(NaiveDate::from_ymd_opt(2022, 1, 1).unwrap());
//!
//! assert!(overlaps(&ongoing, &october));
//! ```

use crate::types::{Record, Window};

/// Whether the record's active range intersects the window (both inclusive)
///
/// - No start date: never overlaps.
/// - No finish date: overlaps when it started on or before the window's end.
/// - Otherwise: closed-interval intersection.
pub fn overlaps(record: &Record, window: &Window) -> bool {
    let Some(start) = record.date_started else {
        return false;
    };

    if start > window.end() {
        return false;
    }

    match record.date_finished {
        None => true,
        Some(finish) => finish >= window.start(),
    }
}

/// Filter over a record slice for a single window
///
/// Borrowing wrapper used by the analyzer; yields records in source order.
#[derive(Debug, Clone, Copy)]
pub struct WindowFilter<'a> {
    window: &'a Window,
}

impl<'a> WindowFilter<'a> {
    /// Create a filter for the given window
    pub fn new(window: &'a Window) -> Self {
        Self { window }
    }

    /// Check if a record passes the filter
    pub fn matches(&self, record: &Record) -> bool {
        overlaps(record, self.window)
    }

    /// Iterate over the matching records
    pub fn apply<'r>(&self, records: &'r [Record]) -> impl Iterator<Item = &'r Record> {
        let filter = *self;
        records.iter().filter(move |r| filter.matches(r))
    }
}
