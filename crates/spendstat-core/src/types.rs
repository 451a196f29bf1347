//! Core domain types for spendstat
//!
//! This module contains the fundamental types used throughout the spendstat
//! crates. These types provide strong typing for categories, decimal costs,
//! expenditure records and the labelled date windows they are summarized over.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use tracing::debug;

use crate::error::{Result, SpendstatError};

/// Strongly-typed spending category
///
/// Categories are free text. They are the merge key of the cross-period
/// summary, so they are compared exactly (case and whitespace included).
///
/// # Examples
/// ```
/// use spendstat_core::types::Category;
///
/// let category = Category::new("Travel");
/// assert_eq!(category.as_str(), "Travel");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    /// Create a new Category from any string-like type
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Category {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Fixed-point currency amount
///
/// Wraps a [`Decimal`] so repeated division and multiplication during
/// apportionment does not accumulate floating-point drift.
///
/// # Examples
/// ```
/// use spendstat_core::types::Cost;
/// use rust_decimal::Decimal;
///
/// let cost = Cost::new(Decimal::from(310));
/// assert_eq!(cost.per_day(31), Cost::new(Decimal::from(10)));
/// assert_eq!(cost.apportion(17, 31), Cost::new(Decimal::from(170)));
/// ```
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Cost(Decimal);

impl Cost {
    /// Zero cost
    pub const ZERO: Cost = Cost(Decimal::ZERO);

    /// Largest magnitude a record's cost may have (one quadrillion)
    ///
    /// Keeps `cost * days` and sums over any realistic record set well
    /// inside `Decimal`'s range, so apportionment and totals cannot overflow.
    pub const MAX: Cost = Cost(Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0));

    /// Whether the magnitude is within [`Cost::MAX`]
    pub fn is_in_range(&self) -> bool {
        self.0.abs() <= Self::MAX.0
    }

    /// Create a new Cost
    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Get the inner decimal
    pub fn inner(&self) -> Decimal {
        self.0
    }

    /// Whether this cost is below zero
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Cost spread evenly over `days`
    ///
    /// `days` must be positive; callers derive it from an inclusive day count.
    pub fn per_day(&self, days: i64) -> Cost {
        Cost(self.0 / Decimal::from(days))
    }

    /// Share of this cost covering `part` out of `whole` days
    ///
    /// Multiplies before dividing so whole-window shares stay exact.
    pub fn apportion(&self, part: i64, whole: i64) -> Cost {
        Cost(self.0 * Decimal::from(part) / Decimal::from(whole))
    }

    /// Round to currency precision for display, halves away from zero
    pub fn rounded(&self) -> Decimal {
        self.0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.rounded())
    }
}

impl From<Decimal> for Cost {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Cost {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl AddAssign for Cost {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sum for Cost {
    fn sum<I: Iterator<Item = Cost>>(iter: I) -> Self {
        iter.fold(Cost::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Cost> for Cost {
    fn sum<I: Iterator<Item = &'a Cost>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Position of a record in its source
///
/// Assigned by the record source in load order and used to identify a
/// record in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(usize);

impl RecordId {
    /// Create a new RecordId
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Get the inner index
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a record stands in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordState {
    /// Not yet begun: no start date
    Unused,
    /// Started but with no known finish
    Unfinished,
    /// Started and finished
    Finished,
}

/// One expenditure line
///
/// # Examples
/// ```
/// use spendstat_core::types::{Category, Cost, Record, RecordId, RecordState};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let record = Record::new(RecordId::new(0), Category::new("Travel"), Cost::new(Decimal::from(310)))
///     .with_started(NaiveDate::from_ymd_opt(2022, 10, 1).unwrap())
///     .with_finished(NaiveDate::from_ymd_opt(2022, 10, 31).unwrap());
///
/// assert_eq!(record.state(), RecordState::Finished);
/// assert_eq!(record.days_used().unwrap(), Some(31));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Position in the source
    pub id: RecordId,
    /// Spending category
    pub category: Category,
    /// Total cost of the record
    pub cost: Cost,
    /// Date the record started (absent means not yet begun)
    pub date_started: Option<NaiveDate>,
    /// Date the record finished (absent means still active)
    pub date_finished: Option<NaiveDate>,
    /// Optional free-text description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
}

impl Record {
    /// Create a record with no dates
    pub fn new(id: RecordId, category: Category, cost: Cost) -> Self {
        Self {
            id,
            category,
            cost,
            date_started: None,
            date_finished: None,
            item: None,
        }
    }

    /// Set the start date
    pub fn with_started(mut self, date: NaiveDate) -> Self {
        self.date_started = Some(date);
        self
    }

    /// Set the finish date
    pub fn with_finished(mut self, date: NaiveDate) -> Self {
        self.date_finished = Some(date);
        self
    }

    /// Set the description
    pub fn with_item(mut self, item: impl Into<String>) -> Self {
        self.item = Some(item.into());
        self
    }

    /// Classify the record by which dates it carries
    pub fn state(&self) -> RecordState {
        match (self.date_started, self.date_finished) {
            (None, _) => RecordState::Unused,
            (Some(_), None) => RecordState::Unfinished,
            (Some(_), Some(_)) => RecordState::Finished,
        }
    }

    /// Check the start <= finish invariant and the cost bound
    pub fn validate(&self) -> Result<()> {
        if !self.cost.is_in_range() {
            debug!("Rejecting record {}: cost {} out of range", self.id, self.cost.inner());
            return Err(SpendstatError::CostOutOfRange {
                record: self.id,
                cost: self.cost.inner(),
            });
        }
        if let (Some(start), Some(finish)) = (self.date_started, self.date_finished) {
            if finish < start {
                debug!("Rejecting record {}: finish {} before start {}", self.id, finish, start);
                return Err(SpendstatError::DataIntegrity {
                    record: self.id,
                    start,
                    finish,
                });
            }
        }
        Ok(())
    }

    /// Inclusive number of days between start and finish
    ///
    /// `None` unless the record is finished. Never zero for a valid record.
    pub fn days_used(&self) -> Result<Option<i64>> {
        self.validate()?;
        Ok(match (self.date_started, self.date_finished) {
            (Some(start), Some(finish)) => Some(inclusive_days(start, finish)),
            _ => None,
        })
    }
}

/// Inclusive day count of `[start, end]`
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

/// Window definition as read from configuration, before validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSpec {
    /// Label naming the window
    pub label: String,
    /// First day of the window
    pub start: NaiveDate,
    /// Last day of the window
    pub end: NaiveDate,
}

/// A labelled closed date interval `[start, end]`
///
/// Construction checks `start <= end`, so every `Window` in circulation is
/// non-empty.
///
/// # Examples
/// ```
/// use spendstat_core::types::Window;
/// use chrono::NaiveDate;
///
/// let window = Window::new(
///     "October",
///     NaiveDate::from_ymd_opt(2022, 10, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2022, 10, 31).unwrap(),
/// ).unwrap();
/// assert_eq!(window.days(), 31);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "WindowSpec", into = "WindowSpec")]
pub struct Window {
    label: String,
    start: NaiveDate,
    end: NaiveDate,
}

impl Window {
    /// Create a window, rejecting `end < start`
    pub fn new(label: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Result<Self> {
        let label = label.into();
        if end < start {
            return Err(SpendstatError::InvalidWindow { label, start, end });
        }
        Ok(Self { label, start, end })
    }

    /// Label naming the window
    pub fn label(&self) -> &str {
        &self.label
    }

    /// First day of the window
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the window
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Inclusive length in days
    pub fn days(&self) -> i64 {
        inclusive_days(self.start, self.end)
    }

    /// Intersection of `[start, finish]` with this window, if any
    pub fn intersection(&self, start: NaiveDate, finish: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        let lo = start.max(self.start);
        let hi = finish.min(self.end);
        (lo <= hi).then_some((lo, hi))
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} - {})",
            self.label,
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

impl TryFrom<WindowSpec> for Window {
    type Error = SpendstatError;

    fn try_from(spec: WindowSpec) -> Result<Self> {
        Window::new(spec.label, spec.start, spec.end)
    }
}

impl From<Window> for WindowSpec {
    fn from(window: Window) -> Self {
        WindowSpec {
            label: window.label,
            start: window.start,
            end: window.end,
        }
    }
}
