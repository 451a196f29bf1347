//! Common test utilities and helpers for spendstat tests
//!
//! This module provides a record builder, date helpers and fixture writers
//! shared by the integration and property tests.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use spendstat::types::{Category, Cost, Record, RecordId, Window};
use std::path::PathBuf;
use tempfile::TempDir;

/// Common test categories
#[allow(dead_code)]
pub const TEST_CATEGORIES: &[&str] = &["Clothes", "Food", "Gym", "Travel", "Utilities"];

/// Shorthand for a calendar date
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Shorthand for a window
pub fn window(label: &str, start: NaiveDate, end: NaiveDate) -> Window {
    Window::new(label, start, end).unwrap()
}

/// The September and October 2022 windows, newest first
#[allow(dead_code)]
pub fn autumn_windows() -> Vec<Window> {
    vec![
        window("Oct", date(2022, 10, 1), date(2022, 10, 31)),
        window("Sep", date(2022, 9, 1), date(2022, 9, 30)),
    ]
}

/// Builder for creating test Record instances
pub struct RecordBuilder {
    id: usize,
    category: String,
    cost: Decimal,
    date_started: Option<NaiveDate>,
    date_finished: Option<NaiveDate>,
    item: Option<String>,
}

impl RecordBuilder {
    /// Create a new builder: an unused 10.00 Food record
    pub fn new() -> Self {
        Self {
            id: 0,
            category: TEST_CATEGORIES[1].to_string(),
            cost: Decimal::new(1000, 2),
            date_started: None,
            date_finished: None,
            item: None,
        }
    }

    pub fn with_id(mut self, id: usize) -> Self {
        self.id = id;
        self
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = category.to_string();
        self
    }

    pub fn with_cost(mut self, cost: Decimal) -> Self {
        self.cost = cost;
        self
    }

    pub fn started(mut self, date: NaiveDate) -> Self {
        self.date_started = Some(date);
        self
    }

    pub fn finished(mut self, date: NaiveDate) -> Self {
        self.date_finished = Some(date);
        self
    }

    #[allow(dead_code)]
    pub fn with_item(mut self, item: &str) -> Self {
        self.item = Some(item.to_string());
        self
    }

    pub fn build(self) -> Record {
        Record {
            id: RecordId::new(self.id),
            category: Category::new(self.category),
            cost: Cost::new(self.cost),
            date_started: self.date_started,
            date_finished: self.date_finished,
            item: self.item,
        }
    }
}

impl Default for RecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a record as a workbook-export row
#[allow(dead_code)]
pub fn export_row(record: &Record) -> Value {
    json!({
        "Item": record.item,
        "Category": record.category.as_str(),
        "Cost": record.cost.inner().to_string(),
        "Date Started": record.date_started.map(|d| d.to_string()),
        "Date Finished": record.date_finished.map(|d| d.to_string()),
    })
}

/// Write records as a JSON export into a fresh temp directory
#[allow(dead_code)]
pub async fn write_export(records: &[Record]) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("spending.json");
    let rows: Vec<Value> = records.iter().map(export_row).collect();
    tokio::fs::write(&path, serde_json::to_string_pretty(&rows).unwrap())
        .await
        .unwrap();
    (dir, path)
}
