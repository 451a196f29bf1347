//! JSON record loader
//!
//! Reads expenditure rows exported from the spending workbook. A source path
//! may be a single file or a directory; directories are walked for `*.json`
//! and `*.jsonl` files, which are read in sorted order.
//!
//! Rows accept both snake_case keys and the workbook's column headers:
//!
//! ```json
//! [
//!   {"Category": "Travel", "Cost": 310, "Date Started": "2022-10-01", "Date Finished": "2022-10-31"},
//!   {"category": "Food", "cost": "12.50", "date_started": "2022-10-05T00:00:00", "date_finished": null}
//! ]
//! ```

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use futures::stream::Stream;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use spendstat_core::error::{Result, SpendstatError};
use spendstat_core::provider::RecordSource;
use spendstat_core::types::{Category, Cost, Record, RecordId};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use tracing::{debug, warn};

/// Environment variable naming the record source path
pub const DATA_PATH_ENV: &str = "SPENDSTAT_DATA";

/// Data loader for JSON expenditure records.
pub struct DataLoader {
    path: PathBuf,
}

impl DataLoader {
    /// Create a loader reading from an explicit file or directory
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file or directory this loader reads
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RecordSource for DataLoader {
    async fn new() -> Result<Self> {
        let path = if let Ok(data_path) = std::env::var(DATA_PATH_ENV) {
            PathBuf::from(data_path)
        } else {
            dirs::home_dir()
                .ok_or_else(|| SpendstatError::Config("Cannot determine home directory".into()))?
                .join(".spendstat")
                .join("records")
        };

        if !path.exists() {
            debug!("Record source not found: {}", path.display());
        }

        Ok(DataLoader { path })
    }

    fn load_records(&self) -> Pin<Box<dyn Stream<Item = Result<Record>> + Send + '_>> {
        Box::pin(async_stream::try_stream! {
            if !self.path.exists() {
                warn!("Record source {} does not exist", self.path.display());
                return;
            }

            let files = discover_files(&self.path);
            debug!("Found {} record files", files.len());

            let mut next_id = 0usize;
            for path in files {
                let rows = parse_record_file(&path).await?;
                debug!("Read {} rows from {}", rows.len(), path.display());

                for row in rows {
                    let record = row.into_record(RecordId::new(next_id), &path)?;
                    next_id += 1;
                    yield record;
                }
            }
        })
    }
}

/// List the record files under `path` in a stable order
fn discover_files(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        return vec![path.to_path_buf()];
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(path)
        .min_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .is_some_and(|ext| ext == "json" || ext == "jsonl")
        })
        .collect();
    files.sort();
    files
}

// ---------------------------------------------------------------------------
// Row schema
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(untagged)]
enum RecordDocument {
    Rows(Vec<RecordRow>),
    Wrapped { records: Vec<RecordRow> },
}

#[derive(Debug, Deserialize)]
struct RecordRow {
    #[serde(alias = "Category")]
    category: String,
    #[serde(alias = "Cost")]
    cost: Decimal,
    #[serde(default, alias = "Date Started", deserialize_with = "deserialize_date")]
    date_started: Option<NaiveDate>,
    #[serde(default, alias = "Date Finished", deserialize_with = "deserialize_date")]
    date_finished: Option<NaiveDate>,
    #[serde(default, alias = "Item")]
    item: Option<String>,
}

impl RecordRow {
    fn into_record(self, id: RecordId, file: &Path) -> Result<Record> {
        if self.cost.is_sign_negative() && !self.cost.is_zero() {
            return Err(SpendstatError::Parse {
                file: file.to_path_buf(),
                error: format!("record {id} has negative cost {}", self.cost),
            });
        }

        if !Cost::new(self.cost).is_in_range() {
            return Err(SpendstatError::Parse {
                file: file.to_path_buf(),
                error: format!(
                    "record {id} has cost {} above the supported maximum {}",
                    self.cost,
                    Cost::MAX.inner()
                ),
            });
        }

        if self.date_started.is_none() && self.date_finished.is_some() {
            warn!(
                "Record {} in {} has a finish date but no start date; it will be treated as unused",
                id,
                file.display()
            );
        }

        Ok(Record {
            id,
            category: Category::new(self.category),
            cost: Cost::new(self.cost),
            date_started: self.date_started,
            date_finished: self.date_finished,
            item: self.item.filter(|s| !s.trim().is_empty()),
        })
    }
}

/// Parse a date cell: `YYYY-MM-DD`, a datetime whose time is dropped, or blank
fn deserialize_date<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_date_cell(s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date '{s}'"))),
    }
}

fn parse_date_cell(s: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
}

async fn parse_record_file(path: &Path) -> Result<Vec<RecordRow>> {
    let content = tokio::fs::read_to_string(path).await?;
    let parse_error = |error: String| SpendstatError::Parse {
        file: path.to_path_buf(),
        error,
    };

    if path.extension().is_some_and(|ext| ext == "jsonl") {
        let mut rows = Vec::new();
        for (line_no, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let row = serde_json::from_str::<RecordRow>(line)
                .map_err(|e| parse_error(format!("line {}: {}", line_no + 1, e)))?;
            rows.push(row);
        }
        return Ok(rows);
    }

    match serde_json::from_str::<RecordDocument>(&content) {
        Ok(RecordDocument::Rows(rows)) | Ok(RecordDocument::Wrapped { records: rows }) => Ok(rows),
        Err(e) => Err(parse_error(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    // Serializes environment variable modifications in tests
    static ENV_MUTEX: Lazy<tokio::sync::Mutex<()>> = Lazy::new(|| tokio::sync::Mutex::new(()));

    /// Restores an environment variable when dropped
    struct EnvVarGuard {
        key: String,
        original: Option<String>,
    }

    impl EnvVarGuard {
        fn set(key: &str, value: &str) -> Self {
            let original = std::env::var(key).ok();
            // env::set_var is unsafe since Rust 2024
            unsafe {
                std::env::set_var(key, value);
            }
            Self {
                key: key.to_string(),
                original,
            }
        }
    }

    impl Drop for EnvVarGuard {
        fn drop(&mut self) {
            unsafe {
                match &self.original {
                    Some(v) => std::env::set_var(&self.key, v),
                    None => std::env::remove_var(&self.key),
                }
            }
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_load_workbook_headers() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("spending.json");
        tokio::fs::write(
            &file,
            r#"[
                {"Item": "Train pass", "Category": "Travel", "Cost": 310, "Date Started": "2022-10-01", "Date Finished": "2022-10-31"},
                {"Item": "", "Category": "Food", "Cost": "12.50", "Date Started": "2022-10-05T00:00:00", "Date Finished": null},
                {"Category": "Gadgets", "Cost": 99.99, "Date Started": "", "Date Finished": ""}
            ]"#,
        )
        .await
        .unwrap();

        let records = DataLoader::with_path(&file).collect_records().await.unwrap();
        assert_eq!(records.len(), 3);

        assert_eq!(records[0].id, RecordId::new(0));
        assert_eq!(records[0].category.as_str(), "Travel");
        assert_eq!(records[0].cost, Cost::new(dec!(310)));
        assert_eq!(records[0].date_finished, Some(date(2022, 10, 31)));
        assert_eq!(records[0].item.as_deref(), Some("Train pass"));

        assert_eq!(records[1].cost, Cost::new(dec!(12.50)));
        assert_eq!(records[1].date_started, Some(date(2022, 10, 5)));
        assert_eq!(records[1].date_finished, None);
        assert_eq!(records[1].item, None);

        assert_eq!(records[2].date_started, None);
        assert_eq!(records[2].cost, Cost::new(dec!(99.99)));
    }

    #[tokio::test]
    async fn test_load_directory_in_sorted_order() {
        let dir = TempDir::new().unwrap();
        tokio::fs::write(
            dir.path().join("b.jsonl"),
            "{\"category\":\"Food\",\"cost\":5,\"date_started\":\"2022-09-01\",\"date_finished\":\"2022-09-01\"}\n\n",
        )
        .await
        .unwrap();
        tokio::fs::write(
            dir.path().join("a.json"),
            r#"{"records":[{"category":"Travel","cost":1},{"category":"Rent","cost":2}]}"#,
        )
        .await
        .unwrap();
        tokio::fs::write(dir.path().join("notes.txt"), "ignored").await.unwrap();

        let records = DataLoader::with_path(dir.path()).collect_records().await.unwrap();
        let categories: Vec<_> = records.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(categories, vec!["Travel", "Rent", "Food"]);
        let ids: Vec<_> = records.iter().map(|r| r.id.index()).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_bad_row_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("bad.jsonl");
        tokio::fs::write(
            &file,
            "{\"category\":\"Food\",\"cost\":5}\n{\"category\":\"Food\",\"cost\":5,\"date_started\":\"yesterday\"}\n",
        )
        .await
        .unwrap();

        let err = DataLoader::with_path(&file).collect_records().await.unwrap_err();
        match err {
            SpendstatError::Parse { file: f, error } => {
                assert_eq!(f, file);
                assert!(error.starts_with("line 2"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_negative_cost_is_rejected() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("neg.json");
        tokio::fs::write(&file, r#"[{"category":"Refund","cost":-3}]"#)
            .await
            .unwrap();

        let err = DataLoader::with_path(&file).collect_records().await.unwrap_err();
        assert!(matches!(err, SpendstatError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_oversized_cost_is_rejected() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("huge.json");
        tokio::fs::write(
            &file,
            r#"[{"category":"Travel","cost":"3000000000000000000000000000","date_started":"2022-09-01","date_finished":"2022-11-30"}]"#,
        )
        .await
        .unwrap();

        let err = DataLoader::with_path(&file).collect_records().await.unwrap_err();
        match err {
            SpendstatError::Parse { error, .. } => assert!(error.contains("maximum")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_missing_path_yields_nothing() {
        let dir = TempDir::new().unwrap();
        let loader = DataLoader::with_path(dir.path().join("absent"));
        assert!(loader.collect_records().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_new_reads_env_override() {
        let _lock = ENV_MUTEX.lock().await;
        let dir = TempDir::new().unwrap();
        let _guard = EnvVarGuard::set(DATA_PATH_ENV, dir.path().to_str().unwrap());

        let loader = DataLoader::new().await.unwrap();
        assert_eq!(loader.path(), dir.path());
    }

    #[test]
    fn test_parse_date_cell_formats() {
        assert_eq!(parse_date_cell("2022-10-01"), Some(date(2022, 10, 1)));
        assert_eq!(parse_date_cell("2022-10-01 13:45:00"), Some(date(2022, 10, 1)));
        assert_eq!(parse_date_cell("2022-10-01T00:00:00.000"), Some(date(2022, 10, 1)));
        assert_eq!(parse_date_cell("01/10/2022"), None);
    }
}
