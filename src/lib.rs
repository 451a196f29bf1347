//! spendstat - Apportion dated expenditure records across date windows
//!
//! This library provides functionality to:
//! - Load expenditure records (category, cost, start and finish dates) from JSON exports
//! - Spread each finished item's cost evenly over the days it was in use
//! - Report the cost falling inside each analysis window, per category
//! - Merge the per-window summaries into one cross-period table
//! - Generate reports in table and JSON formats
//!
//! # Examples
//!
//! ```no_run
//! use spendstat::{
//!     aggregation::aggregate,
//!     provider::RecordSource,
//!     session::analyze_windows,
//!     windows::WindowSet,
//! };
//! use spendstat_provider_json::DataLoader;
//!
//! #[tokio::main]
//! async fn main() -> spendstat::Result<()> {
//!     let loader = DataLoader::with_path("spending.json");
//!     let records = loader.collect_records().await?;
//!
//!     let windows = WindowSet::monthly((2022, 3), (2022, 10))?.newest_first();
//!     let sessions = analyze_windows(&records, windows, false)?;
//!     let summary = aggregate(&sessions)?;
//!
//!     println!("Total across windows: {}", summary.grand_total());
//!     Ok(())
//! }
//! ```

pub mod aggregation;
pub mod analyzer;
pub mod cli;
pub mod output;
pub mod session;
pub mod windows;

// Re-export core modules so callers only need this crate
pub use spendstat_core::{error, filters, provider, types};

// Re-export commonly used types
pub use error::{Result, SpendstatError};
pub use types::{Category, Cost, Record, RecordId, RecordState, Window};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
