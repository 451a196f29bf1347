//! Error types for spendstat
//!
//! This module defines the error types used throughout the spendstat crates.
//! All errors are derived from `thiserror` for convenient error handling
//! and automatic `From` implementations.
//!
//! # Example
//!
//! ```
//! use spendstat_core::error::{SpendstatError, Result};
//!
//! fn example_function() -> Result<()> {
//!     // This will automatically convert io::Error to SpendstatError
//!     let _file = std::fs::read_to_string("nonexistent.txt")?;
//!     Ok(())
//! }
//! ```

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::path::PathBuf;
use thiserror::Error;

use crate::types::RecordId;

/// Main error type for spendstat operations
///
/// Analysis failures are deterministic validation failures; IO and parsing
/// failures come from the record sources and window files.
#[derive(Error, Debug)]
pub enum SpendstatError {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// A record finishes before it starts
    #[error("Data integrity error: record {record} finishes on {finish} before it starts on {start}")]
    DataIntegrity {
        /// The offending record
        record: RecordId,
        /// Date the record started
        start: NaiveDate,
        /// Date the record finished
        finish: NaiveDate,
    },

    /// A record cost too large to apportion safely
    #[error("Data integrity error: record {record} has cost {cost} outside the supported range")]
    CostOutOfRange {
        /// The offending record
        record: RecordId,
        /// The rejected cost
        cost: Decimal,
    },

    /// A window whose end precedes its start
    #[error("Invalid window '{label}': end {end} is before start {start}")]
    InvalidWindow {
        /// Window label
        label: String,
        /// Window start
        start: NaiveDate,
        /// Window end
        end: NaiveDate,
    },

    /// Invalid date format
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    /// Parse error with file context
    #[error("Parse error in {file}: {error}")]
    Parse {
        /// The file that caused the error
        file: PathBuf,
        /// The error message
        error: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A session was analyzed a second time
    #[error("Session '{0}' has already been analyzed")]
    SessionAlreadyAnalyzed(String),

    /// A session was aggregated before being analyzed
    #[error("Session '{0}' has not been analyzed yet")]
    SessionNotAnalyzed(String),
}

/// Convenience type alias for Results in spendstat
///
/// # Example
///
/// ```
/// use spendstat_core::Result;
///
/// fn process_data() -> Result<String> {
///     Ok("Processed successfully".to_string())
/// }
/// ```
pub type Result<T> = std::result::Result<T, SpendstatError>;
