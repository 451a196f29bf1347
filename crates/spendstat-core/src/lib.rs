//! Core types, traits, and interval logic for spendstat
//!
//! This crate provides the foundational types, error handling, the
//! record/window overlap test and the record source trait used by all
//! other spendstat crates.

pub mod error;
pub mod filters;
pub mod provider;
pub mod types;

// Re-export commonly used types
pub use error::{Result, SpendstatError};
pub use types::{Category, Cost, Record, RecordId, RecordState, Window};
