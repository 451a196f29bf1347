//! JSON record provider for spendstat
//!
//! This crate implements the record source trait for spending tables
//! exported from a workbook as JSON or JSON Lines.

pub mod data_loader;

pub use data_loader::{DATA_PATH_ENV, DataLoader};
