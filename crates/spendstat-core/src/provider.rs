//! Record source trait
//!
//! This module defines the `RecordSource` trait that every provider crate
//! implements. It provides a uniform interface for constructing a source and
//! streaming expenditure records, whatever storage they come from.

use crate::error::Result;
use crate::types::Record;
use async_trait::async_trait;
use futures::stream::{Stream, TryStreamExt};
use std::pin::Pin;

/// Trait for record providers.
///
/// Records are yielded in source order; each carries a `RecordId` equal to
/// its position in that order.
#[async_trait]
pub trait RecordSource: Send + Sync + Sized {
    /// Create a new source, discovering its default location.
    async fn new() -> Result<Self>;

    /// Stream all records from the source.
    fn load_records(&self) -> Pin<Box<dyn Stream<Item = Result<Record>> + Send + '_>>;

    /// Collect every record, stopping at the first error.
    async fn collect_records(&self) -> Result<Vec<Record>> {
        self.load_records().try_collect().await
    }
}
