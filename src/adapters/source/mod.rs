//! Record source boundary
//!
//! Abstraction over the tabular data origin. The pipeline never assumes a
//! partially-consumed row sequence can be resumed: when an attempt fails,
//! it calls [`RecordSource::rows`] again and takes a fresh full pass from
//! the beginning.

pub mod bigquery;
pub mod memory;

pub use bigquery::BigQuerySource;
pub use memory::MemorySource;

use crate::domain::{Record, Result, Schema};
use async_trait::async_trait;

/// A tabular data origin.
///
/// # Contract
///
/// - `schema` returns the ordered column names; the pipeline calls it
///   once per run, before iteration begins
/// - `rows` returns a lazy, finite, single-pass sequence and must be
///   re-invocable within the same run - each call restarts from the
///   first row
/// - every record yielded exposes (or defaults to null for) every column
///   in the schema
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch the ordered column names from table metadata
    async fn schema(&self) -> Result<Schema>;

    /// Start a fresh full pass over the rows
    async fn rows(&self) -> Result<Box<dyn RecordStream>>;
}

/// A single pass over a source's rows, pulled one record at a time.
///
/// Returns `Ok(None)` once the sequence is exhausted. Iteration is the
/// sole suspension point; rows are consumed strictly sequentially.
#[async_trait]
pub trait RecordStream: Send {
    /// Fetch the next record, or `None` at end of sequence
    async fn next_record(&mut self) -> Result<Option<Record>>;
}
