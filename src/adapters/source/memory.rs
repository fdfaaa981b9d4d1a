//! In-memory record source
//!
//! Used by tests and fixtures. Every call to [`MemorySource::rows`] hands
//! back a fresh pass over the same records, which is exactly the restart
//! behavior the pipeline relies on after a failed attempt.

use super::{RecordSource, RecordStream};
use crate::domain::{Record, Result, Schema};
use async_trait::async_trait;

/// Record source backed by a vector of records
#[derive(Debug, Clone)]
pub struct MemorySource {
    schema: Schema,
    records: Vec<Record>,
}

impl MemorySource {
    /// Create a source over fixed records
    pub fn new(schema: Schema, records: Vec<Record>) -> Self {
        Self { schema, records }
    }

    /// Number of records a full pass will yield
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the source holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl RecordSource for MemorySource {
    async fn schema(&self) -> Result<Schema> {
        Ok(self.schema.clone())
    }

    async fn rows(&self) -> Result<Box<dyn RecordStream>> {
        Ok(Box::new(MemoryStream {
            records: self.records.clone().into_iter(),
        }))
    }
}

struct MemoryStream {
    records: std::vec::IntoIter<Record>,
}

#[async_trait]
impl RecordStream for MemoryStream {
    async fn next_record(&mut self) -> Result<Option<Record>> {
        Ok(self.records.next())
    }
}
