//! Streaming export pipeline
//!
//! The one place failure handling lives. A run reads an ordered record
//! sequence, serializes it, and commits it to a destination object with a
//! two-tier resilience strategy:
//!
//! 1. **Streaming tier** - write incrementally through an open handle,
//!    retrying whole attempts with exponential backoff. A failed attempt
//!    discards its partial progress and takes a fresh full pass over the
//!    source; there is no mid-stream resume.
//! 2. **Fallback tier** - after the streaming tier is exhausted (or the
//!    store can't stream at all), serialize the entire document into
//!    memory and upload it in one shot, with an independent retry cycle.
//!    There is nowhere further to fall back to, so a failure while
//!    building the buffer is fatal, and exhausting the upload retries is
//!    terminal.
//!
//! The pipeline is parameterized by {source, serializer, store}, so the
//! XML and CSV exports share this code instead of carrying copies.

use crate::adapters::source::RecordSource;
use crate::adapters::store::{ChunkWriter, DestinationHandle, ObjectStore};
use crate::core::export::retry::RetryPolicy;
use crate::core::export::summary::{ExportOutcome, ExportTier};
use crate::core::serialize::RecordSerializer;
use crate::domain::{Result, Schema, TablecastError};
use std::time::Instant;

/// Progress is logged every this many rows during a pass
const PROGRESS_INTERVAL: usize = 1000;

/// One configured export: a source, a wire format, a destination
pub struct ExportPipeline<'a> {
    source: &'a dyn RecordSource,
    serializer: &'a dyn RecordSerializer,
    store: &'a dyn ObjectStore,
    retry: RetryPolicy,
}

impl<'a> ExportPipeline<'a> {
    /// Assemble a pipeline from its collaborators
    pub fn new(
        source: &'a dyn RecordSource,
        serializer: &'a dyn RecordSerializer,
        store: &'a dyn ObjectStore,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            source,
            serializer,
            store,
            retry,
        }
    }

    /// Run the export to `bucket`/`object`.
    ///
    /// Resolution and schema failures surface immediately - they are
    /// configuration problems, not transient faults. Everything after
    /// that goes through the two retry tiers.
    pub async fn run(&self, bucket: &str, object: &str) -> Result<ExportOutcome> {
        let start = Instant::now();

        let schema = self.source.schema().await?;
        let handle = self.store.resolve(bucket, object).await?;
        tracing::info!(
            destination = %handle.uri(),
            columns = schema.len(),
            "Preparing export"
        );

        if let Some(outcome) = self.streaming_tier(&handle, &schema, start).await? {
            return Ok(outcome);
        }
        self.fallback_tier(&handle, &schema, start).await
    }

    /// Streaming tier. Returns `Ok(None)` when control should pass to the
    /// fallback tier.
    async fn streaming_tier(
        &self,
        handle: &DestinationHandle,
        schema: &Schema,
        start: Instant,
    ) -> Result<Option<ExportOutcome>> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            tracing::info!(
                attempt,
                max_attempts = self.retry.max_attempts,
                destination = %handle.uri(),
                "Streaming attempt"
            );

            match self.stream_once(handle, schema).await {
                Ok(records_written) => {
                    let outcome = ExportOutcome {
                        destination_uri: handle.uri().to_string(),
                        records_written,
                        tier: ExportTier::Streaming,
                        attempts: attempt,
                        duration: start.elapsed(),
                    };
                    outcome.log();
                    return Ok(Some(outcome));
                }
                Err(err) if err.is_capability_gap() => {
                    // Not a transient fault - retrying would fail the
                    // same way, so go straight to the fallback.
                    tracing::warn!(
                        error = %err,
                        "Destination cannot stream; switching to buffered upload"
                    );
                    return Ok(None);
                }
                Err(err) => {
                    tracing::warn!(attempt, error = %err, "Streaming attempt failed");
                    if attempt >= self.retry.max_attempts {
                        tracing::warn!(
                            attempts = attempt,
                            "Streaming retries exhausted; falling back to buffered upload"
                        );
                        return Ok(None);
                    }
                    self.retry.wait(attempt).await;
                }
            }
        }
    }

    /// Fallback tier: one full in-memory build (not retried), then a
    /// bounded retry loop around the single-shot upload.
    async fn fallback_tier(
        &self,
        handle: &DestinationHandle,
        schema: &Schema,
        start: Instant,
    ) -> Result<ExportOutcome> {
        let (buffer, records_written) = self.build_document(schema).await?;
        tracing::info!(
            bytes = buffer.len(),
            records = records_written,
            "Built full document in memory"
        );

        let mut attempt = 0;
        loop {
            attempt += 1;
            tracing::info!(
                attempt,
                max_attempts = self.retry.max_attempts,
                destination = %handle.uri(),
                "Buffered upload attempt"
            );

            match self
                .store
                .upload_buffer(handle, &buffer, self.serializer.content_type())
                .await
            {
                Ok(()) => {
                    let outcome = ExportOutcome {
                        destination_uri: handle.uri().to_string(),
                        records_written,
                        tier: ExportTier::Buffered,
                        attempts: attempt,
                        duration: start.elapsed(),
                    };
                    outcome.log();
                    return Ok(outcome);
                }
                Err(err) => {
                    tracing::error!(attempt, error = %err, "Buffered upload attempt failed");
                    if attempt >= self.retry.max_attempts {
                        return Err(TablecastError::Export(format!(
                            "buffered upload to {} failed after {attempt} attempts: {err}",
                            handle.uri()
                        )));
                    }
                    self.retry.wait(attempt).await;
                }
            }
        }
    }

    /// One streaming attempt: open a fresh handle, take a fresh full pass.
    ///
    /// On any failure the handle is aborted before the error propagates,
    /// so the next attempt (or tier) never contends with a half-open
    /// writer.
    async fn stream_once(&self, handle: &DestinationHandle, schema: &Schema) -> Result<usize> {
        let mut writer = self
            .store
            .open_writer(handle, self.serializer.content_type())
            .await?;

        match self.stream_into(writer.as_mut(), schema).await {
            Ok(written) => match writer.finish().await {
                Ok(()) => Ok(written),
                Err(err) => {
                    writer.abort().await;
                    Err(err)
                }
            },
            Err(err) => {
                writer.abort().await;
                Err(err)
            }
        }
    }

    /// Header, every record, footer - through an open writer.
    async fn stream_into(&self, writer: &mut dyn ChunkWriter, schema: &Schema) -> Result<usize> {
        let mut chunk = Vec::new();
        self.serializer.write_header(&mut chunk, schema)?;
        writer.write_chunk(&chunk).await?;

        let mut rows = self.source.rows().await?;
        let mut written = 0usize;
        while let Some(record) = rows.next_record().await? {
            chunk.clear();
            self.serializer.write_record(&mut chunk, &record, schema)?;
            writer.write_chunk(&chunk).await?;
            written += 1;
            if written % PROGRESS_INTERVAL == 0 {
                tracing::info!(rows = written, "Processed rows");
            }
        }

        chunk.clear();
        self.serializer.write_footer(&mut chunk)?;
        writer.write_chunk(&chunk).await?;
        Ok(written)
    }

    /// Serialize a fresh full pass into one buffer.
    async fn build_document(&self, schema: &Schema) -> Result<(Vec<u8>, usize)> {
        let mut buffer = Vec::new();
        self.serializer.write_header(&mut buffer, schema)?;

        let mut rows = self.source.rows().await?;
        let mut written = 0usize;
        while let Some(record) = rows.next_record().await? {
            self.serializer.write_record(&mut buffer, &record, schema)?;
            written += 1;
            if written % PROGRESS_INTERVAL == 0 {
                tracing::info!(rows = written, "Built rows in memory");
            }
        }

        self.serializer.write_footer(&mut buffer)?;
        Ok((buffer, written))
    }
}
