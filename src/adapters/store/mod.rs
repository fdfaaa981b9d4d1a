//! Object store boundary
//!
//! Abstraction over the remote destination. A [`DestinationHandle`] is
//! resolved once per run and stays stable; at most one incremental write
//! handle is open against it at any time, and a handle from a failed
//! attempt is always aborted before a new one is opened.

pub mod fs;
pub mod gcs;

pub use fs::FsStore;
pub use gcs::GcsStore;

use crate::domain::Result;
use async_trait::async_trait;

/// Logical reference to the remote object being written.
///
/// Identifies the object (bucket + path) for the whole run. The URI is
/// store-specific (`gs://bucket/path` for GCS, a filesystem path for the
/// local backend) and is what success output reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationHandle {
    bucket: String,
    object: String,
    uri: String,
}

impl DestinationHandle {
    /// Create a handle; called by store implementations from `resolve`
    pub fn new(
        bucket: impl Into<String>,
        object: impl Into<String>,
        uri: impl Into<String>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            object: object.into(),
            uri: uri.into(),
        }
    }

    /// Bucket (or bucket-equivalent) name
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Object path within the bucket
    pub fn object(&self) -> &str {
        &self.object
    }

    /// Display URI for logs and success output
    pub fn uri(&self) -> &str {
        &self.uri
    }
}

/// A destination for serialized documents.
///
/// # Contract
///
/// - `resolve` fails with [`crate::domain::StorageError::BucketNotFound`]
///   when the bucket is missing or inaccessible; the pipeline treats that
///   as fatal and never retries it
/// - `open_writer` fails with
///   [`crate::domain::StorageError::StreamingUnsupported`] when the store
///   cannot write incrementally at all; any other failure is treated as
///   transient
/// - `upload_buffer` replaces the destination object atomically with the
///   full document; a failed upload must not leave a committed partial
///   object
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Resolve bucket + object path into a handle for this run
    async fn resolve(&self, bucket: &str, object: &str) -> Result<DestinationHandle>;

    /// Open an incremental write handle to the destination object
    async fn open_writer(
        &self,
        handle: &DestinationHandle,
        content_type: &str,
    ) -> Result<Box<dyn ChunkWriter>>;

    /// Upload a complete in-memory document in one shot
    async fn upload_buffer(
        &self,
        handle: &DestinationHandle,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<()>;
}

/// An open incremental write handle.
///
/// Chunks are accepted in order; nothing is committed until `finish`
/// returns. `abort` discards the handle best-effort - it swallows its own
/// errors so they can never mask the failure that triggered the abort.
#[async_trait]
pub trait ChunkWriter: Send + std::fmt::Debug {
    /// Append one output chunk
    async fn write_chunk(&mut self, chunk: &[u8]) -> Result<()>;

    /// Flush and commit the destination object
    async fn finish(&mut self) -> Result<()>;

    /// Discard the handle without committing (best-effort)
    async fn abort(&mut self);
}
