//! Google Cloud Storage store
//!
//! Talks to the GCS JSON API: a resumable upload session backs the
//! incremental writer, and a single-shot media upload backs the buffered
//! fallback. Authentication is an opaque pre-resolved bearer token from
//! configuration.
//!
//! Resumable sessions require intermediate chunks to be multiples of
//! 256 KiB, so the writer coalesces pipeline chunks internally and ships
//! them in 4 MiB slices; the remainder goes out with the finalizing
//! request.

use super::{ChunkWriter, DestinationHandle, ObjectStore};
use crate::config::SecretString;
use crate::domain::{Result, StorageError};
use async_trait::async_trait;
use secrecy::ExposeSecret;
use std::time::Duration;
use url::Url;

/// Default GCS API endpoint
pub const DEFAULT_BASE_URL: &str = "https://storage.googleapis.com";

/// Upload slice size for resumable sessions (a multiple of 256 KiB)
const UPLOAD_SLICE_BYTES: usize = 4 * 1024 * 1024;

/// Object store backed by the GCS JSON API
#[derive(Debug, Clone)]
pub struct GcsStore {
    client: reqwest::Client,
    base_url: String,
    token: Option<SecretString>,
}

impl GcsStore {
    /// Create a store against `base_url` (the production endpoint unless
    /// pointed at an emulator)
    pub fn new(base_url: impl Into<String>, token: Option<SecretString>) -> Result<Self> {
        // Resumable sessions answer PUTs with 308; the client must hand
        // those back instead of treating them as redirects.
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    fn upload_url(&self, handle: &DestinationHandle, upload_type: &str) -> Result<Url> {
        let mut url = Url::parse(&format!(
            "{}/upload/storage/v1/b/{}/o",
            self.base_url,
            handle.bucket()
        ))
        .map_err(|e| StorageError::InvalidResponse(format!("bad endpoint URL: {e}")))?;
        url.query_pairs_mut()
            .append_pair("uploadType", upload_type)
            .append_pair("name", handle.object());
        Ok(url)
    }
}

#[async_trait]
impl ObjectStore for GcsStore {
    async fn resolve(&self, bucket: &str, object: &str) -> Result<DestinationHandle> {
        let url = format!("{}/storage/v1/b/{}", self.base_url, bucket);
        let response = self
            .authorized(self.client.get(&url))
            .send()
            .await
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let uri = format!("gs://{bucket}/{object}");
            Ok(DestinationHandle::new(bucket, object, uri))
        } else {
            // 404 and 403 both mean the run cannot proceed with the
            // configured credentials
            Err(StorageError::BucketNotFound(format!("{bucket} ({status})")).into())
        }
    }

    async fn open_writer(
        &self,
        handle: &DestinationHandle,
        content_type: &str,
    ) -> Result<Box<dyn ChunkWriter>> {
        let url = self.upload_url(handle, "resumable")?;
        let response = self
            .authorized(self.client.post(url))
            .header("X-Upload-Content-Type", content_type)
            .header(reqwest::header::CONTENT_LENGTH, 0)
            .send()
            .await
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::WriteFailed(format!(
                "resumable session request returned {status}: {body}"
            ))
            .into());
        }

        let session_url = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                StorageError::InvalidResponse(
                    "resumable session response carried no Location header".to_string(),
                )
            })?;

        tracing::debug!(uri = %handle.uri(), "Opened resumable upload session");

        Ok(Box::new(GcsChunkWriter {
            client: self.client.clone(),
            session_url,
            pending: Vec::new(),
            committed_bytes: 0,
        }))
    }

    async fn upload_buffer(
        &self,
        handle: &DestinationHandle,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<()> {
        let url = self.upload_url(handle, "media")?;
        let response = self
            .authorized(self.client.post(url))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(StorageError::UploadFailed(format!(
                "media upload returned {status}: {body}"
            ))
            .into())
        }
    }
}

/// Incremental writer over one resumable upload session
#[derive(Debug)]
struct GcsChunkWriter {
    client: reqwest::Client,
    session_url: String,
    pending: Vec<u8>,
    committed_bytes: u64,
}

impl GcsChunkWriter {
    /// Ship one intermediate slice; the session answers 308 until the
    /// final request.
    async fn put_slice(&mut self, slice: Vec<u8>) -> Result<()> {
        let start = self.committed_bytes;
        let end = start + slice.len() as u64 - 1;
        let response = self
            .client
            .put(&self.session_url)
            .header(
                reqwest::header::CONTENT_RANGE,
                format!("bytes {start}-{end}/*"),
            )
            .body(slice)
            .send()
            .await
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::PERMANENT_REDIRECT || status.is_success() {
            self.committed_bytes = end + 1;
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(StorageError::WriteFailed(format!(
                "session write returned {status}: {body}"
            ))
            .into())
        }
    }
}

#[async_trait]
impl ChunkWriter for GcsChunkWriter {
    async fn write_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        self.pending.extend_from_slice(chunk);
        while self.pending.len() >= UPLOAD_SLICE_BYTES {
            let slice: Vec<u8> = self.pending.drain(..UPLOAD_SLICE_BYTES).collect();
            self.put_slice(slice).await?;
        }
        Ok(())
    }

    async fn finish(&mut self) -> Result<()> {
        let remainder = std::mem::take(&mut self.pending);
        let total = self.committed_bytes + remainder.len() as u64;
        let content_range = if remainder.is_empty() {
            format!("bytes */{total}")
        } else {
            let start = self.committed_bytes;
            let end = total - 1;
            format!("bytes {start}-{end}/{total}")
        };

        let response = self
            .client
            .put(&self.session_url)
            .header(reqwest::header::CONTENT_RANGE, content_range)
            .body(remainder)
            .send()
            .await
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            self.committed_bytes = total;
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(StorageError::WriteFailed(format!(
                "session finalize returned {status}: {body}"
            ))
            .into())
        }
    }

    async fn abort(&mut self) {
        // Cancelling the session discards whatever the failed attempt got
        // committed; errors here must never mask the original failure.
        match self.client.delete(&self.session_url).send().await {
            Ok(_) => tracing::debug!("Cancelled resumable upload session"),
            Err(e) => tracing::debug!(error = %e, "Failed to cancel resumable upload session"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_slice_is_multiple_of_256_kib() {
        assert_eq!(UPLOAD_SLICE_BYTES % (256 * 1024), 0);
    }

    #[test]
    fn test_upload_url_encodes_object_name() {
        let store = GcsStore::new("https://example.test", None).unwrap();
        let handle = DestinationHandle::new("bkt", "transformed xml/defaulters.xml", "gs://x");
        let url = store.upload_url(&handle, "media").unwrap();
        assert!(url.as_str().contains("uploadType=media"));
        assert!(url.as_str().contains("name=transformed+xml%2Fdefaulters.xml"));
    }
}
