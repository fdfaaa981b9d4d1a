//! Local filesystem store
//!
//! Treats a directory under a configured root as a bucket. Writers stage
//! into a `.part` file and rename on commit, so a failed attempt never
//! leaves a committed partial object behind.

use super::{ChunkWriter, DestinationHandle, ObjectStore};
use crate::domain::{Result, StorageError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Object store backed by a local directory tree
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Create a store rooted at `root`; each bucket is a subdirectory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn object_path(&self, handle: &DestinationHandle) -> PathBuf {
        self.root.join(handle.bucket()).join(handle.object())
    }

    async fn prepare_parent(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::WriteFailed(format!("create {parent:?}: {e}")))?;
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for FsStore {
    async fn resolve(&self, bucket: &str, object: &str) -> Result<DestinationHandle> {
        let bucket_dir = self.root.join(bucket);
        if !bucket_dir.is_dir() {
            return Err(StorageError::BucketNotFound(format!(
                "no directory {} under {}",
                bucket,
                self.root.display()
            ))
            .into());
        }
        let uri = bucket_dir.join(object).display().to_string();
        Ok(DestinationHandle::new(bucket, object, uri))
    }

    async fn open_writer(
        &self,
        handle: &DestinationHandle,
        _content_type: &str,
    ) -> Result<Box<dyn ChunkWriter>> {
        let final_path = self.object_path(handle);
        Self::prepare_parent(&final_path).await?;

        let part_path = final_path.with_extension(part_extension(&final_path));
        let file = fs::File::create(&part_path)
            .await
            .map_err(|e| StorageError::WriteFailed(format!("create {part_path:?}: {e}")))?;

        Ok(Box::new(FsChunkWriter {
            file: Some(file),
            part_path,
            final_path,
        }))
    }

    async fn upload_buffer(
        &self,
        handle: &DestinationHandle,
        bytes: &[u8],
        _content_type: &str,
    ) -> Result<()> {
        let final_path = self.object_path(handle);
        Self::prepare_parent(&final_path).await?;

        let part_path = final_path.with_extension(part_extension(&final_path));
        fs::write(&part_path, bytes)
            .await
            .map_err(|e| StorageError::UploadFailed(format!("write {part_path:?}: {e}")))?;
        fs::rename(&part_path, &final_path)
            .await
            .map_err(|e| StorageError::UploadFailed(format!("commit {final_path:?}: {e}")))?;
        Ok(())
    }
}

fn part_extension(path: &Path) -> String {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{ext}.part"),
        None => "part".to_string(),
    }
}

#[derive(Debug)]
struct FsChunkWriter {
    file: Option<fs::File>,
    part_path: PathBuf,
    final_path: PathBuf,
}

#[async_trait]
impl ChunkWriter for FsChunkWriter {
    async fn write_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| StorageError::WriteFailed("writer already closed".to_string()))?;
        file.write_all(chunk)
            .await
            .map_err(|e| StorageError::WriteFailed(e.to_string()))?;
        Ok(())
    }

    async fn finish(&mut self) -> Result<()> {
        let mut file = self
            .file
            .take()
            .ok_or_else(|| StorageError::WriteFailed("writer already closed".to_string()))?;
        file.flush()
            .await
            .map_err(|e| StorageError::WriteFailed(e.to_string()))?;
        drop(file);
        fs::rename(&self.part_path, &self.final_path)
            .await
            .map_err(|e| StorageError::WriteFailed(format!("commit {:?}: {e}", self.final_path)))?;
        Ok(())
    }

    async fn abort(&mut self) {
        self.file.take();
        if let Err(e) = fs::remove_file(&self.part_path).await {
            tracing::debug!(path = ?self.part_path, error = %e, "Failed to remove staged file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store_with_bucket(bucket: &str) -> (tempfile::TempDir, FsStore) {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join(bucket)).await.unwrap();
        let store = FsStore::new(dir.path());
        (dir, store)
    }

    #[tokio::test]
    async fn test_resolve_missing_bucket_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());
        let err = store.resolve("absent", "out.xml").await.unwrap_err();
        assert!(err.to_string().contains("not accessible"));
    }

    #[tokio::test]
    async fn test_streaming_write_commits_on_finish() {
        let (_dir, store) = store_with_bucket("exports").await;
        let handle = store.resolve("exports", "out/doc.xml").await.unwrap();

        let mut writer = store.open_writer(&handle, "application/xml").await.unwrap();
        writer.write_chunk(b"<a>").await.unwrap();
        writer.write_chunk(b"</a>").await.unwrap();
        writer.finish().await.unwrap();

        let written = fs::read_to_string(handle.uri()).await.unwrap();
        assert_eq!(written, "<a></a>");
    }

    #[tokio::test]
    async fn test_abort_leaves_no_object() {
        let (_dir, store) = store_with_bucket("exports").await;
        let handle = store.resolve("exports", "doc.xml").await.unwrap();

        let mut writer = store.open_writer(&handle, "application/xml").await.unwrap();
        writer.write_chunk(b"partial").await.unwrap();
        writer.abort().await;

        assert!(!Path::new(handle.uri()).exists());
        let staged = Path::new(handle.uri()).with_extension("xml.part");
        assert!(!staged.exists());
    }

    #[tokio::test]
    async fn test_upload_buffer_replaces_object() {
        let (_dir, store) = store_with_bucket("exports").await;
        let handle = store.resolve("exports", "doc.xml").await.unwrap();

        store
            .upload_buffer(&handle, b"first", "application/xml")
            .await
            .unwrap();
        store
            .upload_buffer(&handle, b"second", "application/xml")
            .await
            .unwrap();

        assert_eq!(fs::read_to_string(handle.uri()).await.unwrap(), "second");
    }
}
