use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio_util::io::ReaderStream;
use uuid::Uuid;

use crate::{
    BlobError, BlobKey, BlobResult, BlobStore, ByteStream, GetResult, ObjectHead, PutResult,
    ResolvedRange,
};

/// Read buffer size for streaming blobs out of the filesystem.
const READ_CHUNK_BYTES: usize = 64 * 1024;

/// Blob store backed by a single local directory.
///
/// Blobs are plain files named by their key. Uploads are written to a hidden
/// `.upload-<uuid>.part` file first and renamed into place once complete.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the root directory (and parents) if missing.
    pub async fn create(root: impl Into<PathBuf>) -> BlobResult<Self> {
        let store = Self::new(root);
        fs::create_dir_all(&store.root).await?;
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &BlobKey) -> PathBuf {
        self.root.join(key.as_str())
    }

    fn staging_path(&self) -> PathBuf {
        self.root
            .join(format!(".upload-{}.part", Uuid::new_v4().simple()))
    }

    async fn write_staged(path: &Path, mut stream: ByteStream) -> BlobResult<u64> {
        let mut file = File::create(path).await?;
        let mut written = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }

        file.flush().await?;
        file.sync_all().await?;
        Ok(written)
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(
        &self,
        key: &BlobKey,
        _content_type: Option<&str>,
        stream: ByteStream,
    ) -> BlobResult<PutResult> {
        let staging = self.staging_path();

        let written = match Self::write_staged(&staging, stream).await {
            Ok(written) => written,
            Err(e) => {
                let _ = fs::remove_file(&staging).await; // Best effort cleanup
                return Err(e);
            }
        };

        if let Err(e) = fs::rename(&staging, self.path_for(key)).await {
            let _ = fs::remove_file(&staging).await;
            return Err(e.into());
        }

        tracing::debug!(key = %key, size = written, "blob written");
        Ok(PutResult {
            size_bytes: written,
        })
    }

    async fn get(&self, key: &BlobKey, range: Option<ResolvedRange>) -> BlobResult<GetResult> {
        let mut file = File::open(self.path_for(key))
            .await
            .map_err(|e| BlobError::from_io(key.as_str(), e))?;

        let stream: ByteStream = match range {
            Some(range) => {
                file.seek(SeekFrom::Start(range.start)).await?;
                Box::pin(ReaderStream::with_capacity(
                    file.take(range.content_length()),
                    READ_CHUNK_BYTES,
                ))
            }
            None => Box::pin(ReaderStream::with_capacity(file, READ_CHUNK_BYTES)),
        };

        Ok(GetResult {
            stream,
            resolved_range: range,
        })
    }

    async fn head(&self, key: &BlobKey) -> BlobResult<ObjectHead> {
        let metadata = fs::metadata(self.path_for(key))
            .await
            .map_err(|e| BlobError::from_io(key.as_str(), e))?;

        if !metadata.is_file() {
            return Err(BlobError::not_found(key.as_str()));
        }

        Ok(ObjectHead {
            size_bytes: metadata.len(),
            content_type: None,
        })
    }
}
